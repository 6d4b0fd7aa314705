//! Function body generation
//!
//! [`generate`] lowers a syntax tree to a [`Program`] and hands it to the
//! [`ScriptBackend`], which writes the body of a JavaScript function taking the
//! data object and render options:
//!
//! ```text
//! let include = (template, data) => this.render(template, data, options);
//! let includeAsync = (template, data) => this.renderAsync(template, data, options);
//!
//! let __eta = {res: "", e: this.config.escapeFunction, f: this.config.filterFunction};
//!
//! function layout(path, data) {
//!   __eta.layout = path;
//!   __eta.layoutData = data;
//! }
//! __eta.res+='Hi '
//! __eta.res+=__eta.e(it.name)
//! if (__eta.layout) {
//!   __eta.res = include(__eta.layout, {...it, body: __eta.res, ...__eta.layoutData});
//! }
//! return __eta.res;
//! ```
//!
//! Code plugins run over the finished text.

use crate::ast::{escape_quotes, TemplateAst};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::ir::{Instruction, Program};
use crate::plugin::run_code_plugins;

/// Renders lowered instructions into target code
pub trait Backend {
    fn render(&self, program: &Program, config: &GeneratorConfig) -> String;
}

/// Emits a JavaScript function body
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptBackend;

/// Escapes the template source for the debug `templateStr` field
fn quote_source(source: &str) -> String {
    let escaped = escape_quotes(source).replace("\r\n", "\\n").replace(['\n', '\r'], "\\n");
    format!("'{}'", escaped)
}

impl ScriptBackend {
    fn preamble(&self, program: &Program, config: &GeneratorConfig, code: &mut String) {
        if !config.function_header.is_empty() {
            code.push_str(&config.function_header);
            code.push('\n');
        }
        code.push_str("let include = (template, data) => this.render(template, data, options);\n");
        code.push_str("let includeAsync = (template, data) => this.renderAsync(template, data, options);\n\n");

        code.push_str("let __eta = {res: \"\", e: this.config.escapeFunction, f: this.config.filterFunction");
        if config.debug {
            code.push_str(", line: 1, templateStr: ");
            code.push_str(&quote_source(program.source.as_deref().unwrap_or_default()));
        }
        code.push_str("};\n\n");

        code.push_str("function layout(path, data) {\n");
        code.push_str("  __eta.layout = path;\n");
        code.push_str("  __eta.layoutData = data;\n");
        code.push_str("}\n");
    }

    fn instruction(&self, instruction: &Instruction, config: &GeneratorConfig, code: &mut String) {
        match instruction {
            Instruction::AppendLiteral(text) => {
                code.push_str("__eta.res+='");
                code.push_str(text);
                code.push_str("'\n");
            }
            Instruction::AppendExpression { expr, filtered, escaped } => {
                let mut value = expr.clone();
                if *filtered {
                    value = format!("__eta.f({})", value);
                }
                if *escaped {
                    value = format!("__eta.e({})", value);
                }
                code.push_str("__eta.res+=");
                code.push_str(&value);
                code.push('\n');
            }
            Instruction::ExecuteStatement(statement) => {
                code.push_str(statement);
                code.push('\n');
            }
            Instruction::SetLine(line) => {
                code.push_str("__eta.line=");
                code.push_str(&line.to_string());
                code.push('\n');
            }
            Instruction::CheckLayout { async_mode } => {
                code.push_str("if (__eta.layout) {\n");
                code.push_str("  __eta.res = ");
                code.push_str(if *async_mode { "await includeAsync" } else { "include" });
                code.push_str("(__eta.layout, {...");
                code.push_str(&config.var_name);
                code.push_str(", body: __eta.res, ...__eta.layoutData});\n");
                code.push_str("}\n");
            }
        }
    }
}

impl Backend for ScriptBackend {
    fn render(&self, program: &Program, config: &GeneratorConfig) -> String {
        let mut code = String::new();
        self.preamble(program, config, &mut code);
        if config.debug {
            code.push_str("try {\n");
        }
        for instruction in &program.instructions {
            self.instruction(instruction, config, &mut code);
        }
        if config.debug {
            code.push_str("} catch (e) { this.RuntimeErr(e, __eta.templateStr, __eta.line, options.filepath) }\n");
        }
        code.push_str("return __eta.res;\n");
        code
    }
}

/// Renders a program with a backend and runs the code plugins
pub fn emit(program: &Program, backend: &dyn Backend, config: &GeneratorConfig) -> Result<String> {
    let code = backend.render(program, config);
    tracing::debug!(instructions = program.instructions.len(), len = code.len(), "generated function body");
    run_code_plugins(code, config)
}

/// Generates a function body from a syntax tree
///
/// In debug mode the body embeds an empty template source; use
/// [`generate_with_source`] to give runtime diagnostics the template text.
pub fn generate(ast: TemplateAst, config: &GeneratorConfig) -> Result<String> {
    emit(&Program::lower(ast, config), &ScriptBackend, config)
}

/// Generates a function body, keeping `source` for debug diagnostics
pub fn generate_with_source(ast: TemplateAst, source: &str, config: &GeneratorConfig) -> Result<String> {
    emit(&Program::lower(ast, config).with_source(source), &ScriptBackend, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNode, TagKind};
    use crate::config::Config;

    static PREAMBLE: &str = "let include = (template, data) => this.render(template, data, options);\n\
let includeAsync = (template, data) => this.renderAsync(template, data, options);\n\n\
let __eta = {res: \"\", e: this.config.escapeFunction, f: this.config.filterFunction};\n\n\
function layout(path, data) {\n  __eta.layout = path;\n  __eta.layoutData = data;\n}\n";

    static LAYOUT: &str = "if (__eta.layout) {\n  __eta.res = include(__eta.layout, {...it, body: __eta.res, ...__eta.layoutData});\n}\n";

    fn ast() -> TemplateAst {
        TemplateAst::new(vec![
            AstNode::literal("Hi "),
            AstNode::tag(TagKind::Interpolate, "it.name"),
            AstNode::literal("\\n"),
            AstNode::tag(TagKind::Raw, "it.html"),
            AstNode::tag(TagKind::Execute, "if (it.ok) {"),
            AstNode::literal("ok"),
            AstNode::tag(TagKind::Execute, "}"),
        ])
    }

    #[test]
    fn it_works() {
        let code = generate(ast(), &GeneratorConfig::default()).unwrap();
        let expected = format!(
            "{}__eta.res+='Hi '\n__eta.res+=__eta.e(it.name)\n__eta.res+='\\n'\n__eta.res+=it.html\nif (it.ok) {{\n__eta.res+='ok'\n}}\n{}return __eta.res;\n",
            PREAMBLE, LAYOUT
        );
        assert_eq!(code, expected);
    }

    #[test]
    fn filter_then_escape() {
        let config = Config::default().auto_filter(true);
        let code = generate(ast(), &config.generator).unwrap();
        assert!(code.contains("__eta.res+=__eta.e(__eta.f(it.name))\n"));
        assert!(code.contains("__eta.res+=__eta.f(it.html)\n"));
    }

    #[test]
    fn escaping_can_be_disabled() {
        let config = Config::default().auto_escape(false);
        let code = generate(ast(), &config.generator).unwrap();
        assert!(code.contains("__eta.res+=it.name\n"));
    }

    #[test]
    fn generation_is_deterministic() {
        let config = Config::default().debug(true).use_with(true);
        let first = generate(ast(), &config.generator).unwrap();
        let second = generate(ast(), &config.generator).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn header_and_async_layout() {
        let config = Config::default()
            .function_header("const helpers = this.helpers;")
            .async_mode(true)
            .var_name("data");
        let code = generate(TemplateAst::default(), &config.generator).unwrap();
        assert!(code.starts_with("const helpers = this.helpers;\nlet include ="));
        assert!(code.contains(
            "  __eta.res = await includeAsync(__eta.layout, {...data, body: __eta.res, ...__eta.layoutData});\n"
        ));
    }

    #[test]
    fn layout_data_spreads_after_body() {
        let code = generate(TemplateAst::default(), &GeneratorConfig::default()).unwrap();
        let context = code.find("...it,").unwrap();
        let body = code.find("body: __eta.res").unwrap();
        let layout_data = code.find("...__eta.layoutData").unwrap();
        assert!(context < body && body < layout_data);
    }

    #[test]
    fn debug_wraps_body() {
        let config = Config::default().debug(true);
        let ast = TemplateAst::new(vec![
            AstNode::literal("a"),
            AstNode::tag_at(TagKind::Interpolate, "it.x", 2),
        ]);
        let code = generate_with_source(ast, "a\n<%= it.x %>\r\n'q'", &config.generator).unwrap();
        assert!(code.contains(
            "f: this.config.filterFunction, line: 1, templateStr: 'a\\n<%= it.x %>\\n\\'q\\''};\n"
        ));
        assert!(code.contains("}\ntry {\n__eta.res+='a'\n__eta.line=2\n__eta.res+=__eta.e(it.x)\n"));
        assert!(code.ends_with(
            "} catch (e) { this.RuntimeErr(e, __eta.templateStr, __eta.line, options.filepath) }\nreturn __eta.res;\n"
        ));
    }

    #[test]
    fn debug_without_source() {
        let config = Config::default().debug(true);
        let code = generate(TemplateAst::default(), &config.generator).unwrap();
        assert!(code.contains("templateStr: ''"));
    }

    #[test]
    fn ambient_scope_without_with_block() {
        let config = Config::default().use_with(true);
        let ast = TemplateAst::new(vec![AstNode::tag(TagKind::Interpolate, "name")]);
        let code = generate(ast, &config.generator).unwrap();
        assert!(code.contains("__eta.res+=__eta.e(it.name)\n"));
        assert!(!code.contains("with("));
    }
}

//! Eta template parser and compiler
//!
//! This crate turns Eta templates into the body of a JavaScript function that
//! renders them. It's used by the `dry-eta` macros to precompile templates at
//! build time, and can be called directly by tools that ship compiled
//! templates to a JavaScript host.
//!
//! # Features
//!
//! - Interpolation (`<%= %>`), raw output (`<%~ %>`) and statements (`<% %>`)
//! - Custom delimiters and prefixes
//! - Whitespace control with `-` and `_` markers and a global default
//! - Auto-escaping and auto-filtering
//! - Layouts through `layout(path, data)`
//! - Bare identifier access (`use_with`) by rewriting tag bodies
//! - Debug line tracking for runtime error reports
//! - AST and code plugins
//!
//! # Example
//!
//! ```rust
//! use dry_eta_compiler::{Compiler, Config};
//!
//! let compiler = Compiler::new(Config::default()).unwrap();
//! let body = compiler.compile("Hello <%= it.name %>!").unwrap();
//! assert!(body.contains("__eta.res+='Hello '\n__eta.res+=__eta.e(it.name)\n__eta.res+='!'\n"));
//! ```
//!
//! # Module Structure
//!
//! - `ast.rs`: Syntax tree and literal escaping
//! - `config.rs`: Parser and generator options
//! - `parser.rs`: Tag scanner
//! - `trim.rs`: Whitespace control
//! - `scope.rs`: Bare identifier rewriting
//! - `ir.rs`: Instruction lowering
//! - `codegen.rs`: Function body emission
//! - `plugin.rs`: Plugin hooks
//! - `error.rs`: Error types

pub mod ast;
pub mod codegen;
pub mod config;
pub mod error;
pub mod ir;
pub mod parser;
pub mod plugin;
pub mod scope;
pub mod trim;

pub use ast::{AstNode, Tag, TagKind, TemplateAst};
pub use codegen::{generate, generate_with_source, Backend, ScriptBackend};
pub use config::{Config, GeneratorConfig, ParserConfig, Prefixes};
pub use error::{BoxError, Error, Result, RuntimeError};
pub use parser::{parse, Scanner};
pub use plugin::{TransformsAst, TransformsCode};
pub use trim::Trim;

/// Parses and generates with one validated configuration
#[derive(Debug, Clone)]
pub struct Compiler {
    config: Config,
    scanner: Scanner,
}

impl Compiler {
    /// Validates the configuration and prepares the scanner
    ///
    /// Debug mode must be set for both stages or neither: the generator
    /// reports runtime errors by the lines the parser records.
    pub fn new(config: Config) -> Result<Self> {
        if config.parser.debug != config.generator.debug {
            return Err(Error::config("debug mode must be enabled for both the parser and the generator"));
        }
        let scanner = Scanner::new(&config.parser)?;
        Ok(Self { config, scanner })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parses a template, running the AST plugins
    pub fn parse(&self, src: &str) -> Result<TemplateAst> {
        self.scanner.parse(src)
    }

    /// Generates a function body from a parsed template
    pub fn generate(&self, ast: TemplateAst) -> Result<String> {
        generate(ast, &self.config.generator)
    }

    /// Compiles a template into a function body
    pub fn compile(&self, src: &str) -> Result<String> {
        let ast = self.parse(src)?;
        generate_with_source(ast, src, &self.config.generator)
    }

    /// Compiles a template into a complete anonymous function
    ///
    /// The function takes the data object and the render options, and is
    /// `async` in async mode.
    pub fn compile_function(&self, src: &str) -> Result<String> {
        let body = self.compile(src)?;
        let generator = &self.config.generator;
        let keyword = if generator.async_mode { "async function" } else { "function" };
        Ok(format!("{} anonymous({}, options) {{\n{}}}", keyword, generator.var_name, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(src: &str) -> String {
        Compiler::new(Config::default()).unwrap().compile(src).unwrap()
    }

    /// Instructions between the layout helper and the layout check
    fn body(code: &str) -> &str {
        let start = code.find("__eta.layoutData = data;\n}\n").unwrap() + 27;
        let end = code.find("if (__eta.layout)").unwrap();
        &code[start..end]
    }

    #[test]
    fn it_works() {
        assert_eq!(
            body(&compile("Hello <%= it.name %>!")),
            "__eta.res+='Hello '\n__eta.res+=__eta.e(it.name)\n__eta.res+='!'\n"
        );
    }

    #[test]
    fn tagless_template_round_trips() {
        let src = "It's a \"quote\" \\ and\r\nlines\n";
        let compiler = Compiler::new(Config::default()).unwrap();
        let ast = compiler.parse(src).unwrap();
        assert_eq!(ast.len(), 1);
        match &ast[0] {
            AstNode::Literal(text) => assert_eq!(ast::unescape_literal(text), src),
            other => panic!("expected literal, got {other:?}"),
        }
        assert_eq!(
            body(&compiler.compile(src).unwrap()),
            "__eta.res+='It\\'s a \"quote\" \\\\ and\\r\\nlines\\n'\n"
        );
    }

    #[test]
    fn loop_with_trimming() {
        assert_eq!(
            body(&compile("<ul>\n<% it.users.forEach(function(user){ %>\n  <li><%= user.name %></li>\n<% }) %>\n</ul>")),
            "__eta.res+='<ul>\\n'\nit.users.forEach(function(user){\n__eta.res+='  <li>'\n__eta.res+=__eta.e(user.name)\n__eta.res+='</li>\\n'\n})\n__eta.res+='</ul>'\n"
        );
    }

    #[test]
    fn layout_call_is_a_statement() {
        let code = compile("<% layout('./main', { title: 'Home' }) %>content");
        assert!(body(&code).starts_with("layout('./main', { title: 'Home' })\n__eta.res+='content'\n"));
    }

    #[test]
    fn ambient_scope_end_to_end() {
        let compiler = Compiler::new(Config::default().use_with(true)).unwrap();
        let code = compiler.compile("<% let n = count + 1 %><%= n %> <%= label %>").unwrap();
        assert_eq!(
            body(&code),
            "let n = it.count + 1\n__eta.res+=__eta.e(n)\n__eta.res+=' '\n__eta.res+=__eta.e(it.label)\n"
        );
    }

    #[test]
    fn debug_end_to_end() {
        let compiler = Compiler::new(Config::default().debug(true)).unwrap();
        let code = compiler.compile("line one\n<%= it.oops() %>").unwrap();
        assert!(code.contains("templateStr: 'line one\\n<%= it.oops() %>'"));
        assert!(code.contains("__eta.res+='line one\\n'\n__eta.line=2\n__eta.res+=__eta.e(it.oops())\n"));
    }

    #[test]
    fn wraps_function() {
        let compiler = Compiler::new(Config::default().async_mode(true)).unwrap();
        let function = compiler.compile_function("x").unwrap();
        assert!(function.starts_with("async function anonymous(it, options) {\nlet include ="));
        assert!(function.ends_with("return __eta.res;\n}"));
    }

    #[test]
    fn rejects_bad_config_up_front() {
        let config = Config::default().tags("", "%>");
        assert!(matches!(Compiler::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_debug_in_one_stage_only() {
        let mut config = Config::default();
        config.generator.debug = true;
        assert!(matches!(Compiler::new(config.clone()), Err(Error::Config(_))));
        config.generator.debug = false;
        config.parser.debug = true;
        assert!(matches!(Compiler::new(config), Err(Error::Config(_))));
    }
}

//! Template instructions
//!
//! Lowering turns the syntax tree into a flat list of [`Instruction`]s with
//! every configuration decision already applied: which values are filtered or
//! escaped, where line markers go, whether tag bodies are scope-rewritten and
//! how the layout is invoked. A [`Backend`](crate::codegen::Backend) only has
//! to spell the instructions out.

use crate::ast::{AstNode, TagKind, TemplateAst};
use crate::config::GeneratorConfig;
use crate::scope::Rewriter;

/// One step of the generated function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Append escaped literal text to the output
    AppendLiteral(String),
    /// Evaluate an expression and append it, filtering first and escaping second
    AppendExpression { expr: String, filtered: bool, escaped: bool },
    /// Run a statement
    ExecuteStatement(String),
    /// Record the template line about to run
    SetLine(usize),
    /// Render the requested layout, if any, around the output so far
    CheckLayout { async_mode: bool },
}

/// Everything a backend needs to emit a function body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    /// Template source kept for runtime diagnostics in debug mode
    pub source: Option<String>,
}

impl Program {
    /// Lowers a syntax tree under the given options
    pub fn lower(ast: TemplateAst, config: &GeneratorConfig) -> Self {
        let mut rewriter = config.use_with.then(|| Rewriter::new(config.var_name.as_str()));
        let mut instructions = Vec::with_capacity(ast.len() + 1);
        let mut unlined = 0;

        for node in ast {
            let tag = match node {
                AstNode::Literal(text) => {
                    instructions.push(Instruction::AppendLiteral(text));
                    continue;
                }
                AstNode::Tag(tag) => tag,
            };
            if config.debug {
                match tag.line {
                    Some(line) => instructions.push(Instruction::SetLine(line)),
                    None => unlined += 1,
                }
            }
            let body = match rewriter.as_mut() {
                Some(rewriter) => rewriter.rewrite(&tag.body),
                None => tag.body,
            };
            instructions.push(match tag.kind {
                TagKind::Raw => Instruction::AppendExpression {
                    expr: body,
                    filtered: config.auto_filter,
                    escaped: false,
                },
                TagKind::Interpolate => Instruction::AppendExpression {
                    expr: body,
                    filtered: config.auto_filter,
                    escaped: config.auto_escape,
                },
                TagKind::Execute => Instruction::ExecuteStatement(body),
            });
        }
        instructions.push(Instruction::CheckLayout {
            async_mode: config.async_mode,
        });
        if unlined > 0 {
            tracing::warn!(tags = unlined, "debug output for tags without line numbers; errors there report an earlier line");
        }

        Self {
            instructions,
            source: None,
        }
    }

    /// Keeps the template source for debug diagnostics
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn sample() -> TemplateAst {
        TemplateAst::new(vec![
            AstNode::literal("Hi "),
            AstNode::tag_at(TagKind::Interpolate, "name", 1),
            AstNode::tag_at(TagKind::Raw, "html", 2),
            AstNode::tag_at(TagKind::Execute, "layout('main')", 3),
        ])
    }

    #[test]
    fn lowers_each_node_kind() {
        let program = Program::lower(sample(), &Config::default().generator);
        assert_eq!(
            program.instructions,
            vec![
                Instruction::AppendLiteral("Hi ".to_string()),
                Instruction::AppendExpression {
                    expr: "name".to_string(),
                    filtered: false,
                    escaped: true
                },
                Instruction::AppendExpression {
                    expr: "html".to_string(),
                    filtered: false,
                    escaped: false
                },
                Instruction::ExecuteStatement("layout('main')".to_string()),
                Instruction::CheckLayout { async_mode: false },
            ]
        );
        assert_eq!(program.source, None);
    }

    #[test]
    fn debug_marks_lines_before_tags() {
        let config = Config::default().debug(true).auto_filter(true).async_mode(true);
        let program = Program::lower(sample(), &config.generator);
        assert_eq!(
            program.instructions,
            vec![
                Instruction::AppendLiteral("Hi ".to_string()),
                Instruction::SetLine(1),
                Instruction::AppendExpression {
                    expr: "name".to_string(),
                    filtered: true,
                    escaped: true
                },
                Instruction::SetLine(2),
                Instruction::AppendExpression {
                    expr: "html".to_string(),
                    filtered: true,
                    escaped: false
                },
                Instruction::SetLine(3),
                Instruction::ExecuteStatement("layout('main')".to_string()),
                Instruction::CheckLayout { async_mode: true },
            ]
        );
    }

    #[test]
    fn debug_skips_marks_for_unlined_tags() {
        let config = Config::default().debug(true);
        let ast = TemplateAst::new(vec![AstNode::tag(TagKind::Interpolate, "x")]);
        let program = Program::lower(ast, &config.generator);
        assert!(!program.instructions.iter().any(|i| matches!(i, Instruction::SetLine(_))));
    }

    #[test]
    fn ambient_scope_rewrites_bodies() {
        let config = Config::default().use_with(true);
        let program = Program::lower(sample(), &config.generator);
        assert_eq!(
            program.instructions[1],
            Instruction::AppendExpression {
                expr: "it.name".to_string(),
                filtered: false,
                escaped: true
            }
        );
        assert_eq!(program.instructions[3], Instruction::ExecuteStatement("layout('main')".to_string()));
    }
}

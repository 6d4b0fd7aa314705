//! Tag scanning
//!
//! The scanner walks the template left to right with one regular expression
//! that matches "everything up to the next tag, then the tag". Inside a tag
//! the body is the shortest run of characters up to the closing delimiter,
//! except that quoted strings, template literals and block comments are
//! skipped whole, so `<%= "%>" %>` is a single tag.
//!
//! A tag that is never closed does not match; it and everything after it stay
//! literal text.
//!
//! # Examples
//!
//! ```rust
//! use dry_eta_compiler::ast::{AstNode, TagKind};
//! use dry_eta_compiler::{parse, ParserConfig};
//!
//! let ast = parse("<% if (it.ok) { %>yes<% } %>", &ParserConfig::default()).unwrap();
//! assert_eq!(ast.len(), 3);
//! assert_eq!(ast[1], AstNode::literal("yes"));
//! ```

use regex::Regex;

use crate::ast::{escape_line_breaks, escape_quotes, AstNode, Tag, TemplateAst};
use crate::config::ParserConfig;
use crate::error::{rcap, Result};
use crate::plugin::run_ast_plugins;
use crate::trim::{resolve, trim_ws, Trim};

/// Single-quoted string, no raw line breaks
static SINGLE_QUOTED: &str = r#"'(?:\\[\s\w"'\\`]|[^\n\r'\\])*?'"#;
/// Template literal, may span lines
static BACK_QUOTED: &str = r#"`(?:\\[\s\w"'\\`]|[^\\`])*?`"#;
/// Double-quoted string, no raw line breaks
static DOUBLE_QUOTED: &str = r#""(?:\\[\s\w"'\\`]|[^\n\r"\\])*?""#;
static BLOCK_COMMENT: &str = r"/\*.*?\*/";

/// Builds the tag pattern for a configuration
///
/// Groups: 1 preceding text, 2 left trim marker, 3 prefix, 4 body, 5 right trim
/// marker.
fn tag_pattern(config: &ParserConfig) -> String {
    let prefixes: Vec<String> = config
        .prefixes
        .configured()
        .map(|prefix| regex::escape(prefix.encode_utf8(&mut [0; 4])))
        .collect();

    let mut pattern = String::from("(?s)(.*?)");
    pattern.push_str(&regex::escape(&config.tags.0));
    pattern.push_str(r"([-_])?\s*(");
    pattern.push_str(&prefixes.join("|"));
    pattern.push_str(r")?\s*((?:.*?(?:");
    pattern.push_str(&[SINGLE_QUOTED, BACK_QUOTED, DOUBLE_QUOTED, BLOCK_COMMENT].join("|"));
    pattern.push_str(r")?)*?)\s*([-_])?");
    pattern.push_str(&regex::escape(&config.tags.1));
    pattern
}

/// Counts line breaks, a `\r\n` pair counting once
fn count_breaks(text: &str) -> usize {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|(i, b)| **b == b'\n' || (**b == b'\r' && bytes.get(i + 1) != Some(&b'\n')))
        .count()
}

/// A compiled tag pattern together with the configuration it was built from
#[derive(Debug, Clone)]
pub struct Scanner {
    pattern: Regex,
    config: ParserConfig,
}

/// Accumulates nodes while carrying trim state between literals
struct Builder<'c> {
    config: &'c ParserConfig,
    ast: TemplateAst,
    /// Instruction for the leading edge of the next literal
    trim_left_of_next: Option<Trim>,
}

impl<'c> Builder<'c> {
    fn new(config: &'c ParserConfig) -> Self {
        Self {
            config,
            ast: TemplateAst::default(),
            // the first literal follows no tag
            trim_left_of_next: Some(Trim::None),
        }
    }

    fn push_literal(&mut self, text: &str, trim_right: Option<Trim>) {
        if text.is_empty() {
            return;
        }
        let (after_tag, before_tag) = self.config.auto_trim;
        let escaped = escape_quotes(text);
        let trimmed = trim_ws(
            &escaped,
            resolve(self.trim_left_of_next, after_tag),
            resolve(trim_right, before_tag),
        );
        let literal = escape_line_breaks(trimmed);
        if !literal.is_empty() {
            self.ast.push(AstNode::Literal(literal));
        }
    }
}

impl Scanner {
    /// Validates the configuration and compiles its tag pattern
    pub fn new(config: &ParserConfig) -> Result<Self> {
        config.validate()?;
        let pattern = Regex::new(&tag_pattern(config))?;
        Ok(Self {
            pattern,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Splits a template into literals and tags, without running plugins
    pub fn scan(&self, src: &str) -> TemplateAst {
        let config = &self.config;
        let mut builder = Builder::new(config);
        let mut last_index = 0;
        let mut line = 1;
        let mut counted_to = 0;

        for captures in self.pattern.captures_iter(src) {
            let (Some(whole), Some(preceding)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            last_index = whole.end();

            let trim_left_of_tag = captures.get(2).and_then(|m| Trim::from_marker(m.as_str()));
            let prefix = captures.get(3).and_then(|m| m.as_str().chars().next());
            let body = captures.get(4).map_or("", |m| m.as_str());

            builder.push_literal(preceding.as_str(), trim_left_of_tag);
            builder.trim_left_of_next = captures.get(5).and_then(|m| Trim::from_marker(m.as_str()));

            let kind = config.prefixes.classify(prefix);
            let line_number = if config.debug {
                line += count_breaks(&src[counted_to..preceding.end()]);
                counted_to = preceding.end();
                Some(line)
            } else {
                None
            };
            tracing::trace!(?kind, body, line = line_number, "tag");
            builder.ast.push(AstNode::Tag(Tag {
                kind,
                body: body.to_string(),
                line: line_number,
            }));
        }

        let rest = &src[last_index..];
        if rest.contains(config.tags.0.as_str()) {
            tracing::warn!(near = %rcap(rest), "unterminated tag kept as literal text");
        }
        builder.push_literal(rest, Some(Trim::None));
        builder.ast
    }

    /// Scans a template and runs the configured AST plugins over the result
    pub fn parse(&self, src: &str) -> Result<TemplateAst> {
        let ast = self.scan(src);
        tracing::debug!(nodes = ast.len(), "parsed template");
        run_ast_plugins(ast, &self.config)
    }
}

/// Parses a template into its node sequence
pub fn parse(src: &str, config: &ParserConfig) -> Result<TemplateAst> {
    Scanner::new(config)?.parse(src)
}

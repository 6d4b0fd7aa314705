//! Template syntax tree
//!
//! A parsed template is a flat, ordered sequence of [`AstNode`]s. Literal nodes
//! hold text already escaped for embedding in a single-quoted string of the
//! generated code; tag nodes hold the trimmed tag body.
//!
//! # Examples
//!
//! ```rust
//! use dry_eta_compiler::ast::{AstNode, TagKind};
//! use dry_eta_compiler::{parse, ParserConfig};
//!
//! let ast = parse("Hi <%= it.name %>", &ParserConfig::default()).unwrap();
//! assert_eq!(ast[0], AstNode::literal("Hi "));
//! assert_eq!(ast[1], AstNode::tag(TagKind::Interpolate, "it.name"));
//! ```

use std::ops::Deref;

use crate::config::ParserConfig;

/// What a tag does with its body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// Evaluated and appended without escaping
    Raw,
    /// Evaluated, filtered and escaped per configuration, then appended
    Interpolate,
    /// Run as a statement, contributes no output directly
    Execute,
}

/// A dynamic region of the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    /// Tag content between the delimiters, surrounding whitespace removed
    pub body: String,
    /// 1-based line of the opening delimiter, recorded in debug mode only
    pub line: Option<usize>,
}

/// A single item of the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
    /// Escaped literal text, never empty
    Literal(String),
    Tag(Tag),
}

impl AstNode {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    pub fn tag(kind: TagKind, body: impl Into<String>) -> Self {
        Self::Tag(Tag {
            kind,
            body: body.into(),
            line: None,
        })
    }

    pub fn tag_at(kind: TagKind, body: impl Into<String>, line: usize) -> Self {
        Self::Tag(Tag {
            kind,
            body: body.into(),
            line: Some(line),
        })
    }
}

/// The ordered node sequence produced by one parse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateAst(Vec<AstNode>);

impl TemplateAst {
    pub fn new(nodes: Vec<AstNode>) -> Self {
        Self(nodes)
    }

    pub fn into_nodes(self) -> Vec<AstNode> {
        self.0
    }

    pub(crate) fn push(&mut self, node: AstNode) {
        self.0.push(node);
    }

    /// Rebuilds template source equivalent to the one that was parsed
    ///
    /// Literals are unescaped and tags are written back with the configured
    /// delimiters and their kind's prefix. Trimmed whitespace is not restored.
    pub fn reconstruct(&self, config: &ParserConfig) -> String {
        let (open, close) = (&config.tags.0, &config.tags.1);
        let mut out = String::new();
        for node in &self.0 {
            match node {
                AstNode::Literal(text) => out.push_str(&unescape_literal(text)),
                AstNode::Tag(tag) => {
                    out.push_str(open);
                    if tag.kind != config.prefixes.default_kind {
                        if let Some(prefix) = config.prefixes.symbol(tag.kind) {
                            out.push(prefix);
                        }
                    }
                    out.push(' ');
                    out.push_str(&tag.body);
                    out.push(' ');
                    out.push_str(close);
                }
            }
        }
        out
    }
}

impl Deref for TemplateAst {
    type Target = [AstNode];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<AstNode>> for TemplateAst {
    fn from(nodes: Vec<AstNode>) -> Self {
        Self(nodes)
    }
}

impl IntoIterator for TemplateAst {
    type Item = AstNode;
    type IntoIter = std::vec::IntoIter<AstNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Escapes text for a single-quoted string of the generated code
///
/// `\` and `'` gain a backslash; line breaks become `\n` and `\r` so the
/// literal stays on one line.
pub fn escape_literal(text: &str) -> String {
    escape_line_breaks(&escape_quotes(text))
}

pub(crate) fn escape_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub(crate) fn escape_line_breaks(text: &str) -> String {
    text.replace('\n', "\\n").replace('\r', "\\r")
}

/// Reverses [`escape_literal`]
pub fn unescape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

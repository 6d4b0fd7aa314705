//! Compiler options
//!
//! Options are plain values handed to every call. [`Config::default`] matches
//! Eta's defaults: `<%`/`%>` delimiters, `=` for interpolation, `~` for raw
//! output, no prefix for execution, auto-escaping on and one newline trimmed
//! after each tag.
//!
//! ```rust
//! use dry_eta_compiler::{Config, Trim};
//!
//! let config = Config::default()
//!     .tags("{{", "}}")
//!     .auto_trim(Trim::Slurp, Trim::Slurp)
//!     .debug(true);
//! assert!(config.parser.debug && config.generator.debug);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::ast::TagKind;
use crate::error::{Error, Result};
use crate::plugin::{TransformsAst, TransformsCode};
use crate::trim::{Trim, TRIM_MARKERS};

/// Prefix symbols selecting the kind of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefixes {
    pub execute: Option<char>,
    pub interpolate: Option<char>,
    pub raw: Option<char>,
    /// Kind of a tag that carries no recognised prefix
    pub default_kind: TagKind,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            execute: None,
            interpolate: Some('='),
            raw: Some('~'),
            default_kind: TagKind::Execute,
        }
    }
}

impl Prefixes {
    /// Symbol selecting `kind`, if one is configured
    pub fn symbol(&self, kind: TagKind) -> Option<char> {
        match kind {
            TagKind::Execute => self.execute,
            TagKind::Interpolate => self.interpolate,
            TagKind::Raw => self.raw,
        }
    }

    /// Classifies a matched prefix symbol
    pub fn classify(&self, prefix: Option<char>) -> TagKind {
        match prefix {
            Some(c) if self.execute == Some(c) => TagKind::Execute,
            Some(c) if self.raw == Some(c) => TagKind::Raw,
            Some(c) if self.interpolate == Some(c) => TagKind::Interpolate,
            _ => self.default_kind,
        }
    }

    pub(crate) fn configured(&self) -> impl Iterator<Item = char> {
        [self.execute, self.interpolate, self.raw].into_iter().flatten()
    }
}

/// Options for the tag scanner
#[derive(Clone)]
pub struct ParserConfig {
    /// Opening and closing delimiters
    pub tags: (String, String),
    pub prefixes: Prefixes,
    /// Default trimming as `(leading edge after a tag, trailing edge before a tag)`
    pub auto_trim: (Trim, Trim),
    /// Record tag line numbers
    pub debug: bool,
    pub ast_plugins: Vec<Arc<dyn TransformsAst>>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            tags: ("<%".to_string(), "%>".to_string()),
            prefixes: Prefixes::default(),
            auto_trim: (Trim::Newline, Trim::None),
            debug: false,
            ast_plugins: Vec::new(),
        }
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("tags", &self.tags)
            .field("prefixes", &self.prefixes)
            .field("auto_trim", &self.auto_trim)
            .field("debug", &self.debug)
            .field("ast_plugins", &self.ast_plugins.len())
            .finish()
    }
}

impl ParserConfig {
    /// Rejects delimiters and prefixes the scanner cannot tell apart
    pub fn validate(&self) -> Result<()> {
        let (open, close) = &self.tags;
        if open.is_empty() || close.is_empty() {
            return Err(Error::config("both an opening and a closing delimiter are required"));
        }
        let mut seen: Vec<char> = Vec::with_capacity(3);
        for prefix in self.prefixes.configured() {
            if prefix.is_whitespace() {
                return Err(Error::config("tag prefixes cannot be whitespace"));
            }
            if TRIM_MARKERS.contains(&prefix) {
                return Err(Error::config(format!(
                    "prefix '{}' collides with a whitespace trim marker",
                    prefix
                )));
            }
            if seen.contains(&prefix) {
                return Err(Error::config(format!("prefix '{}' is used for more than one tag kind", prefix)));
            }
            seen.push(prefix);
        }
        Ok(())
    }
}

/// Options for the code generator
#[derive(Clone)]
pub struct GeneratorConfig {
    /// Escape interpolated values
    pub auto_escape: bool,
    /// Pass interpolated and raw values through the filter function
    pub auto_filter: bool,
    /// Resolve bare identifiers in tag bodies against the data object
    pub use_with: bool,
    /// Emit `await includeAsync` for layouts and an `async` wrapper
    pub async_mode: bool,
    /// Track the current line and report runtime failures against it
    pub debug: bool,
    /// Text placed at the very top of the function body
    pub function_header: String,
    /// Name of the data parameter
    pub var_name: String,
    pub code_plugins: Vec<Arc<dyn TransformsCode>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            auto_escape: true,
            auto_filter: false,
            use_with: false,
            async_mode: false,
            debug: false,
            function_header: String::new(),
            var_name: "it".to_string(),
            code_plugins: Vec::new(),
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("auto_escape", &self.auto_escape)
            .field("auto_filter", &self.auto_filter)
            .field("use_with", &self.use_with)
            .field("async_mode", &self.async_mode)
            .field("debug", &self.debug)
            .field("function_header", &self.function_header)
            .field("var_name", &self.var_name)
            .field("code_plugins", &self.code_plugins.len())
            .finish()
    }
}

/// Both stages' options
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub parser: ParserConfig,
    pub generator: GeneratorConfig,
}

impl Config {
    pub fn tags(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.parser.tags = (open.into(), close.into());
        self
    }

    pub fn prefixes(mut self, prefixes: Prefixes) -> Self {
        self.parser.prefixes = prefixes;
        self
    }

    pub fn auto_trim(mut self, after_tag: Trim, before_tag: Trim) -> Self {
        self.parser.auto_trim = (after_tag, before_tag);
        self
    }

    /// Turns debug instrumentation on for both stages
    pub fn debug(mut self, debug: bool) -> Self {
        self.parser.debug = debug;
        self.generator.debug = debug;
        self
    }

    pub fn auto_escape(mut self, on: bool) -> Self {
        self.generator.auto_escape = on;
        self
    }

    pub fn auto_filter(mut self, on: bool) -> Self {
        self.generator.auto_filter = on;
        self
    }

    pub fn use_with(mut self, on: bool) -> Self {
        self.generator.use_with = on;
        self
    }

    pub fn async_mode(mut self, on: bool) -> Self {
        self.generator.async_mode = on;
        self
    }

    pub fn function_header(mut self, header: impl Into<String>) -> Self {
        self.generator.function_header = header.into();
        self
    }

    pub fn var_name(mut self, name: impl Into<String>) -> Self {
        self.generator.var_name = name.into();
        self
    }

    pub fn ast_plugin(mut self, plugin: impl TransformsAst + 'static) -> Self {
        self.parser.ast_plugins.push(Arc::new(plugin));
        self
    }

    pub fn code_plugin(mut self, plugin: impl TransformsCode + 'static) -> Self {
        self.generator.code_plugins.push(Arc::new(plugin));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ParserConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_missing_delimiter() {
        let config = Config::default().tags("<%", "");
        let err = config.parser.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_colliding_prefixes() {
        let config = Config::default().prefixes(Prefixes {
            execute: Some('!'),
            interpolate: Some('='),
            raw: Some('='),
            default_kind: TagKind::Interpolate,
        });
        assert_eq!(
            config.parser.validate().unwrap_err().to_string(),
            "invalid configuration: prefix '=' is used for more than one tag kind"
        );
    }

    #[test]
    fn rejects_trim_marker_prefix() {
        let config = Config::default().prefixes(Prefixes {
            raw: Some('-'),
            ..Prefixes::default()
        });
        assert!(config.parser.validate().is_err());
    }

    #[test]
    fn classify_falls_back_to_default_kind() {
        let prefixes = Prefixes {
            execute: Some('!'),
            interpolate: Some('='),
            raw: Some('~'),
            default_kind: TagKind::Interpolate,
        };
        assert_eq!(prefixes.classify(Some('!')), TagKind::Execute);
        assert_eq!(prefixes.classify(Some('~')), TagKind::Raw);
        assert_eq!(prefixes.classify(Some('=')), TagKind::Interpolate);
        assert_eq!(prefixes.classify(None), TagKind::Interpolate);
    }
}

//! Error handling for the template compiler
//!
//! [`Error`] covers everything that can go wrong while turning a template into a
//! function body: bad configuration, a scanner pattern that fails to build, and
//! failures raised by plugins. [`RuntimeError`] is the diagnostic a host builds
//! when the generated function throws while running in debug mode.

use std::fmt::Display;

use thiserror::Error;

/// Boxed error returned by plugin hooks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for template compilation failures
#[derive(Debug, Error)]
pub enum Error {
    /// Delimiters or prefixes that cannot be scanned unambiguously
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The scanner pattern built from the configuration did not compile
    #[error("unable to build tag scanner: {0}")]
    Pattern(#[from] regex::Error),
    /// A plugin hook failed, passed through untouched
    #[error(transparent)]
    Plugin(BoxError),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type for compilation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Number of lines shown either side of the failing line
static CONTEXT_LINES: usize = 3;

/// A failure raised while the generated function was executing
///
/// Hosts receive the caught exception together with the template source, the
/// last line recorded by `__eta.line` and the template path. Formatting points
/// at the offending template line:
///
/// ```text
/// views/index.eta:2
///     1| <p>
///  >> 2| <%= it.missing.name %>
///     3| </p>
///
/// Cannot read properties of undefined
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{report}")]
pub struct RuntimeError {
    pub line: usize,
    pub path: Option<String>,
    pub message: String,
    report: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>, template: &str, line: usize, path: Option<&str>) -> Self {
        let message = message.into();
        let lines: Vec<&str> = template.split('\n').collect();
        let start = line.saturating_sub(CONTEXT_LINES);
        let end = lines.len().min(line + CONTEXT_LINES);

        let mut report = match path {
            Some(path) => format!("{}:{}\n", path, line),
            None => format!("line {}\n", line),
        };
        let context: Vec<String> = lines
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let current = start + i + 1;
                let marker = if current == line { " >> " } else { "    " };
                format!("{}{}| {}", marker, current, text)
            })
            .collect();
        report.push_str(&context.join("\n"));
        report.push_str("\n\n");
        report.push_str(&message);

        Self {
            line,
            path: path.map(str::to_string),
            message,
            report,
        }
    }

    /// The full diagnostic including the source excerpt
    pub fn report(&self) -> &str {
        &self.report
    }
}

/// Returns the last 32 characters of a string for log context
pub(crate) fn rcap(src: &str) -> impl Display + '_ {
    static CAP_AT: usize = 32;

    let mut start = src.len().saturating_sub(CAP_AT);
    while !src.is_char_boundary(start) {
        start += 1;
    }
    &src[start..]
}

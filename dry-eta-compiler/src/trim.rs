//! Whitespace control around tags
//!
//! Every literal has two edges that can touch a tag: its leading edge (after
//! the previous tag) and its trailing edge (before the next tag). A tag can set
//! the instruction for the edge it touches with a marker right inside its
//! delimiter:
//!
//! - `-` removes a single line break (`<%- x -%>`)
//! - `_` removes all whitespace (`<%_ x _%>`)
//!
//! Without a marker the global [`ParserConfig::auto_trim`](crate::ParserConfig)
//! setting applies.

/// Marker characters recognised right inside a delimiter
pub(crate) static TRIM_MARKERS: [char; 2] = ['-', '_'];

/// Whitespace instruction for one edge of a literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trim {
    /// Leave the edge untouched
    #[default]
    None,
    /// Remove one line break
    Newline,
    /// Remove every whitespace character
    Slurp,
}

impl Trim {
    /// Reads a tag's trim marker
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "-" => Some(Self::Newline),
            "_" => Some(Self::Slurp),
            _ => None,
        }
    }
}

/// Picks the tag's explicit instruction over the configured default
pub fn resolve(explicit: Option<Trim>, default: Trim) -> Trim {
    explicit.unwrap_or(default)
}

fn strip_leading_break(text: &str) -> &str {
    text.strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .or_else(|| text.strip_prefix('\r'))
        .unwrap_or(text)
}

fn strip_trailing_break(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .or_else(|| text.strip_suffix('\r'))
        .unwrap_or(text)
}

/// Trims the leading (`left`) and trailing (`right`) edges of a literal
pub fn trim_ws(text: &str, left: Trim, right: Trim) -> &str {
    let text = match left {
        Trim::None => text,
        Trim::Newline => strip_leading_break(text),
        Trim::Slurp => text.trim_start(),
    };
    match right {
        Trim::None => text,
        Trim::Newline => strip_trailing_break(text),
        Trim::Slurp => text.trim_end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_removes_one_break_only() {
        assert_eq!(trim_ws("\n\n  a  \n\n", Trim::Newline, Trim::Newline), "\n  a  \n");
        assert_eq!(trim_ws("\r\na\r\n", Trim::Newline, Trim::Newline), "a");
        assert_eq!(trim_ws("\ra", Trim::Newline, Trim::None), "a");
    }

    #[test]
    fn slurp_removes_all_whitespace() {
        assert_eq!(trim_ws(" \t\n a \n ", Trim::Slurp, Trim::None), "a \n ");
        assert_eq!(trim_ws(" \t\n a \n ", Trim::None, Trim::Slurp), " \t\n a");
        assert_eq!(trim_ws(" \t\n a \n ", Trim::Slurp, Trim::Slurp), "a");
    }

    #[test]
    fn none_is_identity() {
        assert_eq!(trim_ws("\n a \n", Trim::None, Trim::None), "\n a \n");
    }

    #[test]
    fn explicit_marker_wins() {
        assert_eq!(resolve(Some(Trim::Slurp), Trim::Newline), Trim::Slurp);
        assert_eq!(resolve(Some(Trim::None), Trim::Newline), Trim::None);
        assert_eq!(resolve(None, Trim::Newline), Trim::Newline);
        assert_eq!(Trim::from_marker("_"), Some(Trim::Slurp));
        assert_eq!(Trim::from_marker(""), None);
    }
}

//! Ambient-scope rewriting
//!
//! With `use_with` enabled, tag bodies may name data properties directly
//! (`<%= name %>` instead of `<%= it.name %>`). Rather than emitting a `with`
//! block, the generator rewrites each body so free identifiers are qualified
//! with the data variable.
//!
//! The rewrite is a lexical scan, not a parse. It leaves alone:
//! - string, template and comment literals (template substitutions are
//!   rewritten)
//! - member names after `.` or `?.`
//! - object literal keys, and expands shorthand `{ a }` to `{ a: it.a }`
//! - keywords, common globals and the runtime helpers
//! - names bound by `let`/`const`/`var`, `function`, `class`, `catch`,
//!   method and arrow parameters in this or any earlier tag of the same
//!   template
//!
//! Anything else is treated as a data property, so a helper defined outside
//! the template is rewritten too. Regex literals are not recognised.

use std::collections::HashSet;

static RESERVED: &[&str] = &[
    // keywords and literals
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "export", "extends", "false", "finally", "for", "function", "if", "import", "in", "instanceof",
    "let", "new", "null", "of", "return", "super", "switch", "this", "throw", "true", "try", "typeof",
    "undefined", "var", "void", "while", "with", "yield", "NaN", "Infinity",
    // globals
    "Array", "Boolean", "Date", "Error", "JSON", "Map", "Math", "Number", "Object", "Promise", "RegExp", "Set",
    "String", "Symbol", "console", "decodeURIComponent", "encodeURIComponent", "isNaN", "parseFloat",
    "parseInt",
    // runtime
    "__eta", "include", "includeAsync", "layout", "options",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Declaring {
    No,
    /// After `let`/`const`/`var`, until `=`, `;`, `of` or `in`
    Binding,
    /// Function name and parameters, until `)`
    Params,
    /// A single declared name, after `class`
    Name,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Index just past a quoted string starting at `start`
fn skip_quoted(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Index of the bracket closing the one at `open`, or the end of input
fn matching(chars: &[char], open: usize) -> usize {
    let (opening, closing) = match chars[open] {
        '(' => ('(', ')'),
        '[' => ('[', ']'),
        _ => ('{', '}'),
    };
    let mut depth = 0;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\'' | '"' | '`' => {
                i = skip_quoted(chars, i, chars[i]);
                continue;
            }
            c if c == opening => depth += 1,
            c if c == closing => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => (),
        }
        i += 1;
    }
    chars.len()
}

fn next_significant(chars: &[char], from: usize) -> Option<(usize, char)> {
    chars[from.min(chars.len())..]
        .iter()
        .position(|c| !c.is_whitespace())
        .map(|offset| (from + offset, chars[from + offset]))
}

fn is_arrow_at(chars: &[char], from: usize) -> bool {
    match next_significant(chars, from) {
        Some((i, '=')) => chars.get(i + 1) == Some(&'>'),
        _ => false,
    }
}

/// Whether `name(…) {` follows, as in an object method shorthand
fn is_method_at(chars: &[char], from: usize) -> bool {
    match next_significant(chars, from) {
        Some((open, '(')) => matches!(next_significant(chars, matching(chars, open) + 1), Some((_, '{'))),
        _ => false,
    }
}

/// Lexical state of one scan
struct Scan {
    /// Most recent significant characters, newest first
    recent: [Option<char>; 3],
    brackets: Vec<char>,
    declaring: Declaring,
}

impl Scan {
    fn new() -> Self {
        Self {
            recent: [None; 3],
            brackets: Vec::new(),
            declaring: Declaring::No,
        }
    }

    fn note(&mut self, c: char) {
        self.recent = [Some(c), self.recent[0], self.recent[1]];
    }

    fn after_member_dot(&self) -> bool {
        let spread = self.recent[1] == Some('.') && self.recent[2] == Some('.');
        self.recent[0] == Some('.') && !spread
    }

    fn in_object_position(&self) -> bool {
        self.brackets.last() == Some(&'{') && matches!(self.recent[0], Some('{') | Some(','))
    }
}

/// Qualifies free identifiers of tag bodies with the data variable
#[derive(Debug, Clone)]
pub struct Rewriter {
    var_name: String,
    locals: HashSet<String>,
}

impl Rewriter {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
            locals: HashSet::new(),
        }
    }

    /// Rewrites one tag body, remembering the names it declares
    pub fn rewrite(&mut self, body: &str) -> String {
        let chars: Vec<char> = body.chars().collect();
        let mut out = String::with_capacity(body.len() + 16);
        self.rewrite_chars(&chars, &mut out);
        out
    }

    fn is_free(&self, word: &str) -> bool {
        word != self.var_name && !RESERVED.contains(&word) && !self.locals.contains(word)
    }

    fn qualify(&self, word: &str, out: &mut String) {
        out.push_str(&self.var_name);
        out.push('.');
        out.push_str(word);
    }

    fn rewrite_chars(&mut self, chars: &[char], out: &mut String) {
        let mut scan = Scan::new();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();
            match c {
                '\'' | '"' => {
                    let end = skip_quoted(chars, i, c);
                    out.extend(&chars[i..end]);
                    scan.note(c);
                    i = end;
                }
                '`' => {
                    i = self.template_literal(chars, i, out);
                    scan.note(c);
                }
                '/' if next == Some('*') => {
                    let end = (i + 2..chars.len().saturating_sub(1))
                        .find(|&j| chars[j] == '*' && chars[j + 1] == '/')
                        .map_or(chars.len(), |j| j + 2);
                    out.extend(&chars[i..end]);
                    i = end;
                }
                '/' if next == Some('/') => {
                    let end = chars[i..].iter().position(|&c| c == '\n').map_or(chars.len(), |p| i + p);
                    out.extend(&chars[i..end]);
                    i = end;
                }
                c if c.is_ascii_digit() => {
                    let end = chars[i..]
                        .iter()
                        .position(|&c| !(is_ident_char(c) || c == '.'))
                        .map_or(chars.len(), |p| i + p);
                    out.extend(&chars[i..end]);
                    scan.note(chars[end - 1]);
                    i = end;
                }
                c if is_ident_start(c) => {
                    let end = chars[i..].iter().position(|&c| !is_ident_char(c)).map_or(chars.len(), |p| i + p);
                    let word: String = chars[i..end].iter().collect();
                    self.identifier(&word, chars, end, &mut scan, out);
                    scan.note(chars[end - 1]);
                    i = end;
                }
                c => {
                    out.push(c);
                    match c {
                        '(' => {
                            if scan.declaring == Declaring::No && is_arrow_at(chars, matching(chars, i) + 1) {
                                scan.declaring = Declaring::Params;
                            }
                            scan.brackets.push(c);
                        }
                        '[' | '{' => scan.brackets.push(c),
                        ')' | ']' | '}' => {
                            scan.brackets.pop();
                            if c == ')' && scan.declaring == Declaring::Params {
                                scan.declaring = Declaring::No;
                            }
                        }
                        '=' | ';' if scan.declaring == Declaring::Binding => scan.declaring = Declaring::No,
                        _ => (),
                    }
                    if !c.is_whitespace() {
                        scan.note(c);
                    }
                    i += 1;
                }
            }
        }
    }

    fn identifier(&mut self, word: &str, chars: &[char], end: usize, scan: &mut Scan, out: &mut String) {
        if scan.after_member_dot() {
            out.push_str(word);
            return;
        }
        match word {
            "let" | "const" | "var" => scan.declaring = Declaring::Binding,
            "function" => scan.declaring = Declaring::Params,
            "class" => scan.declaring = Declaring::Name,
            "catch" if matches!(next_significant(chars, end), Some((_, '('))) => scan.declaring = Declaring::Params,
            "of" | "in" if scan.declaring == Declaring::Binding => scan.declaring = Declaring::No,
            _ if scan.declaring != Declaring::No => {
                self.locals.insert(word.to_string());
                if scan.declaring == Declaring::Name {
                    scan.declaring = Declaring::No;
                }
            }
            _ if !self.is_free(word) => (),
            _ if is_arrow_at(chars, end) => {
                self.locals.insert(word.to_string());
            }
            _ if scan.in_object_position() => match next_significant(chars, end) {
                Some((_, ':')) => (),
                Some((_, '(')) if is_method_at(chars, end) => scan.declaring = Declaring::Params,
                Some((_, '}')) | Some((_, ',')) => {
                    out.push_str(word);
                    out.push_str(": ");
                    self.qualify(word, out);
                    return;
                }
                _ => {
                    self.qualify(word, out);
                    return;
                }
            },
            _ => {
                self.qualify(word, out);
                return;
            }
        }
        out.push_str(word);
    }

    /// Copies a template literal, rewriting its `${}` substitutions
    fn template_literal(&mut self, chars: &[char], start: usize, out: &mut String) -> usize {
        out.push('`');
        let mut i = start + 1;
        while i < chars.len() {
            match chars[i] {
                '\\' => {
                    let end = (i + 2).min(chars.len());
                    out.extend(&chars[i..end]);
                    i = end;
                }
                '`' => {
                    out.push('`');
                    return i + 1;
                }
                '$' if chars.get(i + 1) == Some(&'{') => {
                    let close = matching(chars, i + 1);
                    out.push_str("${");
                    self.rewrite_chars(&chars[i + 2..close], out);
                    if close < chars.len() {
                        out.push('}');
                    }
                    i = close + 1;
                }
                c => {
                    out.push(c);
                    i += 1;
                }
            }
        }
        i
    }
}

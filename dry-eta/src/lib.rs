//! Eta templates precompiled at build time
//!
//! The macros compile templates into JavaScript function bodies while the
//! crate builds, so a template with invalid configuration or delimiters never
//! ships. The compiler itself is re-exported for use at runtime.
//!
//! ```rust
//! mod templates {
//!     dry_eta::str!("greeting", "Hello <%= it.name %>!");
//! }
//!
//! assert_eq!(templates::GREETING.name, "greeting");
//! assert!(templates::GREETING.body.contains("__eta.e(it.name)"));
//! ```

extern crate self as dry_eta;

pub use dry_eta_compiler::*;
pub use dry_eta_macros::dry_eta_directory as directory;
pub use dry_eta_macros::dry_eta_file as file;
pub use dry_eta_macros::dry_eta_str as str;

/// A template compiled by one of the macros
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// File stem or name given to `str!`
    pub name: &'static str,
    /// Function body, to be wrapped with the `it` and `options` parameters
    pub body: &'static str,
    /// The body wrapped as `function anonymous(it, options) { ... }`
    pub function: &'static str,
}

//! Plugin hooks
//!
//! A plugin rewrites the output of one stage. AST plugins run after the scan,
//! code plugins after the function body is assembled. Each runs in
//! registration order on the previous plugin's result and the last one's
//! output is what the stage returns.
//!
//! Closures implement both traits:
//!
//! ```rust
//! use dry_eta_compiler::{BoxError, Compiler, Config, GeneratorConfig};
//!
//! let config = Config::default().code_plugin(|code: String, _: &GeneratorConfig| -> Result<String, BoxError> {
//!     Ok(code.replace("__eta", "__tpl"))
//! });
//! let body = Compiler::new(config).unwrap().compile("hi").unwrap();
//! assert!(body.contains("__tpl.res+='hi'"));
//! ```

use crate::ast::TemplateAst;
use crate::config::{GeneratorConfig, ParserConfig};
use crate::error::{BoxError, Error, Result};

/// Rewrites the parsed template
pub trait TransformsAst: Send + Sync {
    fn transform_ast(&self, ast: TemplateAst, config: &ParserConfig) -> std::result::Result<TemplateAst, BoxError>;
}

/// Rewrites the generated function body
pub trait TransformsCode: Send + Sync {
    fn transform_code(&self, code: String, config: &GeneratorConfig) -> std::result::Result<String, BoxError>;
}

impl<F> TransformsAst for F
where
    F: Fn(TemplateAst, &ParserConfig) -> std::result::Result<TemplateAst, BoxError> + Send + Sync,
{
    fn transform_ast(&self, ast: TemplateAst, config: &ParserConfig) -> std::result::Result<TemplateAst, BoxError> {
        self(ast, config)
    }
}

impl<F> TransformsCode for F
where
    F: Fn(String, &GeneratorConfig) -> std::result::Result<String, BoxError> + Send + Sync,
{
    fn transform_code(&self, code: String, config: &GeneratorConfig) -> std::result::Result<String, BoxError> {
        self(code, config)
    }
}

pub(crate) fn run_ast_plugins(mut ast: TemplateAst, config: &ParserConfig) -> Result<TemplateAst> {
    for (i, plugin) in config.ast_plugins.iter().enumerate() {
        tracing::trace!(plugin = i, nodes = ast.len(), "running ast plugin");
        ast = plugin.transform_ast(ast, config).map_err(Error::Plugin)?;
    }
    Ok(ast)
}

pub(crate) fn run_code_plugins(mut code: String, config: &GeneratorConfig) -> Result<String> {
    for (i, plugin) in config.code_plugins.iter().enumerate() {
        tracing::trace!(plugin = i, len = code.len(), "running code plugin");
        code = plugin.transform_code(code, config).map_err(Error::Plugin)?;
    }
    Ok(code)
}

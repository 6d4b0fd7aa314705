//! Procedural macros precompiling Eta templates
//!
//! Each macro compiles templates while the crate builds and expands to one
//! `pub const` per template holding a `dry_eta::Template`. A template that
//! fails to compile is a compile error at the macro call.

use dry_eta_compiler::{Compiler, Config};
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use std::fs;
use std::path::Path;
use syn::{Ident, LitStr, Token, parse::Parse, parse::ParseStream, parse_macro_input};
use walkdir::WalkDir;

fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() && i > 0 && !result.ends_with('_') {
            result.push('_');
        }
        if c.is_alphanumeric() {
            result.extend(c.to_uppercase());
        } else if !result.ends_with('_') {
            result.push('_');
        }
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

fn generate_code_for_content(
    name: &str,
    content: &str,
    path_for_include: Option<&str>,
    span: Span,
) -> syn::Result<proc_macro2::TokenStream> {
    let const_name: Ident = syn::parse_str(&to_screaming_snake_case(name))
        .map_err(|_| syn::Error::new(span, format!("template name {:?} does not make a valid constant name", name)))?;

    let compiler = Compiler::new(Config::default()).map_err(|err| syn::Error::new(span, err.to_string()))?;
    let body = compiler
        .compile(content)
        .map_err(|err| syn::Error::new(span, format!("failed to compile template {}: {}", name, err)))?;
    let function = compiler
        .compile_function(content)
        .map_err(|err| syn::Error::new(span, format!("failed to compile template {}: {}", name, err)))?;

    let include_bytes_stmt = if let Some(path_str) = path_for_include {
        quote! {
            // ensure the compiler is aware the output is linked to the source so that any changes
            // to the eta file will trigger a recompilation
            const _: &[u8] = include_bytes!(#path_str);
        }
    } else {
        quote! {}
    };

    Ok(quote! {
        #include_bytes_stmt

        pub const #const_name: ::dry_eta::Template = ::dry_eta::Template {
            name: #name,
            body: #body,
            function: #function,
        };
    })
}

fn generate_code_for_file(path: &Path, span: Span) -> syn::Result<proc_macro2::TokenStream> {
    let file_stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| syn::Error::new(span, format!("Not a template file: {:?}", path)))?;
    let path_str = path.to_string_lossy();
    let content = fs::read_to_string(path).map_err(|err| syn::Error::new(span, format!("Failed to read {:?}: {}", path, err)))?;
    generate_code_for_content(&file_stem, &content, Some(&path_str), span)
}

struct StrInput {
    name: LitStr,
    content: LitStr,
}

impl Parse for StrInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: LitStr = input.parse()?;
        input.parse::<Token![,]>()?;
        let content: LitStr = input.parse()?;
        Ok(StrInput { name, content })
    }
}

fn manifest_path(lit: &LitStr) -> syn::Result<std::path::PathBuf> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").map_err(|_| syn::Error::new(lit.span(), "CARGO_MANIFEST_DIR not set"))?;
    Ok(Path::new(&manifest_dir).join(lit.value()))
}

#[proc_macro]
pub fn dry_eta_directory(input: TokenStream) -> TokenStream {
    let dir_lit = parse_macro_input!(input as LitStr);
    let root_path = match manifest_path(&dir_lit) {
        Ok(path) => path,
        Err(err) => return err.to_compile_error().into(),
    };

    if !root_path.exists() {
        return syn::Error::new(dir_lit.span(), format!("Directory not found: {:?}", root_path))
            .to_compile_error()
            .into();
    }

    let mut templates = Vec::new();

    for entry in WalkDir::new(&root_path).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "eta") {
            match generate_code_for_file(path, dir_lit.span()) {
                Ok(template) => templates.push(template),
                Err(err) => return err.to_compile_error().into(),
            }
        }
    }

    let expanded = quote! {
        #(#templates)*
    };

    TokenStream::from(expanded)
}

#[proc_macro]
pub fn dry_eta_file(input: TokenStream) -> TokenStream {
    let file_lit = parse_macro_input!(input as LitStr);
    let path = match manifest_path(&file_lit) {
        Ok(path) => path,
        Err(err) => return err.to_compile_error().into(),
    };

    if !path.exists() {
        return syn::Error::new(file_lit.span(), format!("File not found: {:?}", path))
            .to_compile_error()
            .into();
    }

    match generate_code_for_file(&path, file_lit.span()) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

#[proc_macro]
pub fn dry_eta_str(input: TokenStream) -> TokenStream {
    let StrInput { name, content } = parse_macro_input!(input as StrInput);
    match generate_code_for_content(&name.value(), &content.value(), None, content.span()) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

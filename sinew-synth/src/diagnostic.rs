//! Compile-time diagnostics produced by the synthesizers.
//!
//! A diagnostic is local to one annotation: it suppresses that annotation's
//! output and nothing else. Rendering to the compiler goes through
//! `syn::Error`, so every message carries the span of the offending node and
//! an optional `hint:` line acting as the fix-it.

use proc_macro2::{Span, TokenStream};
use thiserror::Error;

/// What went wrong during one expansion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    #[error("`#[service]` can only be applied to a struct with named fields")]
    NotAReferenceType,

    #[error("`#[service]` expects exactly one argument naming the interface type, found {found}")]
    WrongArgumentCount { found: usize },

    /// Never reported; an unrecognized argument silently produces nothing.
    #[error("`#[service]` argument is not a recognized type reference")]
    MalformedInterfaceArgument,

    #[error("`#[inject]` can only be applied to a named struct field")]
    NotAProperty,

    #[error("`#[inject]` properties must not have an optional type")]
    OptionalTypeNotAllowed,
}

impl DiagnosticKind {
    /// Whether this kind reaches the compiler at all.
    pub fn is_reported(&self) -> bool {
        !matches!(self, DiagnosticKind::MalformedInterfaceArgument)
    }
}

/// One structured diagnostic: kind, attachment point and optional fix-it.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub fix_it: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span) -> Self {
        Self {
            kind,
            span,
            fix_it: None,
        }
    }

    /// Attach a suggested fix, rendered as a `hint:` line.
    pub fn with_fix_it(mut self, fix_it: impl Into<String>) -> Self {
        self.fix_it = Some(fix_it.into());
        self
    }

    pub fn message(&self) -> String {
        match &self.fix_it {
            Some(fix_it) => format!("{}\nhint: {}", self.kind, fix_it),
            None => self.kind.to_string(),
        }
    }

    pub fn to_syn_error(&self) -> syn::Error {
        syn::Error::new(self.span, self.message())
    }
}

/// Render every reported diagnostic as `compile_error!` invocations.
pub fn to_compile_errors<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> TokenStream {
    let mut combined: Option<syn::Error> = None;

    for diagnostic in diagnostics {
        if !diagnostic.kind.is_reported() {
            continue;
        }
        sinew_log::warn!("{}", diagnostic.kind);
        let error = diagnostic.to_syn_error();
        match combined.as_mut() {
            Some(existing) => existing.combine(error),
            None => combined = Some(error),
        }
    }

    combined
        .map(|error| error.to_compile_error())
        .unwrap_or_default()
}

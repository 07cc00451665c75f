//! Synthesized members and the naming rules they share.

use crate::config::SynthConfig;
use crate::declaration::Param;
use proc_macro2::TokenStream;
use quote::{format_ident, quote, ToTokens};
use syn::{Ident, ImplItemFn, Type};

/// Which synthesizable member a fragment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    InterfaceAlias,
    ProviderField,
    ProviderConstructor,
    AggregatingConstructor,
    BackingField,
    AccessorPair,
    Conformance,
}

/// Where a fragment lands in the host tree.
#[derive(Debug, Clone)]
pub enum Fragment {
    /// A stored field added to the struct body
    Field(syn::Field),
    /// Associated functions for the inherent `impl` block
    Methods(Vec<ImplItemFn>),
    /// A module-level item next to the struct
    Item(syn::Item),
}

impl ToTokens for Fragment {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match self {
            Fragment::Field(field) => field.to_tokens(tokens),
            Fragment::Methods(methods) => {
                for method in methods {
                    method.to_tokens(tokens);
                }
            }
            Fragment::Item(item) => item.to_tokens(tokens),
        }
    }
}

/// One addition for the host to merge.
#[derive(Debug, Clone)]
pub struct SynthesizedMember {
    pub kind: MemberKind,
    pub fragment: Fragment,
}

impl SynthesizedMember {
    pub fn new(kind: MemberKind, fragment: Fragment) -> Self {
        Self { kind, fragment }
    }

    /// Rendered source text, handy for logs and assertions.
    pub fn to_source(&self) -> String {
        self.fragment.to_token_stream().to_string()
    }
}

/// Name of the stored provider field.
pub const PROVIDER_FIELD: &str = "provider";

/// `<Name>Interface`
pub fn alias_ident(declaration: &Ident, config: &SynthConfig) -> Ident {
    format_ident!("{}{}", declaration, config.alias_suffix)
}

/// `__<name>`
pub fn backing_ident(property: &Ident, config: &SynthConfig) -> Ident {
    format_ident!("{}{}", config.backing_prefix, unraw(property))
}

/// `set_<name>`
pub fn setter_ident(property: &Ident, config: &SynthConfig) -> Ident {
    format_ident!("{}{}", config.setter_prefix, unraw(property))
}

/// The identifier text without a `r#` prefix.
pub(crate) fn unraw(ident: &Ident) -> String {
    let text = ident.to_string();
    text.strip_prefix("r#").map(str::to_string).unwrap_or(text)
}

/// The provider field's type, `Option<Arc<dyn Provider>>`.
pub fn provider_type(config: &SynthConfig) -> Type {
    let runtime = &config.runtime;
    syn::parse_quote!(::core::option::Option<::std::sync::Arc<dyn #runtime::Provider>>)
}

/// Whether `ty` is spelled as an `Option`, under any path.
pub fn is_optional_type(ty: &Type) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Option"),
        Type::Paren(inner) => is_optional_type(&inner.elem),
        Type::Group(inner) => is_optional_type(&inner.elem),
        _ => false,
    }
}

/// Normalized parameter signature: `name:Type` entries joined by `,`
/// with all whitespace removed.
pub fn signature_text(params: &[Param]) -> String {
    params
        .iter()
        .map(|param| {
            let ty = &param.ty;
            let rendered = format!("{}:{}", param.name, quote!(#ty));
            rendered.chars().filter(|c| !c.is_whitespace()).collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(",")
}

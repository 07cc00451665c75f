//! Service synthesis for `#[service(..)]`.
//!
//! Produces, in order and only where nothing equivalent exists yet: the
//! interface alias, the provider field, the provider constructor and the
//! aggregating constructor. The conformance to the `Service` marker is
//! computed separately by [`synthesize_conformance`].

use crate::config::SynthConfig;
use crate::declaration::{Declaration, Param};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::extract::{extract, TypeReference};
use crate::matcher::{self, Candidate};
use crate::member::{
    alias_ident, backing_ident, is_optional_type, provider_type, setter_ident, signature_text,
    Fragment, MemberKind, SynthesizedMember, PROVIDER_FIELD,
};
use proc_macro2::{Span, TokenStream, TokenTree};
use quote::{quote, ToTokens};
use sinew_log::debug;
use syn::{
    parse::Parser, punctuated::Punctuated, spanned::Spanned, Attribute, Expr, Ident, Meta, Token,
    Type,
};

/// Name of the service capability marker.
pub const SERVICE_MARKER: &str = "Service";

/// The primary annotation's arguments, split at top-level commas.
#[derive(Debug, Clone)]
pub struct ServiceAnnotation {
    pub args: Vec<TokenStream>,
    pub span: Span,
}

impl ServiceAnnotation {
    /// Split raw attribute arguments.
    pub fn parse(tokens: TokenStream, span: Span) -> Self {
        // generic arguments and closure parameters hold commas of their own
        let args = Punctuated::<Type, Token![,]>::parse_terminated
            .parse2(tokens.clone())
            .map(|types| types.iter().map(ToTokens::to_token_stream).collect())
            .or_else(|_| {
                Punctuated::<Expr, Token![,]>::parse_terminated
                    .parse2(tokens.clone())
                    .map(|exprs| exprs.iter().map(ToTokens::to_token_stream).collect())
            })
            .unwrap_or_else(|_| split_arguments(tokens));
        Self { args, span }
    }

    pub fn from_attribute(attr: &Attribute) -> Self {
        let span = attr.span();
        match &attr.meta {
            Meta::Path(_) => Self::parse(TokenStream::new(), span),
            Meta::List(list) => Self::parse(list.tokens.clone(), span),
            Meta::NameValue(name_value) => Self {
                args: vec![name_value.value.to_token_stream()],
                span,
            },
        }
    }

    /// The interface type, if there is exactly one argument and it is a
    /// recognized type reference.
    pub fn interface(&self) -> Option<TypeReference> {
        match self.args.as_slice() {
            [argument] => extract(argument),
            _ => None,
        }
    }
}

/// Last-resort split for arguments that are neither types nor expressions.
fn split_arguments(tokens: TokenStream) -> Vec<TokenStream> {
    let mut args = Vec::new();
    let mut current = TokenStream::new();

    for token in tokens {
        match &token {
            TokenTree::Punct(punct) if punct.as_char() == ',' => {
                args.push(std::mem::take(&mut current));
            }
            _ => current.extend([token]),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

/// Expand one primary annotation into its ordered additions.
pub fn synthesize_service(
    annotation: &ServiceAnnotation,
    declaration: &Declaration,
    config: &SynthConfig,
) -> Result<Vec<SynthesizedMember>, Diagnostic> {
    if !declaration.kind.is_reference_type() {
        return Err(Diagnostic::new(DiagnosticKind::NotAReferenceType, declaration.span)
            .with_fix_it(format!(
                "`{}` is {}; declare it as `struct {} {{ .. }}`",
                declaration.ident,
                declaration.kind.describe(),
                declaration.ident
            )));
    }

    if annotation.args.len() != 1 {
        return Err(Diagnostic::new(
            DiagnosticKind::WrongArgumentCount {
                found: annotation.args.len(),
            },
            annotation.span,
        ));
    }

    let Some(interface) = annotation.interface() else {
        debug!(
            "{}: {}; nothing generated",
            declaration.ident,
            DiagnosticKind::MalformedInterfaceArgument
        );
        return Ok(Vec::new());
    };

    let vis = &declaration.vis;
    let mut members = Vec::new();

    if !matcher::exists(Candidate::InterfaceAlias, declaration, config) {
        let alias = alias_ident(&declaration.ident, config);
        debug!("{}: emitting alias {} = {}", declaration.ident, alias, interface);
        members.push(SynthesizedMember::new(
            MemberKind::InterfaceAlias,
            Fragment::Item(syn::parse_quote! {
                #vis type #alias = #interface;
            }),
        ));
    }

    if !matcher::exists(Candidate::ProviderField, declaration, config) {
        let field = Ident::new(PROVIDER_FIELD, Span::call_site());
        let ty = provider_type(config);
        members.push(SynthesizedMember::new(
            MemberKind::ProviderField,
            Fragment::Field(syn::parse_quote! {
                #vis #field: #ty
            }),
        ));
    }

    if !matcher::exists(Candidate::ProviderConstructor, declaration, config) {
        let name = config.ident(&config.provider_constructor);
        let ty = provider_type(config);
        let value = unset_instance(declaration, config, quote!(provider));
        members.push(SynthesizedMember::new(
            MemberKind::ProviderConstructor,
            Fragment::Methods(vec![syn::parse_quote! {
                /// Builds an instance wired to `provider`, with every injected property unset.
                #vis fn #name(provider: #ty) -> Self {
                    #value
                }
            }]),
        ));
    }

    let params: Vec<Param> = declaration
        .injected_fields()
        .map(|field| Param {
            name: field.ident.to_string(),
            ty: field.ty.clone(),
        })
        .collect();

    if !params.is_empty() {
        let signature = signature_text(&params);
        if matcher::exists(Candidate::AggregatingConstructor(&signature), declaration, config) {
            debug!("{}: constructor ({}) already declared", declaration.ident, signature);
        } else {
            members.push(aggregating_constructor(declaration, config));
        }
    }

    debug!(
        "{}: {} member(s) synthesized for #[service({})]",
        declaration.ident,
        members.len(),
        interface
    );
    Ok(members)
}

/// Emit the `Service` conformance if the host requested it and the
/// declaration does not already declare it under either spelling.
pub fn synthesize_conformance(
    declaration: &Declaration,
    requested: &[&str],
    config: &SynthConfig,
) -> Option<SynthesizedMember> {
    let spellings = config.marker_spellings(SERVICE_MARKER);
    let is_requested = requested
        .iter()
        .any(|marker| spellings.iter().any(|spelling| spelling == marker));

    if !is_requested {
        return None;
    }
    if declaration.conforms_to(SERVICE_MARKER, config) {
        debug!("{}: already conforms to {}", declaration.ident, SERVICE_MARKER);
        return None;
    }

    let ident = &declaration.ident;
    let runtime = &config.runtime;
    let marker = config.ident(SERVICE_MARKER);
    let alias = alias_ident(ident, config);
    let ty = provider_type(config);
    let constructor = matcher::provider_constructor(declaration)
        .map(|constructor| constructor.ident.clone())
        .unwrap_or_else(|| config.ident(&config.provider_constructor));
    let (impl_generics, ty_generics, where_clause) = declaration.generics.split_for_impl();

    Some(SynthesizedMember::new(
        MemberKind::Conformance,
        Fragment::Item(syn::parse_quote! {
            impl #impl_generics #runtime::#marker for #ident #ty_generics #where_clause {
                type Interface = #alias;

                fn with_provider(provider: #ty) -> Self {
                    <#ident #ty_generics>::#constructor(provider)
                }
            }
        }),
    ))
}

/// `Self { .. }` with `provider` set from `provider_value`, every injected
/// property unset and every other field defaulted.
fn unset_instance(declaration: &Declaration, config: &SynthConfig, provider_value: TokenStream) -> TokenStream {
    let runtime = &config.runtime;
    let provider = Ident::new(PROVIDER_FIELD, Span::call_site());

    let inits = declaration
        .fields()
        .filter(|field| field.ident != PROVIDER_FIELD)
        .map(|field| {
            if field.injected && !is_optional_type(&field.ty) {
                let backing = backing_ident(&field.ident, config);
                quote!(#backing: #runtime::__private::OnceLock::new())
            } else {
                let ident = &field.ident;
                quote!(#ident: ::core::default::Default::default())
            }
        });

    quote! {
        Self {
            #provider: #provider_value,
            #(#inits,)*
        }
    }
}

fn aggregating_constructor(declaration: &Declaration, config: &SynthConfig) -> SynthesizedMember {
    let vis = &declaration.vis;
    let name = config.ident(&config.aggregating_constructor);
    let value = unset_instance(declaration, config, quote!(::core::option::Option::None));

    let injected: Vec<_> = declaration.injected_fields().collect();
    let params = injected.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        quote!(#ident: #ty)
    });
    let assignments = injected.iter().map(|field| {
        let ident = &field.ident;
        if is_optional_type(&field.ty) {
            // rejected by the accessor synthesizer, still a plain field
            quote!(__this.#ident = #ident;)
        } else {
            let setter = setter_ident(ident, config);
            quote!(__this.#setter(#ident);)
        }
    });

    SynthesizedMember::new(
        MemberKind::AggregatingConstructor,
        Fragment::Methods(vec![syn::parse_quote! {
            /// Builds an instance from explicitly supplied dependencies, without a provider.
            #vis fn #name(#(#params),*) -> Self {
                let mut __this = #value;
                #(#assignments)*
                __this
            }
        }]),
    )
}

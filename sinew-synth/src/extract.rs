//! Type-reference extraction for the `#[service(..)]` argument.
//!
//! Accepted shapes:
//! - a bare name (`Greeter`, `crate::api::Greeter`)
//! - an existential name (`dyn Greet`, `(dyn Greet)`), preserved verbatim
//! - a parenthesized or one-element tuple around either of the above,
//!   unwrapped one level at a time (`(Greeter,)`, `((dyn Greet),)`)
//!
//! Everything else yields nothing.

use proc_macro2::TokenStream;
use quote::ToTokens;
use std::fmt;
use syn::{Type, TypeParamBound};

/// The interface type named by a service annotation.
#[derive(Debug, Clone)]
pub struct TypeReference {
    pub ty: Type,
    /// Written as `dyn Trait`
    pub existential: bool,
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = &self.ty;
        let text = quote::quote!(#ty).to_string();
        // `quote` spaces path separators; print the way the user wrote it
        write!(f, "{}", text.replace(" :: ", "::"))
    }
}

impl ToTokens for TypeReference {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.ty.to_tokens(tokens);
    }
}

/// Parse one annotation argument into a type reference.
pub fn extract(argument: &TokenStream) -> Option<TypeReference> {
    let ty: Type = syn::parse2(argument.clone()).ok()?;
    extract_type(&ty)
}

fn extract_type(ty: &Type) -> Option<TypeReference> {
    match ty {
        Type::Path(path) if is_bare_name(path) => Some(TypeReference {
            ty: ty.clone(),
            existential: false,
        }),
        Type::TraitObject(object) if object.dyn_token.is_some() && is_single_trait(object) => {
            Some(TypeReference {
                ty: ty.clone(),
                existential: true,
            })
        }
        Type::Paren(paren) => match paren.elem.as_ref() {
            Type::TraitObject(_) | Type::Path(_) => extract_type(&paren.elem),
            inner => unwrap_first(inner),
        },
        Type::Group(group) => extract_type(&group.elem),
        Type::Tuple(tuple) => tuple.elems.first().and_then(unwrap_once),
        _ => None,
    }
}

/// Retry on an element one level down, without unwrapping further tuples.
fn unwrap_once(ty: &Type) -> Option<TypeReference> {
    match ty {
        Type::Tuple(_) => None,
        other => extract_type(other),
    }
}

fn unwrap_first(ty: &Type) -> Option<TypeReference> {
    match ty {
        Type::Tuple(tuple) => tuple.elems.first().and_then(unwrap_once),
        _ => None,
    }
}

fn is_bare_name(path: &syn::TypePath) -> bool {
    path.qself.is_none()
        && path
            .path
            .segments
            .iter()
            .all(|segment| segment.arguments.is_none())
}

fn is_single_trait(object: &syn::TypeTraitObject) -> bool {
    let mut traits = object.bounds.iter().filter_map(|bound| match bound {
        TypeParamBound::Trait(bound) => Some(bound),
        _ => None,
    });

    match (traits.next(), traits.next()) {
        (Some(bound), None) => bound
            .path
            .segments
            .iter()
            .all(|segment| segment.arguments.is_none()),
        _ => false,
    }
}

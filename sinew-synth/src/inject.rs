//! Accessor synthesis for `#[inject]` properties.
//!
//! Each annotated field becomes a private backing cell plus a read/write
//! accessor pair. Whether the read accessor resolves through the provider is
//! decided by the caller and passed in as [`AccessorContext`]; this module
//! never inspects the enclosing declaration.

use crate::config::SynthConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::member::{
    backing_ident, is_optional_type, setter_ident, unraw, Fragment, MemberKind, SynthesizedMember,
};
use proc_macro2::Span;
use quote::quote;
use sinew_log::debug;
use syn::{Attribute, Ident, Type, Visibility};

/// A named field carrying `#[inject]`.
#[derive(Debug, Clone)]
pub struct InjectedProperty {
    pub ident: Ident,
    pub ty: Type,
    pub vis: Visibility,
    /// Doc attributes, moved onto the read accessor
    pub docs: Vec<Attribute>,
    pub span: Span,
}

impl InjectedProperty {
    pub fn from_field(field: &syn::Field) -> Option<Self> {
        let ident = field.ident.clone()?;
        Some(Self {
            span: ident.span(),
            ident,
            ty: field.ty.clone(),
            vis: field.vis.clone(),
            docs: field
                .attrs
                .iter()
                .filter(|attr| attr.path().is_ident("doc"))
                .cloned()
                .collect(),
        })
    }
}

/// The node a field annotation was found on.
#[derive(Debug, Clone)]
pub enum InjectTarget {
    Field(InjectedProperty),
    /// Anything that cannot hold state: a method, a tuple field, an item
    NotAField { span: Span, description: String },
}

/// Declaration-scoped facts the accessor depends on.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessorContext {
    /// The declaration conforms to `Injectable`
    pub injectable: bool,
}

/// Expand one field annotation into a backing field and an accessor pair.
pub fn synthesize_accessors(
    target: &InjectTarget,
    context: &AccessorContext,
    config: &SynthConfig,
) -> Result<Vec<SynthesizedMember>, Diagnostic> {
    let property = match target {
        InjectTarget::Field(property) => property,
        InjectTarget::NotAField { span, description } => {
            return Err(Diagnostic::new(DiagnosticKind::NotAProperty, *span).with_fix_it(format!(
                "remove `#[inject]` from this {} or move it to a named struct field",
                description
            )));
        }
    };

    if is_optional_type(&property.ty) {
        return Err(
            Diagnostic::new(DiagnosticKind::OptionalTypeNotAllowed, property.span).with_fix_it(
                "use the inner type; an unset property is already represented by the backing cell",
            ),
        );
    }

    let runtime = &config.runtime;
    let ident = &property.ident;
    let ty = &property.ty;
    let vis = &property.vis;
    let docs = &property.docs;
    let backing = backing_ident(ident, config);
    let setter = setter_ident(ident, config);
    let name = unraw(ident);

    let backing_field = SynthesizedMember::new(
        MemberKind::BackingField,
        Fragment::Field(syn::parse_quote! {
            #backing: #runtime::__private::OnceLock<#ty>
        }),
    );

    let resolve = context.injectable.then(|| {
        quote! {
            if self.#backing.get().is_none() {
                if let ::core::option::Option::Some(provider) = #runtime::Injectable::provider(self) {
                    let value = #runtime::ProviderExt::require::<#ty>(provider);
                    let _ = self.#backing.set(value);
                }
            }
        }
    });

    let getter: syn::ImplItemFn = syn::parse_quote! {
        #(#docs)*
        #vis fn #ident(&self) -> &#ty {
            #resolve
            match self.#backing.get() {
                ::core::option::Option::Some(value) => value,
                ::core::option::Option::None => {
                    #runtime::__private::unresolved(#name, ::core::any::type_name::<#ty>())
                }
            }
        }
    };

    let setter: syn::ImplItemFn = syn::parse_quote! {
        #vis fn #setter(&mut self, value: #ty) {
            self.#backing = #runtime::__private::OnceLock::from(value);
        }
    };

    debug!(
        "{}: accessors generated ({})",
        name,
        if context.injectable { "resolving" } else { "stored only" }
    );

    Ok(vec![
        backing_field,
        SynthesizedMember::new(MemberKind::AccessorPair, Fragment::Methods(vec![getter, setter])),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn property(field: syn::Field) -> InjectTarget {
        InjectTarget::Field(InjectedProperty::from_field(&field).unwrap())
    }

    fn named_field(tokens: proc_macro2::TokenStream) -> syn::Field {
        let item: syn::ItemStruct = parse_quote!(struct Holder { #tokens });
        item.fields.into_iter().next().unwrap()
    }

    #[test]
    fn test_backing_field_and_accessor_pair() {
        let config = SynthConfig::default();
        let target = property(named_field(quote!(pub clock: Arc<dyn Clock>)));
        let members =
            synthesize_accessors(&target, &AccessorContext { injectable: true }, &config).unwrap();

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].kind, MemberKind::BackingField);
        assert_eq!(members[1].kind, MemberKind::AccessorPair);

        let backing = members[0].to_source();
        assert!(backing.starts_with("__clock"), "{}", backing);
        assert!(backing.contains("OnceLock < Arc < dyn Clock > >"));

        let accessors = members[1].to_source();
        assert!(accessors.contains("pub fn clock (& self) -> & Arc < dyn Clock >"));
        assert!(accessors.contains("pub fn set_clock (& mut self , value : Arc < dyn Clock >)"));
    }

    #[test]
    fn test_resolution_only_when_injectable() {
        let config = SynthConfig::default();
        let target = property(named_field(quote!(clock: Arc<dyn Clock>)));

        let resolving =
            synthesize_accessors(&target, &AccessorContext { injectable: true }, &config).unwrap();
        assert!(resolving[1].to_source().contains("ProviderExt :: require"));

        let stored =
            synthesize_accessors(&target, &AccessorContext::default(), &config).unwrap();
        let source = stored[1].to_source();
        assert!(!source.contains("ProviderExt"));
        assert!(source.contains("unresolved (\"clock\""));
    }

    #[test]
    fn test_docs_move_to_read_accessor() {
        let config = SynthConfig::default();
        let target = property(named_field(quote! {
            /// Wall clock.
            clock: Arc<dyn Clock>
        }));
        let members = synthesize_accessors(&target, &AccessorContext::default(), &config).unwrap();
        assert!(members[1].to_source().contains("Wall clock."));
        assert!(!members[0].to_source().contains("Wall clock."));
    }

    #[test]
    fn test_optional_type_is_rejected() {
        let config = SynthConfig::default();
        let target = property(named_field(quote!(clock: Option<Arc<dyn Clock>>)));
        let error =
            synthesize_accessors(&target, &AccessorContext::default(), &config).unwrap_err();
        assert_eq!(error.kind, DiagnosticKind::OptionalTypeNotAllowed);
    }

    #[test]
    fn test_non_field_is_rejected_with_fix_it() {
        let config = SynthConfig::default();
        let target = InjectTarget::NotAField {
            span: Span::call_site(),
            description: "method".to_string(),
        };
        let error =
            synthesize_accessors(&target, &AccessorContext { injectable: true }, &config)
                .unwrap_err();
        assert_eq!(error.kind, DiagnosticKind::NotAProperty);
        assert!(error.fix_it.unwrap().contains("this method"));
    }

    #[test]
    fn test_raw_identifier_names() {
        let config = SynthConfig::default();
        let target = property(named_field(quote!(r#type: Kind)));
        let members = synthesize_accessors(&target, &AccessorContext::default(), &config).unwrap();
        assert!(members[0].to_source().starts_with("__type"));
        let accessors = members[1].to_source();
        assert!(accessors.contains("fn r#type (& self)"));
        assert!(accessors.contains("fn set_type"));
    }
}

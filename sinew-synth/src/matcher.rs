//! Structural matching against existing members.
//!
//! Matching is deliberately weak: the alias, provider field and provider
//! constructor are matched by name only, so a hand-written member with an
//! incompatible type suppresses synthesis and the mismatch surfaces later as
//! an ordinary type error. Only the aggregating constructor is compared by
//! its full normalized signature.

use crate::config::SynthConfig;
use crate::declaration::{ConstructorMember, Declaration};
use crate::member::{signature_text, PROVIDER_FIELD};
use sinew_log::trace;

/// A member the service synthesizer may add.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    InterfaceAlias,
    ProviderField,
    ProviderConstructor,
    /// Normalized signature of the would-be aggregating constructor
    AggregatingConstructor(&'a str),
}

/// Does a structurally equivalent member already exist?
pub fn exists(candidate: Candidate<'_>, declaration: &Declaration, config: &SynthConfig) -> bool {
    let found = match candidate {
        Candidate::InterfaceAlias => declaration
            .aliases()
            .any(|(name, _)| name == config.alias_suffix),
        Candidate::ProviderField => declaration
            .fields()
            .any(|field| field.ident == PROVIDER_FIELD),
        Candidate::ProviderConstructor => provider_constructor(declaration).is_some(),
        Candidate::AggregatingConstructor(signature) => declaration
            .constructors()
            .any(|constructor| signature_text(&constructor.params) == signature),
    };

    trace!(
        "{}: {:?} {}",
        declaration.ident,
        candidate,
        if found { "already declared" } else { "missing" }
    );
    found
}

/// The existing constructor taking exactly one parameter named `provider`.
pub fn provider_constructor(declaration: &Declaration) -> Option<&ConstructorMember> {
    declaration.constructors().find(|constructor| {
        constructor.params.len() == 1 && constructor.params[0].name == PROVIDER_FIELD
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{parse_quote, Ident};

    fn collect_greeter(file: syn::File) -> Declaration {
        let ident: Ident = parse_quote!(Greeter);
        Declaration::collect(&file.items, &ident, &SynthConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_declaration_matches_nothing() {
        let config = SynthConfig::default();
        let declaration = collect_greeter(parse_quote! {
            struct Greeter { name: String }
        });

        assert!(!exists(Candidate::InterfaceAlias, &declaration, &config));
        assert!(!exists(Candidate::ProviderField, &declaration, &config));
        assert!(!exists(Candidate::ProviderConstructor, &declaration, &config));
        assert!(!exists(Candidate::AggregatingConstructor(""), &declaration, &config));
    }

    #[test]
    fn test_alias_matched_by_name_only() {
        let config = SynthConfig::default();
        let declaration = collect_greeter(parse_quote! {
            struct Greeter { name: String }
            type GreeterInterface = SomethingElse;
        });
        assert!(exists(Candidate::InterfaceAlias, &declaration, &config));
    }

    #[test]
    fn test_provider_field_matched_by_name_only() {
        let config = SynthConfig::default();
        let declaration = collect_greeter(parse_quote! {
            struct Greeter { provider: u32 }
        });
        assert!(exists(Candidate::ProviderField, &declaration, &config));
    }

    #[test]
    fn test_provider_constructor_matched_by_parameter_name() {
        let config = SynthConfig::default();
        let declaration = collect_greeter(parse_quote! {
            struct Greeter { name: String }
            impl Greeter {
                fn wired(provider: MyProvider) -> Self { todo!() }
            }
        });
        assert!(exists(Candidate::ProviderConstructor, &declaration, &config));
        assert_eq!(provider_constructor(&declaration).unwrap().ident, "wired");

        let declaration = collect_greeter(parse_quote! {
            struct Greeter { name: String }
            impl Greeter {
                fn wired(provider: MyProvider, extra: u8) -> Self { todo!() }
                fn other(source: MyProvider) -> Self { todo!() }
            }
        });
        assert!(!exists(Candidate::ProviderConstructor, &declaration, &config));
    }

    #[test]
    fn test_aggregating_constructor_matched_by_signature() {
        let config = SynthConfig::default();
        let declaration = collect_greeter(parse_quote! {
            struct Greeter { clock: Arc<dyn Clock>, name: String }
            impl Greeter {
                fn assemble(clock: Arc< dyn Clock >, name: String) -> Greeter {
                    unimplemented!("body differs")
                }
            }
        });

        assert!(exists(
            Candidate::AggregatingConstructor("clock:Arc<dynClock>,name:String"),
            &declaration,
            &config
        ));
        assert!(!exists(
            Candidate::AggregatingConstructor("name:String,clock:Arc<dynClock>"),
            &declaration,
            &config
        ));
    }
}

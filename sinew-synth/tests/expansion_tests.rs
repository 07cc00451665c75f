// Tests for the attribute hosts, run on token streams

use proc_macro2::TokenStream;
use quote::quote;
use sinew_synth::{derive_injectable, expand_injected, expand_module, expand_service, SynthConfig};
use syn::{Fields, ImplItem, Item};

fn parse(tokens: TokenStream) -> syn::File {
    syn::parse2(tokens).expect("expansion output should parse as items")
}

fn service(attr: TokenStream, item: TokenStream) -> syn::File {
    parse(expand_service(attr, item, &SynthConfig::default()))
}

fn field_names(file: &syn::File, name: &str) -> Vec<String> {
    file.items
        .iter()
        .find_map(|item| match item {
            Item::Struct(item) if item.ident == name => Some(item),
            _ => None,
        })
        .map(|item| match &item.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref().map(ToString::to_string))
                .collect(),
            _ => Vec::new(),
        })
        .unwrap_or_default()
}

/// Methods of every inherent impl block, in order.
fn inherent_methods(file: &syn::File) -> Vec<String> {
    file.items
        .iter()
        .filter_map(|item| match item {
            Item::Impl(block) if block.trait_.is_none() => Some(block),
            _ => None,
        })
        .flat_map(|block| block.items.iter())
        .filter_map(|item| match item {
            ImplItem::Fn(method) => Some(method.sig.ident.to_string()),
            _ => None,
        })
        .collect()
}

fn trait_impls(file: &syn::File) -> Vec<String> {
    file.items
        .iter()
        .filter_map(|item| match item {
            Item::Impl(block) => block
                .trait_
                .as_ref()
                .map(|(_, path, _)| quote!(#path).to_string().replace(' ', "")),
            _ => None,
        })
        .collect()
}

fn aliases(file: &syn::File) -> Vec<String> {
    file.items
        .iter()
        .filter_map(|item| match item {
            Item::Type(alias) => Some(alias.ident.to_string()),
            _ => None,
        })
        .collect()
}

fn has_compile_error(tokens: &TokenStream) -> bool {
    tokens.to_string().contains("compile_error")
}

#[test]
fn test_end_to_end_service() {
    let file = service(
        quote!(C),
        quote! {
            pub struct C {
                #[inject]
                dep: Dep,
            }
        },
    );

    assert_eq!(aliases(&file), vec!["CInterface"]);
    assert_eq!(field_names(&file, "C"), vec!["__dep", "provider"]);
    assert_eq!(
        inherent_methods(&file),
        vec!["with_provider", "new", "dep", "set_dep"]
    );
    assert_eq!(trait_impls(&file), vec!["::sinew::Service"]);
}

#[test]
fn test_accessor_resolves_only_for_injectable_declarations() {
    let plain = expand_service(
        quote!(C),
        quote! {
            struct C { #[inject] dep: Dep }
        },
        &SynthConfig::default(),
    );
    assert!(!plain.to_string().contains("ProviderExt"));

    let injectable = expand_service(
        quote!(C),
        quote! {
            #[derive(sinew::Injectable)]
            struct C { #[inject] dep: Dep }
        },
        &SynthConfig::default(),
    );
    assert!(injectable.to_string().contains("ProviderExt :: require"));
}

#[test]
fn test_no_aggregating_constructor_without_injected_fields() {
    let file = service(
        quote!(dyn Greet),
        quote! {
            pub struct Greeter { name: String }
        },
    );
    assert_eq!(inherent_methods(&file), vec!["with_provider"]);
    assert_eq!(field_names(&file, "Greeter"), vec!["name", "provider"]);
}

#[test]
fn test_wrong_argument_count_keeps_item_and_field_annotations() {
    let tokens = expand_service(
        quote!(),
        quote! {
            struct C { #[inject] dep: Dep }
        },
        &SynthConfig::default(),
    );
    assert!(has_compile_error(&tokens));
    assert!(tokens.to_string().contains("found 0"));

    let file = parse(tokens);
    assert!(aliases(&file).is_empty());
    assert!(trait_impls(&file).is_empty());
    assert_eq!(inherent_methods(&file), vec!["dep", "set_dep"]);
}

#[test]
fn test_non_struct_is_rejected() {
    let tokens = expand_service(
        quote!(Mode),
        quote! {
            enum Mode { Fast, Slow }
        },
        &SynthConfig::default(),
    );
    assert!(has_compile_error(&tokens));
    assert!(tokens.to_string().contains("hint"));

    let file = parse(tokens);
    assert!(matches!(file.items[0], Item::Enum(_)));
}

#[test]
fn test_unmodelled_items_are_rejected_with_fix_it() {
    let items = [
        (quote!(fn make() -> u8 { 0 }), "struct make"),
        (quote!(impl Greeter {}), "struct Greeter"),
        (quote!(mod registry {}), "struct registry"),
        (quote!(use std::sync::Arc;), "struct Name"),
        (quote!(const LIMIT: u8 = 3;), "struct LIMIT"),
    ];

    for (item, suggestion) in items {
        let tokens = expand_service(quote!(Greeter), item.clone(), &SynthConfig::default());
        let text = tokens.to_string();
        assert!(has_compile_error(&tokens), "{}", item);
        assert!(text.contains("hint"), "{}", text);
        assert!(text.contains(suggestion), "{}", text);
    }
}

#[test]
fn test_generic_call_argument_is_silent() {
    let tokens = expand_service(
        quote!(make::<A, B>()),
        quote! {
            struct C { name: String }
        },
        &SynthConfig::default(),
    );
    assert!(!has_compile_error(&tokens));
    assert!(!tokens.to_string().contains("found 2"));
}

#[test]
fn test_malformed_argument_is_silent() {
    let tokens = expand_service(
        quote!(Vec<u8>),
        quote! {
            struct C { name: String }
        },
        &SynthConfig::default(),
    );
    assert!(!has_compile_error(&tokens));

    let file = parse(tokens);
    assert!(aliases(&file).is_empty());
    assert!(trait_impls(&file).is_empty());
    assert!(inherent_methods(&file).is_empty());
}

#[test]
fn test_optional_property_is_rejected() {
    let tokens = expand_service(
        quote!(C),
        quote! {
            struct C { #[inject] dep: Option<Dep> }
        },
        &SynthConfig::default(),
    );
    assert!(has_compile_error(&tokens));
    assert!(tokens.to_string().contains("optional type"));

    let file = parse(tokens);
    assert_eq!(field_names(&file, "C"), vec!["dep", "provider"]);
}

#[test]
fn test_injected_host_generates_no_constructors() {
    let file = parse(expand_injected(
        quote! {
            struct Holder {
                #[inject]
                a: A,
                #[inject]
                b: B,
            }
        },
        &SynthConfig::default(),
    ));
    assert_eq!(inherent_methods(&file), vec!["a", "set_a", "b", "set_b"]);
    assert_eq!(field_names(&file, "Holder"), vec!["__a", "__b"]);
    assert!(trait_impls(&file).is_empty());
}

#[test]
fn test_module_respects_hand_written_members() {
    let tokens = expand_module(
        quote! {
            mod app {
                #[service(Greeter)]
                pub struct Greeter {
                    #[inject]
                    clock: Clock,
                    provider: Option<Arc<dyn sinew::Provider>>,
                }

                pub type GreeterInterface = Greeter;

                impl Greeter {
                    pub fn wired(provider: Option<Arc<dyn sinew::Provider>>) -> Self {
                        todo!()
                    }

                    pub fn new(clock: Clock) -> Self {
                        todo!()
                    }
                }

                impl sinew::Service for Greeter {
                    type Interface = GreeterInterface;

                    fn with_provider(provider: Option<Arc<dyn sinew::Provider>>) -> Self {
                        Self::wired(provider)
                    }
                }
            }
        },
        &SynthConfig::default(),
    );
    assert!(!has_compile_error(&tokens));

    let module: syn::ItemMod = syn::parse2(tokens).unwrap();
    let file = syn::File {
        shebang: None,
        attrs: Vec::new(),
        items: module.content.unwrap().1,
    };

    assert_eq!(aliases(&file), vec!["GreeterInterface"]);
    assert_eq!(trait_impls(&file), vec!["sinew::Service"]);
    assert_eq!(
        inherent_methods(&file),
        vec!["clock", "set_clock", "wired", "new"]
    );
    assert_eq!(field_names(&file, "Greeter"), vec!["__clock", "provider"]);
}

#[test]
fn test_module_sees_injectable_impl() {
    let tokens = expand_module(
        quote! {
            mod app {
                #[injected]
                pub struct Holder {
                    #[inject]
                    dep: Dep,
                    provider: Option<Arc<dyn sinew::Provider>>,
                }

                impl sinew::Injectable for Holder {
                    fn provider(&self) -> Option<&dyn sinew::Provider> {
                        self.provider.as_deref()
                    }
                }
            }
        },
        &SynthConfig::default(),
    );
    let text = tokens.to_string();
    assert!(text.contains("ProviderExt :: require"));
    assert!(!text.contains("injected"));
}

#[test]
fn test_module_rejects_stray_field_annotations() {
    let tokens = expand_module(
        quote! {
            mod app {
                #[inject]
                fn helper() {}

                impl Holder {
                    #[inject]
                    fn method(&self) {}
                }
            }
        },
        &SynthConfig::default(),
    );
    let text = tokens.to_string();
    assert!(has_compile_error(&tokens));
    assert!(text.contains("this function"));
    assert!(text.contains("this method"));
    assert!(!text.contains("# [inject]"));
}

#[test]
fn test_module_requires_inline_content() {
    let tokens = expand_module(quote!(mod app;), &SynthConfig::default());
    assert!(has_compile_error(&tokens));
}

#[test]
fn test_derive_injectable() {
    let tokens = derive_injectable(
        quote! {
            struct Greeter { provider: Option<Arc<dyn sinew::Provider>> }
        },
        &SynthConfig::default(),
    );
    let file = parse(tokens);
    assert_eq!(trait_impls(&file), vec!["::sinew::Injectable"]);

    let tokens = derive_injectable(
        quote! {
            struct Greeter { name: String }
        },
        &SynthConfig::default(),
    );
    assert!(has_compile_error(&tokens));
}

#[test]
fn test_runtime_path_override() {
    let config = SynthConfig::default().with_runtime(syn::parse_quote!(crate::di));
    let tokens = expand_service(
        quote!(C),
        quote! {
            struct C { name: String }
        },
        &config,
    );
    let file = parse(tokens);
    assert_eq!(trait_impls(&file), vec!["crate::di::Service"]);
}

//! Host glue: runs the synthesizers over `syn` items and merges their output.
//!
//! Three hosts share one struct expansion:
//! - `#[service(T)]` on a struct sees only that struct;
//! - `#[injected]` on a struct handles field annotations alone;
//! - `#[wire]` on an inline module sees every item in it, so hand-written
//!   `impl` blocks and aliases next to the struct suppress synthesis.

use crate::config::SynthConfig;
use crate::declaration::{is_sinew_attribute, Declaration};
use crate::diagnostic::{to_compile_errors, Diagnostic, DiagnosticKind};
use crate::inject::{synthesize_accessors, AccessorContext, InjectTarget, InjectedProperty};
use crate::member::{Fragment, SynthesizedMember};
use crate::service::{synthesize_conformance, synthesize_service, ServiceAnnotation, SERVICE_MARKER};
use proc_macro2::{Span, TokenStream};
use quote::{quote, ToTokens};
use sinew_log::debug;
use syn::{
    punctuated::Punctuated, spanned::Spanned, Attribute, DeriveInput, Fields, ImplItem, Item,
    ItemMod, ItemStruct,
};

/// Capability markers the service host asks conformance for.
pub const REQUESTED_CONFORMANCES: &[&str] = &[SERVICE_MARKER];

/// Marker that switches read accessors to provider resolution.
pub const INJECTABLE_MARKER: &str = "Injectable";

const SERVICE_ATTRIBUTE: &str = "service";
const INJECTED_ATTRIBUTE: &str = "injected";

/// Items produced next to an expanded struct.
#[derive(Default)]
struct Expansion {
    items: Vec<Item>,
    diagnostics: Vec<Diagnostic>,
}

/// `#[service(T)]` on a single struct.
pub fn expand_service(attr: TokenStream, item: TokenStream, config: &SynthConfig) -> TokenStream {
    let item: Item = match syn::parse2(item) {
        Ok(item) => item,
        Err(err) => return err.to_compile_error(),
    };
    let annotation = ServiceAnnotation::parse(attr, Span::call_site());

    match item {
        Item::Struct(mut item) => {
            let declaration = Declaration::from_struct(&item, config);
            let expansion = expand_struct(&mut item, &declaration, Some(&annotation), config);
            render(item.into_token_stream(), expansion)
        }
        other => {
            let diagnostic = reject_non_struct(&other, &annotation, config);
            let errors = to_compile_errors([&diagnostic]);
            quote! {
                #other
                #errors
            }
        }
    }
}

/// `#[injected]` on a struct: accessors only, no constructors.
pub fn expand_injected(item: TokenStream, config: &SynthConfig) -> TokenStream {
    let mut item: ItemStruct = match syn::parse2(item) {
        Ok(item) => item,
        Err(err) => {
            return syn::Error::new(
                err.span(),
                "`#[injected]` can only be applied to a struct\nhint: use `#[inject]` on named fields of a struct",
            )
            .to_compile_error();
        }
    };

    let declaration = Declaration::from_struct(&item, config);
    let expansion = expand_struct(&mut item, &declaration, None, config);
    render(item.into_token_stream(), expansion)
}

/// `#[wire]` on an inline module.
pub fn expand_module(item: TokenStream, config: &SynthConfig) -> TokenStream {
    let mut module: ItemMod = match syn::parse2(item) {
        Ok(module) => module,
        Err(err) => return err.to_compile_error(),
    };

    let Some((brace, items)) = module.content.take() else {
        return syn::Error::new(
            module.ident.span(),
            "`#[wire]` requires an inline module\nhint: write the items inside `mod name { .. }`",
        )
        .to_compile_error();
    };

    let mut output = Vec::with_capacity(items.len());
    let mut diagnostics = Vec::new();

    for item in &items {
        let mut item = item.clone();
        let service = attrs_mut(&mut item)
            .and_then(|attrs| take_attribute(attrs, SERVICE_ATTRIBUTE, config))
            .map(|attr| ServiceAnnotation::from_attribute(&attr));

        match item {
            Item::Struct(mut item) => {
                let expansion = match Declaration::collect(&items, &item.ident, config) {
                    Some(declaration) => expand_struct(&mut item, &declaration, service.as_ref(), config),
                    None => Expansion::default(),
                };
                output.push(Item::Struct(item));
                output.extend(expansion.items);
                diagnostics.extend(expansion.diagnostics);
            }
            mut other => {
                if let Some(annotation) = &service {
                    diagnostics.push(reject_non_struct(&other, annotation, config));
                }
                diagnostics.extend(reject_stray_injections(&mut other, config));
                output.push(other);
            }
        }
    }

    debug!(
        "#[wire] mod {}: {} item(s) in, {} out",
        module.ident,
        items.len(),
        output.len()
    );

    module.content = Some((brace, output));
    let errors = to_compile_errors(&diagnostics);
    quote! {
        #module
        #errors
    }
}

/// `#[derive(Injectable)]`: reads the stored `provider` field.
pub fn derive_injectable(input: TokenStream, config: &SynthConfig) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let has_provider = match &input.data {
        syn::Data::Struct(data) => data
            .fields
            .iter()
            .any(|field| field.ident.as_ref().is_some_and(|ident| ident == "provider")),
        _ => false,
    };
    if !has_provider {
        return syn::Error::new(
            input.ident.span(),
            "`Injectable` requires a `provider` field\nhint: put `#[service(..)]` above the derive, or declare `provider: Option<Arc<dyn Provider>>`",
        )
        .to_compile_error();
    }

    let runtime = &config.runtime;
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        impl #impl_generics #runtime::Injectable for #ident #ty_generics #where_clause {
            fn provider(&self) -> ::core::option::Option<&dyn #runtime::Provider> {
                self.provider.as_deref()
            }
        }
    }
}

/// Expand field annotations and, when given, the service annotation of one struct.
///
/// `declaration` is the view taken before any rewriting.
fn expand_struct(
    item: &mut ItemStruct,
    declaration: &Declaration,
    service: Option<&ServiceAnnotation>,
    config: &SynthConfig,
) -> Expansion {
    let _scope = sinew_log::scope(&item.ident);
    let mut expansion = Expansion::default();
    let mut methods = Vec::new();
    let mut accessors = Vec::new();
    let context = AccessorContext {
        injectable: declaration.conforms_to(INJECTABLE_MARKER, config),
    };

    item.attrs.retain(|attr| {
        !is_sinew_attribute(attr, SERVICE_ATTRIBUTE, config)
            && !is_sinew_attribute(attr, INJECTED_ATTRIBUTE, config)
    });

    match &mut item.fields {
        Fields::Named(fields) => {
            let mut rebuilt = Punctuated::new();
            for mut field in std::mem::take(&mut fields.named) {
                if take_attribute(&mut field.attrs, "inject", config).is_none() {
                    rebuilt.push(field);
                    continue;
                }

                let target = match InjectedProperty::from_field(&field) {
                    Some(property) => InjectTarget::Field(property),
                    None => not_a_field(field.span(), "field"),
                };
                match synthesize_accessors(&target, &context, config) {
                    Ok(members) => {
                        for member in members {
                            match member.fragment {
                                Fragment::Field(mut backing) => {
                                    backing.attrs = field
                                        .attrs
                                        .iter()
                                        .filter(|attr| !attr.path().is_ident("doc"))
                                        .cloned()
                                        .collect();
                                    rebuilt.push(backing);
                                }
                                Fragment::Methods(fns) => accessors.extend(fns),
                                Fragment::Item(other) => expansion.items.push(other),
                            }
                        }
                    }
                    Err(diagnostic) => {
                        expansion.diagnostics.push(diagnostic);
                        rebuilt.push(field);
                    }
                }
            }
            fields.named = rebuilt;
        }
        Fields::Unnamed(fields) => {
            for field in fields.unnamed.iter_mut() {
                if let Some(attr) = take_attribute(&mut field.attrs, "inject", config) {
                    let target = not_a_field(attr.span(), "tuple struct field");
                    if let Err(diagnostic) = synthesize_accessors(&target, &context, config) {
                        expansion.diagnostics.push(diagnostic);
                    }
                }
            }
        }
        Fields::Unit => {}
    }

    if let Some(annotation) = service {
        match synthesize_service(annotation, declaration, config) {
            Ok(members) => {
                for member in members {
                    place(member, item, &mut methods, &mut expansion.items);
                }
                // without an interface there is no alias to conform with
                if annotation.interface().is_some() {
                    if let Some(member) =
                        synthesize_conformance(declaration, REQUESTED_CONFORMANCES, config)
                    {
                        place(member, item, &mut methods, &mut expansion.items);
                    }
                }
            }
            Err(diagnostic) => expansion.diagnostics.push(diagnostic),
        }
    }

    // constructors first, then accessors in field order
    methods.extend(accessors);
    if !methods.is_empty() {
        let ident = &item.ident;
        let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
        expansion.items.push(syn::parse_quote! {
            impl #impl_generics #ident #ty_generics #where_clause {
                #(#methods)*
            }
        });
    }

    debug!(
        "{} item(s) added, {} diagnostic(s)",
        expansion.items.len(),
        expansion.diagnostics.len()
    );
    expansion
}

fn place(
    member: SynthesizedMember,
    item: &mut ItemStruct,
    methods: &mut Vec<syn::ImplItemFn>,
    items: &mut Vec<Item>,
) {
    match member.fragment {
        Fragment::Field(field) => {
            if let Fields::Named(fields) = &mut item.fields {
                fields.named.push(field);
            }
        }
        Fragment::Methods(fns) => methods.extend(fns),
        Fragment::Item(other) => items.push(other),
    }
}

fn render(item: TokenStream, expansion: Expansion) -> TokenStream {
    let items = &expansion.items;
    let errors = to_compile_errors(&expansion.diagnostics);
    quote! {
        #item
        #(#items)*
        #errors
    }
}

/// Run a service annotation found on something other than a struct.
fn reject_non_struct(item: &Item, annotation: &ServiceAnnotation, config: &SynthConfig) -> Diagnostic {
    let result = match Declaration::from_item(item, config) {
        Some(declaration) => synthesize_service(annotation, &declaration, config),
        None => Err(unmodelled_item(item)),
    };
    match result {
        Err(diagnostic) => diagnostic,
        Ok(_) => unmodelled_item(item),
    }
}

/// Items with no declaration view: functions, impls, modules, imports.
fn unmodelled_item(item: &Item) -> Diagnostic {
    let name = item_ident(item)
        .map(ToString::to_string)
        .unwrap_or_else(|| "Name".to_string());
    Diagnostic::new(DiagnosticKind::NotAReferenceType, item.span()).with_fix_it(format!(
        "`#[service]` is on this {}; declare it as `struct {} {{ .. }}`",
        describe(item),
        name
    ))
}

fn item_ident(item: &Item) -> Option<&syn::Ident> {
    match item {
        Item::Const(item) => Some(&item.ident),
        Item::Fn(item) => Some(&item.sig.ident),
        Item::Mod(item) => Some(&item.ident),
        Item::Static(item) => Some(&item.ident),
        Item::Trait(item) => Some(&item.ident),
        Item::Type(item) => Some(&item.ident),
        Item::Impl(block) => match &*block.self_ty {
            syn::Type::Path(path) => path.path.segments.last().map(|segment| &segment.ident),
            _ => None,
        },
        _ => None,
    }
}

/// Field annotations on items that cannot hold state.
fn reject_stray_injections(item: &mut Item, config: &SynthConfig) -> Vec<Diagnostic> {
    let context = AccessorContext::default();
    let mut targets = Vec::new();

    if let Some(attr) = attrs_mut(item).and_then(|attrs| take_attribute(attrs, "inject", config)) {
        targets.push(not_a_field(attr.span(), describe(item)));
    }
    if let Item::Impl(block) = item {
        for impl_item in &mut block.items {
            let (attrs, what) = match impl_item {
                ImplItem::Fn(method) => (&mut method.attrs, "method"),
                ImplItem::Const(constant) => (&mut constant.attrs, "associated constant"),
                ImplItem::Type(alias) => (&mut alias.attrs, "associated type"),
                _ => continue,
            };
            if let Some(attr) = take_attribute(attrs, "inject", config) {
                targets.push(not_a_field(attr.span(), what));
            }
        }
    }

    targets
        .iter()
        .filter_map(|target| synthesize_accessors(target, &context, config).err())
        .collect()
}

fn not_a_field(span: Span, description: &str) -> InjectTarget {
    InjectTarget::NotAField {
        span,
        description: description.to_string(),
    }
}

/// Remove every `name` attribute, returning the first one.
fn take_attribute(attrs: &mut Vec<Attribute>, name: &str, config: &SynthConfig) -> Option<Attribute> {
    let mut found = None;
    attrs.retain(|attr| {
        if is_sinew_attribute(attr, name, config) {
            found.get_or_insert_with(|| attr.clone());
            false
        } else {
            true
        }
    });
    found
}

fn attrs_mut(item: &mut Item) -> Option<&mut Vec<Attribute>> {
    match item {
        Item::Const(item) => Some(&mut item.attrs),
        Item::Enum(item) => Some(&mut item.attrs),
        Item::Fn(item) => Some(&mut item.attrs),
        Item::Impl(item) => Some(&mut item.attrs),
        Item::Mod(item) => Some(&mut item.attrs),
        Item::Static(item) => Some(&mut item.attrs),
        Item::Struct(item) => Some(&mut item.attrs),
        Item::Trait(item) => Some(&mut item.attrs),
        Item::Type(item) => Some(&mut item.attrs),
        Item::Union(item) => Some(&mut item.attrs),
        Item::Use(item) => Some(&mut item.attrs),
        _ => None,
    }
}

fn describe(item: &Item) -> &'static str {
    match item {
        Item::Const(_) => "constant",
        Item::Enum(_) => "enum",
        Item::Fn(_) => "function",
        Item::Impl(_) => "impl block",
        Item::Mod(_) => "module",
        Item::Static(_) => "static",
        Item::Trait(_) => "trait",
        Item::Type(_) => "type alias",
        Item::Union(_) => "union",
        Item::Use(_) => "use declaration",
        _ => "item",
    }
}

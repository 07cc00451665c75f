//! Host-neutral view of an annotated declaration.
//!
//! The synthesizers never look at `syn` items directly. The adapters in this
//! module flatten a struct, the `impl` blocks that belong to it and its
//! module-level alias into one ordered member list, rebuilt from the current
//! tree on every call.

use crate::config::{normalize_path_text, SynthConfig};
use proc_macro2::Span;
use quote::ToTokens;
use syn::{
    punctuated::Punctuated, Attribute, Fields, FnArg, Generics, Ident,
    ImplItem, Item, ItemImpl, ItemStruct, ItemType, Pat, Path, ReturnType, Token, Type,
    Visibility,
};

/// Shape of the annotated item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    NamedStruct,
    TupleStruct,
    UnitStruct,
    Enum,
    Union,
    Trait,
    Other,
}

impl DeclarationKind {
    /// Only a struct with named fields can hold the generated state.
    pub fn is_reference_type(&self) -> bool {
        matches!(self, DeclarationKind::NamedStruct)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            DeclarationKind::NamedStruct => "a struct",
            DeclarationKind::TupleStruct => "a tuple struct",
            DeclarationKind::UnitStruct => "a unit struct",
            DeclarationKind::Enum => "an enum",
            DeclarationKind::Union => "a union",
            DeclarationKind::Trait => "a trait",
            DeclarationKind::Other => "not a struct",
        }
    }
}

/// A stored property.
#[derive(Debug, Clone)]
pub struct FieldMember {
    pub ident: Ident,
    pub ty: Type,
    pub vis: Visibility,
    /// Carries a field annotation (`#[inject]`)
    pub injected: bool,
}

/// One constructor parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// An associated function without receiver that returns the declaration.
#[derive(Debug, Clone)]
pub struct ConstructorMember {
    pub ident: Ident,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(FieldMember),
    /// Type alias, named relative to the declaration (`"Interface"` for `FooInterface`)
    Alias { name: String, ty: Type },
    Constructor(ConstructorMember),
    Other,
}

/// An annotated declaration and everything the engine may compare against.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub ident: Ident,
    pub kind: DeclarationKind,
    pub vis: Visibility,
    pub generics: Generics,
    pub span: Span,
    pub members: Vec<Member>,
    /// Capability markers already declared: derives and implemented traits
    pub conformances: Vec<Path>,
}

impl Declaration {
    /// Build the view of a struct on its own, without any `impl` blocks.
    pub fn from_struct(item: &ItemStruct, config: &SynthConfig) -> Self {
        let kind = match &item.fields {
            Fields::Named(_) => DeclarationKind::NamedStruct,
            Fields::Unnamed(_) => DeclarationKind::TupleStruct,
            Fields::Unit => DeclarationKind::UnitStruct,
        };

        let members = match &item.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .filter_map(|field| {
                    field.ident.clone().map(|ident| {
                        Member::Field(FieldMember {
                            ident,
                            ty: field.ty.clone(),
                            vis: field.vis.clone(),
                            injected: field.attrs.iter().any(|a| is_inject_attribute(a, config)),
                        })
                    })
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            ident: item.ident.clone(),
            kind,
            vis: item.vis.clone(),
            generics: item.generics.clone(),
            span: item.ident.span(),
            members,
            conformances: derived_paths(&item.attrs),
        }
    }

    /// Build the view of any item. Non-struct items have no members.
    pub fn from_item(item: &Item, config: &SynthConfig) -> Option<Self> {
        let (ident, kind, vis, generics, attrs) = match item {
            Item::Struct(item) => return Some(Self::from_struct(item, config)),
            Item::Enum(item) => (&item.ident, DeclarationKind::Enum, &item.vis, &item.generics, &item.attrs),
            Item::Union(item) => (&item.ident, DeclarationKind::Union, &item.vis, &item.generics, &item.attrs),
            Item::Trait(item) => (&item.ident, DeclarationKind::Trait, &item.vis, &item.generics, &item.attrs),
            Item::Type(item) => (&item.ident, DeclarationKind::Other, &item.vis, &item.generics, &item.attrs),
            _ => return None,
        };

        Some(Self {
            ident: ident.clone(),
            kind,
            vis: vis.clone(),
            generics: generics.clone(),
            span: ident.span(),
            members: Vec::new(),
            conformances: derived_paths(attrs),
        })
    }

    /// Build the view of the struct named `ident` from a module's items,
    /// folding in its `impl` blocks and its interface alias.
    pub fn collect(items: &[Item], ident: &Ident, config: &SynthConfig) -> Option<Self> {
        let mut declaration = items.iter().find_map(|item| match item {
            Item::Struct(item) if item.ident == *ident => Some(Self::from_struct(item, config)),
            _ => None,
        })?;

        for item in items {
            match item {
                Item::Impl(item) => declaration.absorb_impl(item),
                Item::Type(item) => declaration.absorb_alias(item, config),
                _ => {}
            }
        }

        Some(declaration)
    }

    /// Fold the members of an `impl` block for this declaration.
    pub fn absorb_impl(&mut self, item: &ItemImpl) {
        if !self.is_self_type(&item.self_ty) {
            return;
        }

        // trait methods are never constructors, `From::from` included
        let inherent = match &item.trait_ {
            Some((_, path, _)) => {
                self.conformances.push(path.clone());
                false
            }
            None => true,
        };

        for impl_item in &item.items {
            let member = match impl_item {
                ImplItem::Fn(method) if inherent => self
                    .constructor_of(&method.sig)
                    .map(Member::Constructor)
                    .unwrap_or(Member::Other),
                _ => Member::Other,
            };
            self.members.push(member);
        }
    }

    /// Fold a module-level alias named `<Name><suffix>`.
    pub fn absorb_alias(&mut self, item: &ItemType, config: &SynthConfig) {
        let expected = format!("{}{}", self.ident, config.alias_suffix);
        if item.ident == expected {
            self.members.push(Member::Alias {
                name: config.alias_suffix.clone(),
                ty: (*item.ty).clone(),
            });
        }
    }

    fn is_self_type(&self, ty: &Type) -> bool {
        match ty {
            Type::Path(path) if path.qself.is_none() => path
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == self.ident),
            _ => false,
        }
    }

    fn constructor_of(&self, sig: &syn::Signature) -> Option<ConstructorMember> {
        if sig.inputs.iter().any(|arg| matches!(arg, FnArg::Receiver(_))) {
            return None;
        }

        let returns_self = match &sig.output {
            ReturnType::Type(_, ty) => match ty.as_ref() {
                Type::Path(path) if path.qself.is_none() => {
                    path.path.is_ident("Self") || self.is_self_type(ty)
                }
                _ => false,
            },
            ReturnType::Default => false,
        };
        if !returns_self {
            return None;
        }

        let params = sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(typed) => Some(Param {
                    name: pattern_name(&typed.pat),
                    ty: (*typed.ty).clone(),
                }),
                FnArg::Receiver(_) => None,
            })
            .collect();

        Some(ConstructorMember {
            ident: sig.ident.clone(),
            params,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldMember> {
        self.members.iter().filter_map(|member| match member {
            Member::Field(field) => Some(field),
            _ => None,
        })
    }

    /// Fields carrying a field annotation, in source order.
    pub fn injected_fields(&self) -> impl Iterator<Item = &FieldMember> {
        self.fields().filter(|field| field.injected)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &ConstructorMember> {
        self.members.iter().filter_map(|member| match member {
            Member::Constructor(constructor) => Some(constructor),
            _ => None,
        })
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.members.iter().filter_map(|member| match member {
            Member::Alias { name, ty } => Some((name.as_str(), ty)),
            _ => None,
        })
    }

    /// Whether `marker` is declared, under its short or fully qualified spelling.
    pub fn conforms_to(&self, marker: &str, config: &SynthConfig) -> bool {
        let spellings = config.marker_spellings(marker);
        self.conformances.iter().any(|path| {
            let text = normalize_path_text(&path.to_token_stream().to_string());
            spellings.iter().any(|spelling| *spelling == text)
        })
    }
}

fn pattern_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(ident) => ident.ident.to_string(),
        Pat::Type(typed) => pattern_name(&typed.pat),
        other => other.to_token_stream().to_string(),
    }
}

/// Paths listed in `#[derive(..)]` attributes.
fn derived_paths(attrs: &[Attribute]) -> Vec<Path> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .collect()
}

/// Whether `attr` is named `name`, either bare or under the run-time path.
pub fn is_sinew_attribute(attr: &Attribute, name: &str, config: &SynthConfig) -> bool {
    let text = normalize_path_text(&attr.path().to_token_stream().to_string());
    config
        .marker_spellings(name)
        .iter()
        .any(|spelling| *spelling == text)
}

pub fn is_inject_attribute(attr: &Attribute, config: &SynthConfig) -> bool {
    is_sinew_attribute(attr, "inject", config)
}

//! Expansion engine for the sinew dependency-injection attributes.
//!
//! The engine turns an annotated struct into the members a provider-based
//! service needs:
//!
//! - [`service::synthesize_service`] adds the interface alias, provider field,
//!   provider constructor and aggregating constructor;
//! - [`service::synthesize_conformance`] adds the `Service` impl on request;
//! - [`inject::synthesize_accessors`] turns an `#[inject]` field into a
//!   backing cell and a lazily resolving accessor pair.
//!
//! Every synthesizer compares against the members already present
//! ([`matcher`]) and only adds what is missing, so expanding an already
//! expanded declaration adds nothing. [`expand`] is the glue used by the
//! `sinew-macro` proc-macro crate.

pub mod config;
pub mod declaration;
pub mod diagnostic;
pub mod expand;
pub mod extract;
pub mod inject;
pub mod matcher;
pub mod member;
pub mod service;

pub use config::SynthConfig;
pub use declaration::{Declaration, DeclarationKind};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use expand::{derive_injectable, expand_injected, expand_module, expand_service};
pub use extract::{extract, TypeReference};
pub use inject::{synthesize_accessors, AccessorContext, InjectTarget, InjectedProperty};
pub use member::{MemberKind, SynthesizedMember};
pub use service::{synthesize_conformance, synthesize_service, ServiceAnnotation};

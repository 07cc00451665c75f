// Capability markers implemented by sinew-generated code

use crate::provider::Provider;
use std::sync::Arc;

/// A type that exposes an interface and can be built around a provider.
///
/// `#[service(..)]` emits this conformance, delegating to the generated
/// `<Name>Interface` alias and `with_provider` constructor.
pub trait Service: Sized {
    /// The public-facing type consumers should depend on.
    type Interface: ?Sized;

    /// Build an instance wired to `provider`, with every injected property unset.
    fn with_provider(provider: Option<Arc<dyn Provider>>) -> Self;
}

/// A type whose `#[inject]` properties resolve lazily through its provider.
///
/// Only declarations carrying this marker get resolving read accessors;
/// without it an unset property is a fatal error on first read.
pub trait Injectable {
    fn provider(&self) -> Option<&dyn Provider>;
}

// sinew - provider-backed dependency injection through attribute macros
//
// `#[service(T)]` turns a struct into a service exposing `T`, `#[inject]`
// marks the fields resolved lazily through the service's provider, and
// `#[wire]` expands a whole module at once.

// Re-export run-time interfaces
pub use sinew_core::*;

#[doc(hidden)]
pub use sinew_core::__private;

// Re-export procedural macros
pub use sinew_macro::{Injectable, injected, service, wire};

// Logging controls shared with the macros
pub use sinew_log as log;

/// Everything needed to declare and wire services.
pub mod prelude {
    pub use crate::{
        Injectable, Provider, ProviderExt, Service, TypeRequest, injected, service, wire,
    };
}

// Error types for sinew run-time support

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The provider was asked for a dependency through the required form and had none.
    #[error("Required resolution miss: no provider entry for `{type_name}`")]
    RequiredResolutionMiss { type_name: &'static str },

    /// A lazily injected property was read before it was set or resolved.
    #[error("Unresolved dependency: property `{property}` of type `{type_name}` was never set and could not be resolved")]
    UnresolvedDependency {
        property: &'static str,
        type_name: &'static str,
    },

    /// A provider answered a request with a value of a different type.
    #[error("Type mismatch: requested `{expected}`, provider returned another type")]
    TypeMismatch { expected: &'static str },
}

impl Error {
    /// Whether this error is one of the fail-fast conditions that terminate the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::RequiredResolutionMiss { .. } | Error::UnresolvedDependency { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

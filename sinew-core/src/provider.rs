// Provider capability consumed by generated constructors and accessors

use crate::error::{Error, Result};
use sinew_log::{debug, error, trace, warn};
use std::any::{Any, TypeId};

/// A request for one dependency, keyed by the requested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRequest {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeRequest {
    /// Build the request for `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check whether this request asks for `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

/// The run-time resolution capability held by generated `provider` fields.
///
/// Implementations answer a [`TypeRequest`] with a boxed value of exactly the
/// requested type, or `None` when they have nothing registered for it. The
/// typed operations live on [`ProviderExt`] so that `dyn Provider` stays
/// object safe.
pub trait Provider: Send + Sync {
    fn resolve_any(&self, request: TypeRequest) -> Option<Box<dyn Any>>;
}

impl<F> Provider for F
where
    F: Fn(TypeRequest) -> Option<Box<dyn Any>> + Send + Sync,
{
    fn resolve_any(&self, request: TypeRequest) -> Option<Box<dyn Any>> {
        self(request)
    }
}

/// Typed resolution on top of [`Provider`].
///
/// Generated accessors only ever call [`ProviderExt::require`]; the optional
/// form is there for hand-written code.
pub trait ProviderExt: Provider {
    /// Resolve `T`, reporting a provider that answered with the wrong type.
    fn try_resolve<T: Any>(&self) -> Result<Option<T>> {
        let request = TypeRequest::of::<T>();
        trace!("Attempting to resolve {}", request.type_name());

        match self.resolve_any(request) {
            None => {
                debug!("No provider entry for {}", request.type_name());
                Ok(None)
            }
            Some(value) => value.downcast::<T>().map(|boxed| Some(*boxed)).map_err(|_| {
                Error::TypeMismatch {
                    expected: request.type_name(),
                }
            }),
        }
    }

    /// Resolve `T`, returning `None` when nothing usable is registered.
    fn resolve<T: Any>(&self) -> Option<T> {
        match self.try_resolve::<T>() {
            Ok(value) => value,
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }

    /// Resolve `T` or terminate.
    ///
    /// # Panics
    ///
    /// Panics with [`Error::RequiredResolutionMiss`] when the provider has no
    /// usable entry for `T`. There is no recoverable path.
    #[track_caller]
    fn require<T: Any>(&self) -> T {
        match self.resolve::<T>() {
            Some(value) => value,
            None => {
                let err = Error::RequiredResolutionMiss {
                    type_name: std::any::type_name::<T>(),
                };
                error!("{}", err);
                panic!("{}", err)
            }
        }
    }
}

impl<P: Provider + ?Sized> ProviderExt for P {}

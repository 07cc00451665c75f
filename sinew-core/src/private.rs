//! Support items referenced by generated code. Not public API.

use crate::error::Error;
use sinew_log::error;

pub use std::sync::OnceLock;

/// Fail-fast path of a generated read accessor.
#[cold]
#[track_caller]
pub fn unresolved(property: &'static str, type_name: &'static str) -> ! {
    let err = Error::UnresolvedDependency {
        property,
        type_name,
    };
    error!("{}", err);
    panic!("{}", err)
}

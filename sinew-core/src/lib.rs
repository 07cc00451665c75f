// Run-time support for the sinew dependency-injection macros
// Generated constructors and accessors are written against these interfaces;
// no resolution container lives here.

pub mod error;
pub mod provider;
pub mod traits;

#[doc(hidden)]
#[path = "private.rs"]
pub mod __private;

pub use error::*;
pub use provider::*;
pub use traits::*;

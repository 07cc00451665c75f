// Procedural macros for sinew dependency injection
// The expansion logic lives in sinew-synth; this crate only bridges the
// compiler's token streams into it.

use proc_macro::TokenStream;
use sinew_synth::{expand, SynthConfig};

fn config() -> SynthConfig {
    sinew_log::init();
    SynthConfig::from_env()
}

/// Turns a struct into a provider-backed service exposing `T` as its interface.
///
/// ```ignore
/// #[service(dyn Greet)]
/// #[derive(Injectable)]
/// pub struct Greeter {
///     #[inject]
///     clock: Arc<dyn Clock>,
/// }
/// ```
///
/// Adds `GreeterInterface`, a `provider` field, `with_provider`, `new` for the
/// `#[inject]` fields, an accessor pair per `#[inject]` field and an
/// `impl Service`. Members that already exist are left alone.
#[proc_macro_attribute]
pub fn service(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::expand_service(attr.into(), item.into(), &config()).into()
}

/// Generates accessor pairs for the `#[inject]` fields of a struct, without
/// any constructor.
#[proc_macro_attribute]
pub fn injected(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = proc_macro2::TokenStream::from(attr);
        return syn::Error::new_spanned(attr, "`#[injected]` takes no arguments")
            .to_compile_error()
            .into();
    }
    expand::expand_injected(item.into(), &config()).into()
}

/// Expands every `#[service]` and `#[inject]` inside an inline module, taking
/// the hand-written `impl` blocks and aliases of the module into account.
#[proc_macro_attribute]
pub fn wire(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = proc_macro2::TokenStream::from(attr);
        return syn::Error::new_spanned(attr, "`#[wire]` takes no arguments")
            .to_compile_error()
            .into();
    }
    expand::expand_module(item.into(), &config()).into()
}

/// Implements `Injectable` by reading the struct's `provider` field.
#[proc_macro_derive(Injectable)]
pub fn injectable_derive(input: TokenStream) -> TokenStream {
    expand::derive_injectable(input.into(), &config()).into()
}

//! Expansion settings.
//!
//! Everything the generated code names by convention lives here so the
//! synthesizers never hard-code a path or identifier.

use proc_macro2::Span;
use std::env;
use syn::{Ident, Path};

/// Default path of the run-time support crate as seen from user code.
pub const DEFAULT_RUNTIME_PATH: &str = "::sinew";

/// Settings shared by every synthesizer.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Path to the run-time crate (`::sinew` unless re-exported elsewhere)
    pub runtime: Path,
    /// Name of the provider-taking constructor
    pub provider_constructor: String,
    /// Name of the aggregating constructor
    pub aggregating_constructor: String,
    /// Prefix of backing field names
    pub backing_prefix: String,
    /// Prefix of write accessor names
    pub setter_prefix: String,
    /// Suffix appended to the declaration name for the interface alias
    pub alias_suffix: String,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            runtime: syn::parse_quote!(::sinew),
            provider_constructor: "with_provider".to_string(),
            aggregating_constructor: "new".to_string(),
            backing_prefix: "__".to_string(),
            setter_prefix: "set_".to_string(),
            alias_suffix: "Interface".to_string(),
        }
    }
}

impl SynthConfig {
    /// Create config from environment variables.
    ///
    /// `SINEW_RUNTIME_PATH` overrides the run-time crate path for crates that
    /// re-export sinew under another name. An unparseable value is ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var("SINEW_RUNTIME_PATH") {
            match syn::parse_str::<Path>(&raw) {
                Ok(path) => config.runtime = path,
                Err(_) => {
                    sinew_log::warn!("ignoring SINEW_RUNTIME_PATH={:?}: not a path", raw);
                }
            }
        }

        config
    }

    /// Use a different run-time crate path.
    pub fn with_runtime(mut self, runtime: Path) -> Self {
        self.runtime = runtime;
        self
    }

    /// The run-time path rendered without a leading `::` and without spaces,
    /// e.g. `sinew` or `my_app::di`.
    pub fn runtime_name(&self) -> String {
        let runtime = &self.runtime;
        normalize_path_text(&quote::quote!(#runtime).to_string())
    }

    /// Both accepted spellings of a capability marker: the short name and the
    /// name qualified by the run-time crate path.
    pub fn marker_spellings(&self, marker: &str) -> [String; 2] {
        [marker.to_string(), format!("{}::{}", self.runtime_name(), marker)]
    }

    pub(crate) fn ident(&self, name: &str) -> Ident {
        Ident::new(name, Span::call_site())
    }
}

/// Strip whitespace and a leading `::` from a rendered path.
pub(crate) fn normalize_path_text(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact.trim_start_matches("::").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_runtime_name() {
        let config = SynthConfig::default();
        assert_eq!(config.runtime_name(), "sinew");
        assert_eq!(
            config.runtime_name(),
            normalize_path_text(DEFAULT_RUNTIME_PATH)
        );
    }

    #[test]
    fn test_marker_spellings_follow_runtime_path() {
        let config = SynthConfig::default().with_runtime(syn::parse_quote!(crate::di));
        assert_eq!(
            config.marker_spellings("Service"),
            ["Service".to_string(), "crate::di::Service".to_string()]
        );
    }

    #[test]
    fn test_normalize_path_text() {
        assert_eq!(normalize_path_text(":: sinew :: Injectable"), "sinew::Injectable");
        assert_eq!(normalize_path_text("Injectable"), "Injectable");
    }
}

//! Wrapper and instrumentation configuration.
//!
//! Defaults reproduce the fixed behaviour: instrument `fibonacci` in
//! `app/src/main.rs` with a `trace_fibonacci` marker on `cargo build`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// What to instrument and how the synthesized code refers to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct InstrumentConfig {
    /// File rewritten in place, relative to the working directory
    pub target_file: PathBuf,
    /// Top-level function that receives the timing guard
    pub target_function: String,
    /// Name of the synthesized function; its presence marks the file as done
    pub marker: String,
    /// Path imported for the clock, e.g. `std::time::Instant`
    pub timing_dependency: String,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            target_file: PathBuf::from("app/src/main.rs"),
            target_function: "fibonacci".to_string(),
            marker: "trace_fibonacci".to_string(),
            timing_dependency: "std::time::Instant".to_string(),
        }
    }
}

impl InstrumentConfig {
    /// Check that every name can be spliced into Rust source.
    pub fn validate(&self) -> Result<()> {
        syn::parse_str::<syn::Ident>(&self.target_function)
            .with_context(|| format!("target-function `{}` is not an identifier", self.target_function))?;
        syn::parse_str::<syn::Ident>(&self.marker)
            .with_context(|| format!("marker `{}` is not an identifier", self.marker))?;
        if self.marker == self.target_function {
            bail!("marker and target-function must differ (both `{}`)", self.marker);
        }
        self.timing_path()?;
        Ok(())
    }

    /// The timing dependency as a parsed path.
    pub fn timing_path(&self) -> Result<syn::Path> {
        let path = syn::parse_str::<syn::Path>(&self.timing_dependency).with_context(|| {
            format!("timing-dependency `{}` is not a path", self.timing_dependency)
        })?;
        if path.segments.is_empty() {
            bail!("timing-dependency must name at least one segment");
        }
        Ok(path)
    }
}

/// Top-level wrapper settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct WrapperConfig {
    /// First CLI argument that triggers instrumentation
    pub trigger: String,
    /// Program every argument is forwarded to
    pub toolchain: String,
    /// Exit with the child's own status code instead of collapsing to 0/1
    pub propagate_exit_status: bool,
    pub instrument: InstrumentConfig,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            trigger: "build".to_string(),
            toolchain: "cargo".to_string(),
            propagate_exit_status: false,
            instrument: InstrumentConfig::default(),
        }
    }
}

impl WrapperConfig {
    pub const FILE_NAME: &'static str = "tracewrap.toml";

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WrapperConfig = toml::from_str(content).context("Invalid tracewrap.toml")?;
        config.instrument.validate()?;
        if config.toolchain.trim().is_empty() {
            bail!("toolchain must not be empty");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_target() {
        let config = WrapperConfig::default();
        assert_eq!(config.trigger, "build");
        assert_eq!(config.toolchain, "cargo");
        assert!(!config.propagate_exit_status);
        assert_eq!(config.instrument.target_file, PathBuf::from("app/src/main.rs"));
        assert_eq!(config.instrument.marker, "trace_fibonacci");
        assert!(config.instrument.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = WrapperConfig::from_toml_str(
            r#"
toolchain = "echo"

[instrument]
target-function = "ackermann"
marker = "trace_ackermann"
"#,
        )
        .unwrap();
        assert_eq!(config.toolchain, "echo");
        assert_eq!(config.trigger, "build");
        assert_eq!(config.instrument.target_function, "ackermann");
        assert_eq!(config.instrument.timing_dependency, "std::time::Instant");
    }

    #[test]
    fn rejects_bad_identifiers() {
        let err = WrapperConfig::from_toml_str("[instrument]\nmarker = \"not an ident\"\n").unwrap_err();
        assert!(format!("{:#}", err).contains("marker"));

        let same = InstrumentConfig {
            marker: "fibonacci".into(),
            ..InstrumentConfig::default()
        };
        assert!(same.validate().is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(WrapperConfig::from_toml_str("trigger = \"build\"\nverbose = true\n").is_err());
    }

    #[test]
    fn timing_path_leaf() {
        let path = InstrumentConfig::default().timing_path().unwrap();
        assert_eq!(path.segments.last().unwrap().ident, "Instant");
    }
}

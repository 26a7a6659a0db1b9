use crate::domain::config::WrapperConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load `tracewrap.toml` from `dir`; a missing file means defaults.
pub fn load_config(dir: &Path) -> Result<WrapperConfig> {
    let path = dir.join(WrapperConfig::FILE_NAME);
    if !path.exists() {
        return Ok(WrapperConfig::default());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    WrapperConfig::from_toml_str(&content).with_context(|| format!("In {}", path.display()))
}

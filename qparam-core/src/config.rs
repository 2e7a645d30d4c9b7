//! Decoder configuration
//!
//! Values are resolved in the following order (highest priority wins):
//!
//! 1. **Code** (builder methods on [`DecodeConfig`])
//! 2. **Environment Variables** (`QP_SEPARATOR`, `QP_REPAIR_OFFSETS`)
//! 3. **Config File** (TOML)
//! 4. **Defaults**
//!
//! # Example
//!
//! ```no_run
//! use qparam_core::DecodeConfig;
//!
//! let config = DecodeConfig::load_from("qparam.toml")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Separator used to split one raw value into sequence elements
pub const DEFAULT_SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Splits `tags=a,b` into `["a", "b"]` for sequence fields
    pub separator: char,
    /// Rewrite `2025-07-04T17:12:32 07:00` to `+07:00` before parsing timestamps
    pub repair_offsets: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self { separator: DEFAULT_SEPARATOR, repair_offsets: true }
    }
}

impl DecodeConfig {
    /// Load configuration with full supersedence chain
    ///
    /// A missing file is not an error: defaults plus environment are used.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    /// Apply environment variables to configuration
    pub fn apply_env_vars(&mut self) {
        if let Ok(separator) = env::var("QP_SEPARATOR") {
            let mut chars = separator.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                self.separator = c;
            } else {
                log::warn!("ignoring QP_SEPARATOR={:?}: expected a single character", separator);
            }
        }
        if let Ok(repair) = env::var("QP_REPAIR_OFFSETS") {
            match repair.parse() {
                Ok(repair) => self.repair_offsets = repair,
                Err(_) => log::warn!("ignoring QP_REPAIR_OFFSETS={:?}: expected true or false", repair),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.separator.is_whitespace() || matches!(self.separator, '&' | '=' | '%') {
            bail!("invalid separator {:?}: collides with query syntax", self.separator);
        }
        Ok(())
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_repair_offsets(mut self, repair: bool) -> Self {
        self.repair_offsets = repair;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DecodeConfig::default();
        assert_eq!(config.separator, ',');
        assert!(config.repair_offsets);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "separator = \";\"").unwrap();

        let config = DecodeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.separator, ';');
        assert!(config.repair_offsets);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DecodeConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.separator, DecodeConfig::default().separator);
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "separator = [").unwrap();
        assert!(DecodeConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_repair_offsets() {
        let mut config = DecodeConfig::default().with_repair_offsets(false);

        env::set_var("QP_REPAIR_OFFSETS", "maybe");
        config.apply_env_vars();
        assert!(!config.repair_offsets);

        env::set_var("QP_REPAIR_OFFSETS", "true");
        config.apply_env_vars();
        assert!(config.repair_offsets);

        env::remove_var("QP_REPAIR_OFFSETS");
    }

    #[test]
    fn test_validate_rejects_query_syntax() {
        assert!(DecodeConfig::default().with_separator('&').validate().is_err());
        assert!(DecodeConfig::default().with_separator(' ').validate().is_err());
        assert!(DecodeConfig::default().with_separator('|').validate().is_ok());
    }
}

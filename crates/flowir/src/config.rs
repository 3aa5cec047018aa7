//! Builder configuration, loadable from the `[builder]` table of a TOML file.

use serde::Deserialize;
use thiserror::Error;

/// Errors reading builder options
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid builder configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Options fixed when a `FlowBuilder` is created
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderOptions {
    /// Name given to the assembled artifact
    pub name: String,
    /// Allow fragments to reference symbols that are not visible in the
    /// scope they are added to
    pub allow_captures: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            name: "anonymous".to_string(),
            allow_captures: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct OptionsFile {
    #[serde(default)]
    builder: BuilderOptions,
}

impl BuilderOptions {
    /// Create the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the artifact name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enable or disable external captures
    pub fn with_captures(mut self, allow: bool) -> Self {
        self.allow_captures = allow;
        self
    }

    /// Parse options from TOML text. Missing keys keep their defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let file: OptionsFile = toml::from_str(source)?;
        Ok(file.builder)
    }
}

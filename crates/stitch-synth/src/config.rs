//! Synthesis configuration
//!
//! Loaded from TOML; every field has a default.
//!
//! ```toml
//! indent_unit = "    "
//! default_log_level = "debug"
//! logger_field = "_log"
//!
//! [field_naming]
//! camel_case = true
//! prefix = "_"
//!
//! [property]
//! style = "expression"
//! backing_field = true
//!
//! [placement]
//! legacy_nested_class_anchor = false
//!
//! [policies]
//! bounds_checks = ["string_null_or_whitespace", "null_check"]
//! error_blocks = ["catch_rethrow_managed", "catch_wrap_unhandled"]
//! logging = "serilog"
//! ```

use crate::error::ConfigError;
use crate::naming::FieldNaming;
use serde::{Deserialize, Serialize};
use std::path::Path;
use stitch_policy::LogLevel;
use stitch_session::PlacementOptions;

/// Synthesizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// One level of indentation
    pub indent_unit: String,
    /// Level used for entry and exit log lines
    pub default_log_level: LogLevel,
    /// Logger field referenced by generated log calls
    pub logger_field: String,
    /// Stored field name transform
    pub field_naming: FieldNaming,
    /// Property rendering
    pub property: PropertyConfig,
    /// Insertion-point switches
    pub placement: PlacementOptions,
    /// Policy names resolved through a registry
    pub policies: PolicyConfig,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            indent_unit: "    ".to_string(),
            default_log_level: LogLevel::Information,
            logger_field: "_logger".to_string(),
            field_naming: FieldNaming::default(),
            property: PropertyConfig::default(),
            placement: PlacementOptions::default(),
            policies: PolicyConfig::default(),
        }
    }
}

impl SynthConfig {
    /// Parse TOML text
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` if the text is not valid configuration
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` if its content is not valid configuration
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "synthesis configuration loaded");
        Ok(config)
    }
}

/// How property accessors are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStyle {
    /// `get { return _x; }`
    #[default]
    Block,
    /// `=> _x;` (get-only properties only)
    Expression,
}

/// Property rendering settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyConfig {
    /// Accessor style
    pub style: PropertyStyle,
    /// Generate a private backing field instead of an auto-property
    pub backing_field: bool,
}

/// Policy names, in application order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Bounds-check policies; first applicable wins per parameter
    pub bounds_checks: Vec<String>,
    /// Error-block policies
    pub error_blocks: Vec<String>,
    /// Logging formatter, if generated code logs
    pub logging: Option<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            bounds_checks: vec!["null_check".to_string()],
            error_blocks: vec!["catch_rethrow_managed".to_string(), "catch_wrap_unhandled".to_string()],
            logging: Some("extensions_logging".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_text_gives_defaults() {
        assert_eq!(SynthConfig::from_toml_str("").unwrap(), SynthConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = SynthConfig::from_toml_str(
            r#"
logger_field = "_log"

[property]
style = "expression"

[field_naming]
camel_case = false
"#,
        )
        .unwrap();
        assert_eq!(config.logger_field, "_log");
        assert_eq!(config.property.style, PropertyStyle::Expression);
        assert!(!config.property.backing_field);
        assert!(!config.field_naming.camel_case);
        assert_eq!(config.field_naming.prefix, "_");
        assert_eq!(config.indent_unit, "    ");
        assert_eq!(config.policies, PolicyConfig::default());
    }

    #[test]
    fn unknown_style_is_a_parse_error() {
        let err = SynthConfig::from_toml_str("[property]\nstyle = \"arrow\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, FileFormat};
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub parser: ParserConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Maximum BEGIN/END nesting depth. Unset means unconstrained.
    pub max_depth: Option<usize>,
    /// Buffer size used when reading calendar files.
    pub buffer_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    Outline,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    fn builder() -> CoreResult<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("parser.buffer_capacity", 8192)?
            .set_default("output.format", "outline")?
            .set_default("logging.level", "info")?)
    }

    /// ## Summary
    /// Loads configuration from `.env`, environment variables and an optional
    /// `calstream.toml` file into a `Settings`.
    ///
    /// Environment variables use the `CALSTREAM_` prefix and `__` between
    /// sections, e.g. `CALSTREAM_PARSER__MAX_DEPTH=32`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> CoreResult<Self> {
        let settings = Self::builder()?
            // TOML file
            .add_source(config::File::with_name("calstream.toml").required(false))
            // Env vars win over the file
            .add_source(
                config::Environment::with_prefix("CALSTREAM")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;
        settings.validate()
    }

    /// ## Summary
    /// Builds settings from an inline TOML document layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the document is not valid TOML or does not match
    /// the settings schema.
    pub fn from_toml(document: &str) -> CoreResult<Self> {
        let settings = Self::builder()?
            .add_source(config::File::from_str(document, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;
        settings.validate()
    }

    fn validate(self) -> CoreResult<Self> {
        if self.parser.buffer_capacity == 0 {
            return Err(CoreError::InvalidInput(
                "parser.buffer_capacity must be greater than zero".to_string(),
            ));
        }
        if self.parser.max_depth == Some(0) {
            return Err(CoreError::InvalidInput(
                "parser.max_depth must be at least 1 when set".to_string(),
            ));
        }
        Ok(self)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> CoreResult<Settings> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn defaults_apply_without_sources() {
        let settings = Settings::from_toml("").unwrap();
        tracing::debug!(?settings, "Loaded default settings");

        assert_eq!(settings.parser.max_depth, None);
        assert_eq!(settings.parser.buffer_capacity, 8192);
        assert_eq!(settings.output.format, OutputFormat::Outline);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn toml_overrides_defaults() {
        let settings = Settings::from_toml(
            "[parser]\nmax_depth = 16\n\n[output]\nformat = \"json\"\n\n[logging]\nlevel = \"trace\"\n",
        )
        .unwrap();

        assert_eq!(settings.parser.max_depth, Some(16));
        assert_eq!(settings.output.format, OutputFormat::Json);
        assert_eq!(settings.logging.level, "trace");
    }

    #[test]
    fn zero_buffer_capacity_is_rejected() {
        let result = Settings::from_toml("[parser]\nbuffer_capacity = 0\n");
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn zero_max_depth_is_rejected() {
        let result = Settings::from_toml("[parser]\nmax_depth = 0\n");
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn unknown_output_format_is_a_config_error() {
        let result = Settings::from_toml("[output]\nformat = \"yaml\"\n");
        assert!(matches!(result, Err(CoreError::ConfigError(_))));
    }
}

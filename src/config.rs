use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::aggregate::DEFAULT_TOP_N;

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "url_taxonomy.toml";

/// Prefix of environment overrides, e.g. `URL_TAXONOMY_BATCH_SIZE=5000`
pub const ENV_PREFIX: &str = "URL_TAXONOMY";

/// Settings for a classification run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory receiving parsed records and analysis files
    pub output_dir: PathBuf,

    /// Name of the URL column (auto-detected when `None`)
    pub url_column: Option<String>,

    /// Name of the traffic column used for analysis
    pub traffic_column: String,

    /// Rows classified per chunk
    pub batch_size: usize,

    /// Whether to run the traffic analysis
    pub analysis: bool,

    /// Only process the first N rows
    pub sample: Option<usize>,

    /// Rows kept for the "top" analyses
    pub top_n: usize,

    /// Directory for log files
    pub log_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            url_column: None,
            traffic_column: "Traffic".to_string(),
            batch_size: 10_000,
            analysis: true,
            sample: None,
            top_n: DEFAULT_TOP_N,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl RunConfig {
    /// Loads defaults, then `path` (or [`DEFAULT_CONFIG_FILE`] if it exists),
    /// then `URL_TAXONOMY_*` environment variables.
    ///
    /// An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let loaded: RunConfig = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        loaded.validate()?;
        debug!("Loaded configuration: {:?}", loaded);
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be greater than zero");
        }
        if self.top_n == 0 {
            bail!("top_n must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.traffic_column, "Traffic");
        assert_eq!(config.batch_size, 10_000);
        assert_eq!(config.top_n, 20);
        assert!(config.analysis);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_keeps_unset_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "batch_size = 500\ntraffic_column = \"Visits\"\nurl_column = \"Page\"").unwrap();

        let config = RunConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.traffic_column, "Visits");
        assert_eq!(config.url_column.as_deref(), Some("Page"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        assert!(RunConfig::load(Some(Path::new("/definitely/not/here.toml"))).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let config = RunConfig {
            batch_size: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

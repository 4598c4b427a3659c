//! Configuration file handling.
//!
//! Settings come from an optional `rusty-drill.toml`; command-line flags
//! override them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::aggregate::REFERENCE_PERIOD;
use crate::data::loader::ColumnMap;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rusty-drill.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    /// Source column names.
    #[serde(default)]
    pub columns: ColumnMap,

    #[serde(default)]
    pub view: ViewConfig,
}

/// Where the dataset lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Dataset file (`.csv`, `.json`, `.parquet`).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Initial view state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Year used for KPIs, the bar chart and the table.
    #[serde(default = "default_reference_period")]
    pub reference_period: i32,

    /// `"All"` or an entity name.
    #[serde(default = "default_selection")]
    pub selection: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            reference_period: default_reference_period(),
            selection: default_selection(),
        }
    }
}

fn default_reference_period() -> i32 {
    REFERENCE_PERIOD
}

fn default_selection() -> String {
    "All".to_string()
}

impl Config {
    /// Parse a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load `path` if given, else `rusty-drill.toml` if present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::debug!("Using {DEFAULT_CONFIG_FILE}");
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// The default configuration rendered as TOML, for `--init-config`.
    pub fn default_toml() -> String {
        r#"# rusty-drill configuration

[data]
# Dataset file: .csv, .json or .parquet
# path = "gapminder.csv"

[columns]
entity = "country"
group = "continent"
period = "year"
life_expectancy = "lifeExp"
population = "pop"
gdp_per_capita = "gdpPercap"
geo_code = "iso_alpha"
latitude = "lat"
longitude = "lon"

[view]
reference_period = 2007
selection = "All"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.view.reference_period, 2007);
        assert_eq!(config.view.selection, "All");
        assert_eq!(config.columns.entity, "country");
        assert!(config.data.path.is_none());
    }

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed: Config = toml::from_str(&Config::default_toml()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[data]
path = "data/world.parquet"

[columns]
entity = "name"

[view]
selection = "Norway"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data.path, Some(PathBuf::from("data/world.parquet")));
        assert_eq!(config.columns.entity, "name");
        assert_eq!(config.columns.group, "continent");
        assert_eq!(config.view.selection, "Norway");
        assert_eq!(config.view.reference_period, 2007);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[view]\nreference_period = 2002\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.view.reference_period, 2002);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

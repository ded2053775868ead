use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::RunParams;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_VAR: &str = "DCP_CONFIG";
pub const ENV_PREFIX: &str = "DCP__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub run: RunParams,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Service records, `.csv` or `.json`
    pub service_records: PathBuf,
    /// Truck characteristics table
    pub truck_data: PathBuf,
    /// `x,y` charging curve
    pub battery_profile: PathBuf,
    /// Optional JSON/YAML infrastructure description
    pub infrastructure: Option<PathBuf>,
    /// Vehicle mode filter; empty keeps every row
    pub mode: String,
    /// Earliest departure day kept (ISO or spreadsheet serial)
    pub start: Option<String>,
    /// Latest departure day kept (ISO or spreadsheet serial)
    pub end: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            service_records: PathBuf::from("data/service_records.csv"),
            truck_data: PathBuf::from("data/truck_data.csv"),
            battery_profile: PathBuf::from("data/battery_profile.csv"),
            infrastructure: None,
            mode: "E".to_string(),
            start: None,
            end: None,
        }
    }
}

impl InputConfig {
    pub fn mode_filter(&self) -> Option<&str> {
        let mode = self.mode.trim();
        (!mode.is_empty()).then_some(mode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File, or directory receiving `result.json`; nothing is written when unset
    pub path: Option<PathBuf>,
    /// Check the document against the built-in schema before writing
    pub validate_schema: bool,
    /// Reject windows that do not strictly contain the observed days
    pub enforce_window: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("result.json")),
            validate_schema: false,
            enforce_window: false,
        }
    }
}

impl Config {
    /// Load from `$DCP_CONFIG` (or `config/default.toml`) and `DCP__*` env vars
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        let config: Config = figment.extract()?;
        config.run.check()?;
        Ok(config)
    }
}

//! Application settings.
//!
//! Settings are layered; each layer only needs the keys it wants to change:
//!
//! ```text
//! stock defaults  →  museum.toml (optional)  →  .env  →  APP_* environment
//! ```
//!
//! ## Settings file
//!
//! ```toml
//! # All options are optional - defaults shown below
//! stage = "dev"                       # "dev" or "prod"
//! host = "127.0.0.1"
//! port = 8000
//! log_dir = "logs"
//! xlsx_path = "data/exhibits.xlsx"    # the catalog workbook
//! photos_dir = "data/photos"          # exhibit photos, looked up by id
//! admin_token = ""
//! ```
//!
//! Unknown keys in the file are rejected to catch typos early.
//!
//! ## Environment
//!
//! Every key can be overridden with an upper-cased `APP_` variable
//! (`APP_XLSX_PATH`, `APP_PORT`, ...). A `.env` file in the working directory
//! is loaded first and never overrides variables that are already set.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default settings file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "museum.toml";

const ENV_PREFIX: &str = "APP_";

/// Runtime settings for every surface (server, export, CLI queries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Deployment stage, `dev` or `prod`. `dev` enables debug logging.
    pub stage: String,
    /// Address the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Directory for the daily `app.<date>.log` files.
    pub log_dir: PathBuf,
    /// The catalog workbook.
    pub xlsx_path: PathBuf,
    /// Directory holding exhibit photos.
    pub photos_dir: PathBuf,
    /// Reserved for an admin surface; not checked anywhere yet.
    pub admin_token: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stage: "dev".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_dir: PathBuf::from("logs"),
            xlsx_path: PathBuf::from("data/exhibits.xlsx"),
            photos_dir: PathBuf::from("data/photos"),
            admin_token: String::new(),
        }
    }
}

impl Settings {
    /// Validate values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.stage.as_str(), "dev" | "prod") {
            return Err(ConfigError::Validation(format!(
                "stage must be \"dev\" or \"prod\", got {:?}",
                self.stage
            )));
        }
        if self.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".into()));
        }
        for (key, path) in [
            ("log_dir", &self.log_dir),
            ("xlsx_path", &self.xlsx_path),
            ("photos_dir", &self.photos_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn is_dev(&self) -> bool {
        self.stage == "dev"
    }
}

// =============================================================================
// Loading and merging
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Settings::default())
        .map_err(|e| ConfigError::Validation(format!("default settings must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a settings file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Turn `APP_*` variables into a TOML overlay. Unknown names are ignored.
pub fn env_overlay<I>(vars: I) -> Result<toml::Value, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut table = toml::map::Map::new();
    for (name, value) in vars {
        let Some(key) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key = key.to_ascii_lowercase();
        let parsed = match key.as_str() {
            "port" => value
                .trim()
                .parse::<u16>()
                .map(|p| toml::Value::Integer(i64::from(p)))
                .map_err(|_| ConfigError::Validation(format!("{name} must be a port number")))?,
            "stage" | "host" | "log_dir" | "xlsx_path" | "photos_dir" | "admin_token" => {
                toml::Value::String(value)
            }
            _ => continue,
        };
        table.insert(key, parsed);
    }
    Ok(toml::Value::Table(table))
}

/// Merge the overlays onto stock defaults, then deserialize and validate.
pub fn resolve_config(overlays: Vec<toml::Value>) -> Result<Settings, ConfigError> {
    let merged = overlays
        .into_iter()
        .fold(stock_defaults_value()?, merge_toml);
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from `config_file` (optional) and the process environment.
pub fn load_settings(config_file: &Path) -> Result<Settings, ConfigError> {
    // A missing .env is normal; a malformed one is reported but not fatal.
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        eprintln!("warning: ignoring .env: {err}");
    }

    let mut overlays = Vec::new();
    if let Some(file) = load_raw_config(config_file)? {
        overlays.push(file);
    }
    overlays.push(env_overlay(std::env::vars())?);
    resolve_config(overlays)
}

/// Returns a fully-commented stock `museum.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Museum Exhibits Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Every key can also be set from the environment with an APP_ prefix,
# e.g. APP_XLSX_PATH=/srv/catalog.xlsx. Environment wins over this file.
# Unknown keys will cause an error.

# Deployment stage: "dev" or "prod". "dev" turns on debug logging.
stage = "dev"

# Address and port for `museum-exhibits serve`.
host = "127.0.0.1"
port = 8000

# Directory for app.<date>.log (JSON lines, rotated daily, 12 kept).
log_dir = "logs"

# The catalog workbook. Row 1 must contain the columns:
#   ID_Экспоната, Название_экспоната, Название_музея, Описание,
#   Эпоха/Период, Категория, Дата_поступления, Фото_файл,
#   История_связанная_с_Воронежем
xlsx_path = "data/exhibits.xlsx"

# Exhibit photos. For exhibit 12 the lookup order is
# 12.png, 12.jpg, 12.jpeg, 12.webp, then the Фото_файл value.
photos_dir = "data/photos"

# Reserved; not used yet.
admin_token = ""
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.stage, "dev");
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.port, 8000);
        assert_eq!(s.xlsx_path, PathBuf::from("data/exhibits.xlsx"));
        assert_eq!(s.photos_dir, PathBuf::from("data/photos"));
        assert!(s.admin_token.is_empty());
    }

    #[test]
    fn resolve_without_overlays_is_default() {
        assert_eq!(resolve_config(vec![]).unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let overlay: toml::Value = toml::from_str("port = 9000\nphotos_dir = \"/srv/photos\"").unwrap();
        let s = resolve_config(vec![overlay]).unwrap();
        assert_eq!(s.port, 9000);
        assert_eq!(s.photos_dir, PathBuf::from("/srv/photos"));
        assert_eq!(s.host, "127.0.0.1");
    }

    #[test]
    fn env_wins_over_file() {
        let file: toml::Value = toml::from_str("port = 9000").unwrap();
        let env = env_overlay(vars(&[("APP_PORT", "9100"), ("APP_XLSX_PATH", "x.xlsx")])).unwrap();
        let s = resolve_config(vec![file, env]).unwrap();
        assert_eq!(s.port, 9100);
        assert_eq!(s.xlsx_path, PathBuf::from("x.xlsx"));
    }

    #[test]
    fn env_ignores_unrelated_variables() {
        let env = env_overlay(vars(&[("PATH", "/bin"), ("APP_UNKNOWN", "1"), ("APP_STAGE", "prod")]))
            .unwrap();
        let s = resolve_config(vec![env]).unwrap();
        assert_eq!(s.stage, "prod");
    }

    #[test]
    fn env_port_must_be_numeric() {
        let err = env_overlay(vars(&[("APP_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn unknown_key_rejected() {
        let overlay: toml::Value = toml::from_str("xlsx = \"typo.xlsx\"").unwrap();
        assert!(matches!(resolve_config(vec![overlay]), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn validate_rejects_unknown_stage() {
        let s = Settings {
            stage: "staging".into(),
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_zero_port_and_empty_paths() {
        let s = Settings {
            port: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());

        let s = Settings {
            xlsx_path: PathBuf::new(),
            ..Settings::default()
        };
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("xlsx_path"));
    }

    #[test]
    fn load_raw_config_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(load_raw_config(&tmp.path().join("museum.toml")).unwrap().is_none());
    }

    #[test]
    fn load_raw_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("museum.toml");
        fs::write(&path, "port = = 1").unwrap();
        assert!(matches!(load_raw_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let overlay: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(resolve_config(vec![overlay]).unwrap(), Settings::default());
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }
}

use std::path::{Path, PathBuf};

use binplan_core::GRID_UNIT_MM;
use serde::Deserialize;
use tracing::warn;

use crate::error::ToolError;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub default_unit: Option<String>,
    #[serde(default)]
    pub grid: GridConfig,
}

#[derive(Debug, Deserialize)]
pub struct GridConfig {
    /// Module edge length used when printing physical sizes.
    #[serde(default = "default_unit_mm")]
    pub unit_mm: u32,
}

fn default_unit_mm() -> u32 {
    GRID_UNIT_MM
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            unit_mm: default_unit_mm(),
        }
    }
}

/// Where to reach the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub api_url: String,
    pub api_token: Option<String>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("binplan").join("config.toml"))
}

pub fn load_config_from(path: &Path) -> Result<Config, ToolError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Loads the config file. An explicitly given file must parse; the default
/// location is optional and falls back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ToolError> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        return Ok(Config::default());
    }

    match load_config_from(&path) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
            Ok(Config::default())
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Picks the API location: flag, then environment, then config file.
pub fn resolve_connection(
    cli_url: Option<String>,
    config: &Config,
) -> Result<Connection, ToolError> {
    resolve_connection_with(
        cli_url,
        std::env::var("BINPLAN_API_URL").ok(),
        std::env::var("BINPLAN_API_TOKEN").ok(),
        config,
    )
}

fn resolve_connection_with(
    cli_url: Option<String>,
    env_url: Option<String>,
    env_token: Option<String>,
    config: &Config,
) -> Result<Connection, ToolError> {
    let api_url = non_empty(cli_url)
        .or_else(|| non_empty(env_url))
        .or_else(|| non_empty(config.api_url.clone()))
        .ok_or(ToolError::ApiUrlNotConfigured)?;
    let api_token = non_empty(env_token).or_else(|| non_empty(config.api_token.clone()));

    Ok(Connection { api_url, api_token })
}

pub fn resolve_unit(cli_unit: Option<String>, config: &Config) -> Result<String, ToolError> {
    non_empty(cli_unit)
        .or_else(|| non_empty(config.default_unit.clone()))
        .ok_or(ToolError::UnitNotSpecified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_url = "https://inventory.local/api/v1"
api_token = "abc"
default_unit = "drawer-3"

[grid]
unit_mm = 40
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://inventory.local/api/v1"));
        assert_eq!(config.api_token.as_deref(), Some("abc"));
        assert_eq!(config.default_unit.as_deref(), Some("drawer-3"));
        assert_eq!(config.grid.unit_mm, 40);
    }

    #[test]
    fn grid_section_is_optional() {
        let config: Config = toml::from_str(r#"api_url = "http://x""#).unwrap();
        assert_eq!(config.grid.unit_mm, GRID_UNIT_MM);
    }

    #[test]
    fn explicit_file_must_parse() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = ").unwrap();
        assert!(matches!(load_config(Some(file.path())), Err(ToolError::Config(_))));

        let missing = Path::new("/nonexistent/binplan.toml");
        assert!(matches!(load_config(Some(missing)), Err(ToolError::Io(_))));
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let config = Config {
            api_url: Some("http://file".to_string()),
            api_token: Some("file-token".to_string()),
            ..Config::default()
        };

        let conn = resolve_connection_with(
            Some("http://flag".to_string()),
            Some("http://env".to_string()),
            None,
            &config,
        )
        .unwrap();
        assert_eq!(conn.api_url, "http://flag");
        assert_eq!(conn.api_token.as_deref(), Some("file-token"));

        let conn = resolve_connection_with(
            None,
            Some("http://env".to_string()),
            Some("env-token".to_string()),
            &config,
        )
        .unwrap();
        assert_eq!(conn.api_url, "http://env");
        assert_eq!(conn.api_token.as_deref(), Some("env-token"));

        let conn = resolve_connection_with(None, Some(String::new()), None, &config).unwrap();
        assert_eq!(conn.api_url, "http://file");
    }

    #[test]
    fn missing_url_is_an_error() {
        let result = resolve_connection_with(None, None, None, &Config::default());
        assert!(matches!(result, Err(ToolError::ApiUrlNotConfigured)));
    }

    #[test]
    fn unit_from_flag_or_config() {
        let config = Config {
            default_unit: Some("drawer-1".to_string()),
            ..Config::default()
        };
        assert_eq!(resolve_unit(Some("drawer-2".to_string()), &config).unwrap(), "drawer-2");
        assert_eq!(resolve_unit(None, &config).unwrap(), "drawer-1");
        assert!(matches!(
            resolve_unit(None, &Config::default()),
            Err(ToolError::UnitNotSpecified)
        ));
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    25
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = get_config_file_path()?;

        if !config_path.exists() {
            return Err(ConfigError::ConfigNotFound);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = get_config_file_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content =
            toml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&config_path, content).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "api_base_url" => self.api_base_url = value.to_string(),
            "api_token" => {
                self.api_token = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            "timeout_secs" => {
                self.timeout_secs = value.parse().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "timeout_secs must be a number, got '{value}'"
                    ))
                })?
            }
            "page_size" => {
                self.page_size = value.parse().map_err(|_| {
                    ConfigError::InvalidValue(format!("page_size must be a number, got '{value}'"))
                })?
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "api_base_url" => Ok(self.api_base_url.clone()),
            "api_token" => Ok(self.api_token.clone().unwrap_or_default()),
            "timeout_secs" => Ok(self.timeout_secs.to_string()),
            "page_size" => Ok(self.page_size.to_string()),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_base_url", self.api_base_url.clone()),
            ("api_token", self.api_token.clone().unwrap_or_default()),
            ("timeout_secs", self.timeout_secs.to_string()),
            ("page_size", self.page_size.to_string()),
        ]
    }
}

pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    Ok(config_dir.join("revq"))
}

fn get_config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(get_config_dir()?.join("config.toml"))
}

#[derive(Debug)]
pub enum ConfigError {
    ConfigNotFound,
    ConfigDirNotFound,
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
    UnknownKey(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound => {
                write!(
                    f,
                    "Configuration not found. Run 'revq config set api_base_url <url>' to configure the API endpoint."
                )
            }
            ConfigError::ConfigDirNotFound => {
                write!(f, "Could not find config directory")
            }
            ConfigError::ReadError(msg) => {
                write!(f, "Failed to read config file: {}", msg)
            }
            ConfigError::WriteError(msg) => {
                write!(f, "Failed to write config file: {}", msg)
            }
            ConfigError::ParseError(msg) => {
                write!(f, "Failed to parse config file: {}", msg)
            }
            ConfigError::SerializeError(msg) => {
                write!(f, "Failed to serialize config: {}", msg)
            }
            ConfigError::UnknownKey(key) => {
                write!(
                    f,
                    "Unknown configuration key '{}'. Valid keys: api_base_url, api_token, timeout_secs, page_size",
                    key
                )
            }
            ConfigError::InvalidValue(msg) => {
                write!(f, "Invalid configuration value: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_parses_numbers() {
        let mut config = Config::default();
        config.set_value("timeout_secs", "45").unwrap();
        assert_eq!(config.timeout_secs, 45);

        let result = config.set_value("timeout_secs", "soon");
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.set_value("colour", "red"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            config.get_value("colour"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_empty_token_clears_it() {
        let mut config = Config::default();
        config.set_value("api_token", "secret").unwrap();
        assert_eq!(config.api_token.as_deref(), Some("secret"));

        config.set_value("api_token", "").unwrap();
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_defaults_apply_to_partial_files() {
        let config: Config =
            toml::from_str(r#"api_base_url = "https://api.example.org""#).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.page_size, 25);
        assert!(config.api_token.is_none());
    }
}

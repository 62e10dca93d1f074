//! User configuration, stored by confy under the `firstthings` app name

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

pub const APP_NAME: &str = "firstthings";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the data file and its backup
    pub data_directory: String,
    pub data_filename: String,
    /// Log filter used when `FTF_LOG` is unset
    pub log_level: String,
    /// Set to false to never color output
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_directory = directories::ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            data_directory: data_directory.to_string_lossy().into_owned(),
            data_filename: "firstthingsfirst_data.json".to_string(),
            log_level: "warn".to_string(),
            color: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(confy::load(APP_NAME, None)?)
    }

    /// Location of the config file itself
    pub fn path() -> Result<PathBuf> {
        Ok(confy::get_configuration_file_path(APP_NAME, None)?)
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_directory).join(&self.data_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_path_joins_directory_and_file() {
        let cfg = Config {
            data_directory: "/tmp/ftf".to_string(),
            data_filename: "data.json".to_string(),
            ..Config::default()
        };
        assert_eq!(cfg.data_path(), PathBuf::from("/tmp/ftf/data.json"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"color": false}"#).unwrap();
        assert!(!cfg.color);
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.data_filename, "firstthingsfirst_data.json");
    }
}

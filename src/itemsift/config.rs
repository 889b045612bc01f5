use crate::error::{Result, SiftError};
use crate::model::{RaceId, Sex};
use crate::query::Delimiter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_DATA_SITE: &str = "teamcraft";

pub const CONFIG_KEYS: &[&str] = &[
    "data-site",
    "teamcraft-force-browser",
    "delimiter",
    "self-race",
    "self-sex",
    "catalog",
];

/// Configuration for itemsift, stored in the user config dir as config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiftConfig {
    /// Data site used by `open` ("teamcraft" or "garland")
    #[serde(default = "default_data_site")]
    pub data_site: String,

    /// Skip the local Teamcraft app and always use the browser
    #[serde(default)]
    pub teamcraft_force_browser: bool,

    /// Query token delimiter; whitespace when unset
    #[serde(default)]
    pub delimiter: Option<char>,

    /// The character resolved by the `self` tag
    #[serde(default)]
    pub self_race: Option<RaceId>,

    #[serde(default)]
    pub self_sex: Option<Sex>,

    /// Catalog used when `--catalog` is not given
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

fn default_data_site() -> String {
    DEFAULT_DATA_SITE.to_string()
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            data_site: default_data_site(),
            teamcraft_force_browser: false,
            delimiter: None,
            self_race: None,
            self_sex: None,
            catalog: None,
        }
    }
}

impl SiftConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(SiftError::Io)?;
        let config: SiftConfig =
            serde_json::from_str(&content).map_err(SiftError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(SiftError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(SiftError::Serialization)?;
        fs::write(config_path, content).map_err(SiftError::Io)?;
        Ok(())
    }

    pub fn delimiter(&self) -> Delimiter {
        match self.delimiter {
            Some(c) if !c.is_whitespace() => Delimiter::Char(c),
            _ => Delimiter::Whitespace,
        }
    }

    /// The `self` tag target, when both halves are configured.
    pub fn snapshot(&self) -> Option<(RaceId, Sex)> {
        Some((self.self_race?, self.self_sex?))
    }

    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "data-site" => self.data_site.clone(),
            "teamcraft-force-browser" => self.teamcraft_force_browser.to_string(),
            "delimiter" => self
                .delimiter
                .map(|c| c.to_string())
                .unwrap_or_else(|| "whitespace".to_string()),
            "self-race" => display_opt(self.self_race),
            "self-sex" => display_opt(self.self_sex),
            "catalog" => self
                .catalog
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            other => return Err(SiftError::Config(format!("Unknown config key: {}", other))),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "data-site" => {
                let site = value.to_lowercase();
                if !matches!(site.as_str(), "teamcraft" | "garland") {
                    return Err(SiftError::Config(format!("Unknown data site: {}", value)));
                }
                self.data_site = site;
            }
            "teamcraft-force-browser" => {
                self.teamcraft_force_browser = value
                    .parse()
                    .map_err(|_| SiftError::Config(format!("Expected true or false: {}", value)))?;
            }
            "delimiter" => {
                self.delimiter = match value {
                    "" | "whitespace" => None,
                    v if v.chars().count() == 1 => v.chars().next(),
                    v => {
                        return Err(SiftError::Config(format!(
                            "Delimiter must be a single character: {}",
                            v
                        )))
                    }
                };
            }
            "self-race" => {
                self.self_race = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        SiftError::Config(format!("Race must be a numeric id: {}", value))
                    })?)
                };
            }
            "self-sex" => {
                self.self_sex = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(SiftError::Config)?)
                };
            }
            "catalog" => {
                self.catalog = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            other => return Err(SiftError::Config(format!("Unknown config key: {}", other))),
        }
        Ok(())
    }
}

fn display_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed, trusted source of the MIT1003 stimuli archive.
pub const DEFAULT_STIMULI_URL: &str =
    "http://people.csail.mit.edu/tjudd/WherePeopleLook/ALLSTIMULI.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Location of the distributed `capmit1003.db` SQLite store.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory the stimuli archive is extracted into.
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    #[serde(default = "default_stimuli_url")]
    pub stimuli_url: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("capmit1003.db")
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("mit1003")
}

fn default_stimuli_url() -> String {
    DEFAULT_STIMULI_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            images_dir: default_images_dir(),
            stimuli_url: default_stimuli_url(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Stimuli images live one level below the extraction target, the
    /// layout the upstream archive uses.
    pub fn stimuli_dir(&self) -> PathBuf {
        self.images_dir.join("ALLSTIMULI")
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("capmit1003")
            .join("config.toml")
    }
}

//! Server settings loaded from `gbp.toml`.
//!
//! Every field has a default, so a missing file (or a partial one) is fine.
//! The superuser token can also come from `GBP_SUPERUSER_TOKEN`.

use std::path::{Path, PathBuf};

use gbp_seed::SeedSource;
use serde::Deserialize;
use thiserror::Error;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "gbp.toml";
/// Environment variable overriding `superuser_token`.
pub const TOKEN_ENV: &str = "GBP_SUPERUSER_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Listen address, `host:port`.
    pub addr: String,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8090".to_string(),
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

/// The bundled seed checked at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedSettings {
    pub file: PathBuf,
    pub hash: PathBuf,
    pub note: PathBuf,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("./seed.db"),
            hash: PathBuf::from("./seed.hash"),
            note: PathBuf::from("./seed.note"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub ui_dir: PathBuf,
    pub superuser_token: Option<String>,
    pub http: HttpSettings,
    pub seed: SeedSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./gbp_data"),
            ui_dir: PathBuf::from("./ui/dist"),
            superuser_token: None,
            http: HttpSettings::default(),
            seed: SeedSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from `gbp.toml` if it exists.
    ///
    /// An explicit path must exist; the default file is optional. The token
    /// environment variable wins over the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.is_empty() {
                settings.superuser_token = Some(token);
            }
        }
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// The configured token, if it is non-empty.
    pub fn superuser_token(&self) -> Option<&str> {
        self.superuser_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn seed_source(&self) -> SeedSource {
        SeedSource {
            file: self.seed.file.clone(),
            hash_file: self.seed.hash.clone(),
            note_file: self.seed.note.clone(),
        }
    }
}

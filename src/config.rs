use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::ConfigError;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT_MULTIPLIER: u32 = 5;
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Everything `webfetch` reads from its TOML file.
///
/// Missing sections and keys fall back to [`Default`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub retriever: RetrieverConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retriever.total_timeout()?;
        Ok(())
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    pub connect_timeout_ms: u64,
    /// Total request timeout is the connect timeout times this.
    pub timeout_multiplier: u32,
    pub user_agent: String,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            timeout_multiplier: DEFAULT_TIMEOUT_MULTIPLIER,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl RetrieverConfig {
    pub fn connect_timeout(self, timeout: Duration) -> Self {
        Self {
            connect_timeout_ms: timeout.as_millis() as u64,
            ..self
        }
    }

    pub fn timeout_multiplier(self, timeout_multiplier: u32) -> Self {
        Self {
            timeout_multiplier,
            ..self
        }
    }

    pub fn user_agent(self, user_agent: String) -> Self {
        Self { user_agent, ..self }
    }

    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn total_timeout(&self) -> Result<Duration, ConfigError> {
        self.connect_timeout_duration()
            .checked_mul(self.timeout_multiplier)
            .ok_or_else(|| ConfigError::Invalid {
                key: "retriever.timeout_multiplier",
                reason: format!(
                    "{} ms times {} overflows",
                    self.connect_timeout_ms, self.timeout_multiplier
                ),
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where file output lands.
    pub dir: PathBuf,
    /// `false` refuses to replace a file that already exists.
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            overwrite: true,
        }
    }
}

impl OutputConfig {
    pub fn dir(self, dir: PathBuf) -> Self {
        Self { dir, ..self }
    }

    pub fn no_clobber(self) -> Self {
        Self {
            overwrite: false,
            ..self
        }
    }
}

use std::{io, path::PathBuf};

use reqwest::{StatusCode, Url};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("`{original}` is not a valid URI: {source}")]
    Malformed {
        original: String,
        #[source]
        source: url::ParseError,
    },
    #[error("`{original}` uses scheme `{scheme}`, only http and https are supported")]
    InvalidScheme { original: String, scheme: String },
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    /// File output was requested but the URI path names no file.
    #[error("no file name in `{uri}` to write to")]
    NoFilename { uri: Url },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TargetError {
    /// Kind of the underlying I/O failure, `NotFound` for [`TargetError::NoFilename`].
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::NoFilename { .. } => Some(io::ErrorKind::NotFound),
            Self::Io(err) => Some(err.kind()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("status code error: {status} for {url}")]
    Status { url: Url, status: StatusCode },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("cannot build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

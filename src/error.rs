// Error module: the typed failures returned by the API client. The binary
// wraps these in `anyhow` with extra context; library callers can match on
// the variants to decide what to do next.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while talking to the package host.
#[derive(Error, Debug)]
pub enum Error {
    /// The (distribution, version) pair has no known identifier.
    #[error("unknown distribution: {distro}/{version}")]
    UnknownDistribution { distro: String, version: String },

    /// Network, DNS or TLS failure while sending a request.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The local package file could not be opened or inspected.
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote package source answered with an error status.
    #[error("http GET {url}: {status}\n>> {body:?}")]
    SourceFetch {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// The upload was rejected by the host (HTTP 422).
    #[error("unprocessable package: {0}")]
    Validation(String),

    /// The addressed package does not exist (HTTP 404).
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Any status the operation does not expect.
    #[error("unexpected response: {status}, {body:?}")]
    UnexpectedStatus { status: StatusCode, body: String },

    /// A `user/repo/distro/version` string that does not parse.
    #[error("invalid target '{0}': expected user/repo/distro/version")]
    InvalidTarget(String),

    /// A package source without a usable file name or with a bad URL.
    #[error("invalid package source '{0}'")]
    InvalidSource(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status carried by the error, if the host answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::SourceFetch { status, .. } | Error::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            Error::Validation(_) => Some(StatusCode::UNPROCESSABLE_ENTITY),
            Error::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Error::Http(e) => e.status(),
            _ => None,
        }
    }
}

// Package module: the small value types a request is built from. Nothing
// here touches the network; the `api` module turns these into URLs and
// multipart bodies.

use crate::error::{Error, Result};
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A repository plus the distribution a package belongs to, written on the
/// command line as `user/repo/distro/version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Repository name as the host knows it (`user/repo`).
    pub repo: String,
    pub distro: String,
    pub version: String,
}

impl Target {
    pub fn new(repo: &str, distro: &str, version: &str) -> Self {
        Target {
            repo: repo.to_string(),
            distro: distro.to_string(),
            version: version.to_string(),
        }
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        match parts.as_slice() {
            [user, repo, distro, version] if parts.iter().all(|p| !p.is_empty()) => Ok(Target {
                repo: format!("{user}/{repo}"),
                distro: distro.to_string(),
                version: version.to_string(),
            }),
            _ => Err(Error::InvalidTarget(s.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.repo, self.distro, self.version)
    }
}

/// Where the package bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    Local(PathBuf),
    Remote(Url),
}

impl PackageSource {
    /// Classify a user supplied argument. Anything starting with `http://`
    /// or `https://` is fetched over the network, the rest is a path.
    pub fn parse(arg: &str) -> Result<Self> {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            let url = Url::parse(arg).map_err(|_| Error::InvalidSource(arg.to_string()))?;
            Ok(PackageSource::Remote(url))
        } else if arg.is_empty() {
            Err(Error::InvalidSource(arg.to_string()))
        } else {
            Ok(PackageSource::Local(PathBuf::from(arg)))
        }
    }

    /// Base name of the package, used as the upload file name.
    pub fn file_name(&self) -> Result<String> {
        match self {
            PackageSource::Local(path) => base_name(path),
            PackageSource::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .ok_or_else(|| Error::InvalidSource(url.to_string())),
        }
    }
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageSource::Local(path) => write!(f, "{}", path.display()),
            PackageSource::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// Last component of `path`, with any directories stripped.
pub fn base_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidSource(path.display().to_string()))
}

/// Everything needed to address one package on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    pub target: Target,
    pub source: PackageSource,
}

impl PackageRef {
    pub fn new(target: Target, source: PackageSource) -> Self {
        PackageRef { target, source }
    }

    pub fn file_name(&self) -> Result<String> {
        self.source.file_name()
    }
}

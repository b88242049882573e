// Config module: figures out which host to talk to and with which token.
//
// Sources, highest priority first:
// - explicit overrides (the CLI flags),
// - `PACKAGECLOUD_URL` / `PACKAGECLOUD_TOKEN` environment variables,
// - a JSON file, `~/.packagecloud` unless another path is given.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_URL: &str = "https://packagecloud.io";
pub const URL_ENV: &str = "PACKAGECLOUD_URL";
pub const TOKEN_ENV: &str = "PACKAGECLOUD_TOKEN";
const CONFIG_FILE_NAME: &str = ".packagecloud";

/// Shape of the JSON config file. Every field is optional.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Extra `distro/version` -> id entries.
    #[serde(default)]
    pub distributions: HashMap<String, String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// The file named by `overrides`, else `default_path` when it exists,
    /// else an empty config. A broken file is always an error.
    pub fn locate(overrides: &Overrides, default_path: Option<PathBuf>) -> Result<Self> {
        match (&overrides.config_path, default_path) {
            (Some(path), _) => Self::load(path),
            (None, Some(path)) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// [`ConfigFile::locate`] with `~/.packagecloud` as the default.
    pub fn discover(overrides: &Overrides) -> Result<Self> {
        Self::locate(overrides, default_config_path())
    }
}

/// Values that take precedence over everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub url: Option<String>,
    pub token: Option<String>,
    /// Explicit config file; it must exist when given.
    pub config_path: Option<PathBuf>,
}

/// Resolved client settings.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub url: String,
    pub token: String,
    pub distributions: HashMap<String, String>,
}

// The token stays out of debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("distributions", &self.distributions)
            .finish()
    }
}

impl Config {
    pub fn new(url: &str, token: &str) -> Self {
        Config {
            url: url.to_string(),
            token: token.to_string(),
            distributions: HashMap::new(),
        }
    }

    /// Resolve settings from the process environment and the home directory.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        Self::resolve(overrides, |key| std::env::var(key).ok(), default_config_path())
    }

    /// Same as [`Config::load`] with the environment lookup and the default
    /// file location supplied by the caller.
    pub fn resolve<F>(overrides: &Overrides, env: F, default_path: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = ConfigFile::locate(overrides, default_path)?;

        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let url = non_empty(overrides.url.clone())
            .or_else(|| non_empty(env(URL_ENV)))
            .or_else(|| non_empty(file.url.clone()))
            .unwrap_or_else(|| DEFAULT_URL.to_string());

        let token = non_empty(overrides.token.clone())
            .or_else(|| non_empty(env(TOKEN_ENV)))
            .or_else(|| non_empty(file.token.clone()))
            .ok_or_else(|| {
                Error::Config(format!(
                    "no API token configured (set {TOKEN_ENV} or add \"token\" to ~/{CONFIG_FILE_NAME})"
                ))
            })?;

        tracing::debug!(url = %url, extra_distributions = file.distributions.len(), "resolved configuration");

        Ok(Config {
            url: url.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
            distributions: file.distributions,
        })
    }
}

/// `~/.packagecloud`, when a home directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_token_and_url_from_file() {
        let file = write_config(
            r#"{"url": "https://packages.example.com/", "token": "file-token",
                "distributions": {"ubuntu/noble": "300"}}"#,
        );
        let cfg = Config::resolve(&Overrides::default(), no_env, Some(file.path().to_path_buf()))
            .unwrap();
        assert_eq!(cfg.url, "https://packages.example.com");
        assert_eq!(cfg.token, "file-token");
        assert_eq!(cfg.distributions.get("ubuntu/noble").map(String::as_str), Some("300"));
    }

    #[test]
    fn env_beats_file_and_flags_beat_env() {
        let file = write_config(r#"{"token": "file-token"}"#);
        let env = |key: &str| match key {
            TOKEN_ENV => Some("env-token".to_string()),
            URL_ENV => Some("http://env.example.com".to_string()),
            _ => None,
        };

        let cfg = Config::resolve(&Overrides::default(), env, Some(file.path().to_path_buf()))
            .unwrap();
        assert_eq!(cfg.token, "env-token");
        assert_eq!(cfg.url, "http://env.example.com");

        let overrides = Overrides {
            token: Some("flag-token".into()),
            url: Some("http://flag.example.com".into()),
            config_path: None,
        };
        let cfg = Config::resolve(&overrides, env, Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.token, "flag-token");
        assert_eq!(cfg.url, "http://flag.example.com");
    }

    #[test]
    fn missing_default_file_is_fine_but_token_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(".packagecloud");

        let err = Config::resolve(&Overrides::default(), no_env, Some(missing.clone())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let env = |key: &str| (key == TOKEN_ENV).then(|| "t".to_string());
        let cfg = Config::resolve(&Overrides::default(), env, Some(missing)).unwrap();
        assert_eq!(cfg.url, DEFAULT_URL);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            token: Some("t".into()),
            config_path: Some(dir.path().join("nope.json")),
            ..Default::default()
        };
        let err = Config::resolve(&overrides, no_env, None).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let file = write_config("{not json");
        let err = Config::resolve(&Overrides::default(), no_env, Some(file.path().to_path_buf()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn locate_reads_distributions_without_a_token() {
        let file = write_config(r#"{"distributions": {"ubuntu/noble": "300"}}"#);
        let found = ConfigFile::locate(&Overrides::default(), Some(file.path().to_path_buf()))
            .unwrap();
        assert_eq!(found.token, None);
        assert_eq!(found.distributions.get("ubuntu/noble").map(String::as_str), Some("300"));
    }

    #[test]
    fn locate_reports_a_broken_file() {
        let file = write_config(r#"{"distributions": ["#);
        let err = ConfigFile::locate(&Overrides::default(), Some(file.path().to_path_buf()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn locate_without_any_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let found = ConfigFile::locate(&Overrides::default(), Some(dir.path().join(".packagecloud")))
            .unwrap();
        assert_eq!(found, ConfigFile::default());
    }

    #[test]
    fn debug_output_hides_token() {
        let cfg = Config::new(DEFAULT_URL, "secret-token");
        assert!(!format!("{cfg:?}").contains("secret-token"));
    }
}

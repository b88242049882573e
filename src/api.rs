// API client module: a small blocking HTTP client for the package host.
// Every operation is one request: build the URL, attach the common headers
// and basic auth, send, then map the status code. Nothing is retried.

use crate::config::Config;
use crate::distributions::Distributions;
use crate::error::{Error, Result};
use crate::package::{base_name, PackageRef, PackageSource, Target};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, PRAGMA};
use reqwest::StatusCode;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Blocking client holding the HTTP connection pool, the API base URL, the
/// token and the distribution table used to resolve upload ids.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
    distributions: Distributions,
}

impl ApiClient {
    /// Build a client for `base_url` authenticating with `token`, using the
    /// built-in distribution table.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Self::with_distributions(base_url, token, Distributions::default())
    }

    pub fn with_distributions(
        base_url: &str,
        token: &str,
        distributions: Distributions,
    ) -> Result<Self> {
        // Uploads and source downloads may take as long as they need.
        let client = Client::builder()
            .default_headers(default_headers())
            .timeout(None::<Duration>)
            .build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            distributions,
        })
    }

    /// Create a client from resolved configuration, including any extra
    /// distributions it declares.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_distributions(
            &config.url,
            &config.token,
            Distributions::with_extra(&config.distributions),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn distributions(&self) -> &Distributions {
        &self.distributions
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/repos/{}", self.base_url, path)
    }

    /// Auth and `Accept: application/json` for calls to the API itself.
    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(ACCEPT, "application/json")
            .basic_auth(&self.token, Some(""))
    }

    /// Upload a package to `target.repo` for `target.distro/target.version`.
    ///
    /// The distribution is resolved before anything touches the network. A
    /// remote source is fetched first; if that fails the upload is never
    /// attempted. Success is HTTP 201.
    pub fn push_package(&self, package: &PackageRef) -> Result<()> {
        let target = &package.target;
        let distro_version_id = self
            .distributions
            .distro_version_id(&target.distro, &target.version)
            .ok_or_else(|| Error::UnknownDistribution {
                distro: target.distro.clone(),
                version: target.version.clone(),
            })?
            .to_string();

        let file_name = package.file_name()?;
        let part = self
            .open_source(&package.source)?
            .file_name(file_name.clone())
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new()
            .text("package[distro_version_id]", distro_version_id.clone())
            .part("package[package_file]", part);

        let url = self.url(&format!("{}/packages.json", target.repo));
        debug!(%url, file = %file_name, distro_version_id = %distro_version_id, "uploading package");
        let res = self.authed(self.client.post(&url).multipart(form)).send()?;

        match res.status() {
            StatusCode::CREATED => Ok(()),
            StatusCode::UNPROCESSABLE_ENTITY => Err(Error::Validation(body_text(res))),
            _ => Err(unexpected(res)),
        }
    }

    /// Copy a package from `source` to the `destination` repository.
    /// Success is HTTP 200, a missing package is reported as not found.
    pub fn promote_package(&self, source: &Target, file: &Path, destination: &str) -> Result<()> {
        let form = multipart::Form::new().text("destination", destination.to_string());
        let path = format!("{}/promote.json", package_path(source, file)?);
        let url = self.url(&path);
        debug!(%url, %destination, "promoting package");
        let res = self.authed(self.client.post(&url).multipart(form)).send()?;
        expect_ok(res, path)
    }

    /// Remove a package from the repository. Success is HTTP 200, a missing
    /// package is reported as not found.
    pub fn delete_package(&self, target: &Target, file: &Path) -> Result<()> {
        let path = package_path(target, file)?;
        let url = self.url(&path);
        debug!(%url, "deleting package");
        let res = self.authed(self.client.delete(&url)).send()?;
        expect_ok(res, path)
    }

    /// Open the package bytes as a multipart part. Remote sources are
    /// streamed straight from the GET response.
    fn open_source(&self, source: &PackageSource) -> Result<multipart::Part> {
        match source {
            PackageSource::Local(path) => {
                let io_err = |e| Error::Io {
                    path: path.to_path_buf(),
                    source: e,
                };
                let file = File::open(path).map_err(io_err)?;
                let len = file.metadata().map_err(io_err)?.len();
                Ok(multipart::Part::reader_with_length(file, len))
            }
            PackageSource::Remote(url) => {
                debug!(%url, "fetching package source");
                // The source host gets no credentials and no API Accept header.
                let res = self.client.get(url.clone()).send()?;
                let status = res.status();
                if status.is_client_error() || status.is_server_error() {
                    return Err(Error::SourceFetch {
                        url: url.to_string(),
                        status,
                        body: body_text(res),
                    });
                }
                Ok(match res.content_length() {
                    Some(len) => multipart::Part::reader_with_length(res, len),
                    None => multipart::Part::reader(res),
                })
            }
        }
    }
}

/// `Pragma: no-cache` goes on every request, source downloads included.
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

/// `{repo}/{distro}/{version}/{file name}` for promote and delete.
fn package_path(target: &Target, file: &Path) -> Result<String> {
    Ok(format!(
        "{}/{}/{}/{}",
        target.repo,
        target.distro,
        target.version,
        base_name(file)?
    ))
}

fn expect_ok(res: Response, path: String) -> Result<()> {
    match res.status() {
        StatusCode::OK => Ok(()),
        StatusCode::NOT_FOUND => Err(Error::NotFound { path }),
        _ => Err(unexpected(res)),
    }
}

fn unexpected(res: Response) -> Error {
    let status = res.status();
    Error::UnexpectedStatus {
        status,
        body: body_text(res),
    }
}

fn body_text(res: Response) -> String {
    res.text().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_path_uses_base_name() {
        let target = Target::new("acme/tools", "ubuntu", "jammy");
        let path = package_path(&target, Path::new("build/out/tool_1.0_amd64.deb")).unwrap();
        assert_eq!(path, "acme/tools/ubuntu/jammy/tool_1.0_amd64.deb");
    }

    #[test]
    fn package_path_needs_a_file_name() {
        let target = Target::new("acme/tools", "ubuntu", "jammy");
        assert!(package_path(&target, Path::new("/")).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("https://packagecloud.io/", "t").unwrap();
        assert_eq!(client.base_url(), "https://packagecloud.io");
        assert_eq!(
            client.url("acme/tools/packages.json"),
            "https://packagecloud.io/api/v1/repos/acme/tools/packages.json"
        );
    }

    #[test]
    fn default_headers_only_disable_caching() {
        let headers = default_headers();
        assert_eq!(headers.get(PRAGMA).unwrap(), "no-cache");
        assert!(headers.get(ACCEPT).is_none());
    }

    #[test]
    fn api_requests_ask_for_json() {
        let client = ApiClient::new("https://packagecloud.io", "t").unwrap();
        let req = client
            .authed(client.client.delete("https://packagecloud.io/api/v1/repos/a/b"))
            .build()
            .unwrap();
        assert_eq!(req.headers().get(ACCEPT).unwrap(), "application/json");
        assert!(req.headers().get(reqwest::header::AUTHORIZATION).is_some());
    }
}

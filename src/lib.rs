// Library root
// ------------
// Blocking client for the packagecloud package hosting API. The binary
// (`main.rs`) is a thin command line over these modules.
//
// Module responsibilities:
// - `api`: the HTTP client with the push, promote and delete operations.
// - `config`: token and base URL resolution (flags, env, ~/.packagecloud).
// - `distributions`: distro/version -> host id lookup table.
// - `package`: targets, package sources and file name handling.
// - `error`: the error type every library call returns.
// - `ui`: prompts and spinners used by the binary.
pub mod api;
pub mod config;
pub mod distributions;
pub mod error;
pub mod package;
pub mod ui;

pub use api::ApiClient;
pub use config::{Config, Overrides};
pub use distributions::Distributions;
pub use error::{Error, Result};
pub use package::{PackageRef, PackageSource, Target};

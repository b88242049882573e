// Entrypoint for the `pkgcloud` command line.
// - Parses arguments, sets up logging, resolves configuration.
// - Hands the API client to a subcommand or to the interactive menu.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pkgcloud_cli::config::{Config, ConfigFile, Overrides, TOKEN_ENV, URL_ENV};
use pkgcloud_cli::{ui, ApiClient, Distributions, Target};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pkgcloud", version, about = "Push, promote and delete packages on packagecloud")]
struct Cli {
    /// API base URL
    #[arg(long, global = true, env = URL_ENV)]
    url: Option<String>,

    /// API token
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// JSON config file (defaults to ~/.packagecloud)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a package file or URL to user/repo/distro/version
    Push { target: Target, source: String },
    /// Copy a package to another repository
    Promote {
        target: Target,
        file: PathBuf,
        /// Destination repository (user/repo)
        destination: String,
    },
    /// Remove a package from a repository
    #[command(alias = "yank")]
    Delete {
        target: Target,
        file: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List known distro/version names and their ids
    Distros,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match verbose {
        0 if quiet => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let overrides = Overrides {
        url: cli.url,
        token: cli.token,
        config_path: cli.config,
    };

    // Listing distributions needs no token, only the config file's extras.
    if let Some(Command::Distros) = cli.command {
        let file = ConfigFile::discover(&overrides).context("loading configuration")?;
        let table = Distributions::with_extra(&file.distributions);
        ui::print_distributions(&table);
        return Ok(());
    }

    let config = Config::load(&overrides).context("loading configuration")?;
    let api = ApiClient::from_config(&config).context("building HTTP client")?;

    match cli.command {
        Some(Command::Push { target, source }) => ui::push(&api, target, &source),
        Some(Command::Promote {
            target,
            file,
            destination,
        }) => ui::promote(&api, &target, &file, &destination),
        Some(Command::Delete { target, file, yes }) => ui::delete(&api, &target, &file, yes),
        Some(Command::Distros) => Ok(()),
        None => ui::main_menu(&api),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

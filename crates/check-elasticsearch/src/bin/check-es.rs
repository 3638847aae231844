//! check-es - Nagios-compatible Elasticsearch monitoring plugin.
//!
//! Prints one verdict on stdout and exits with the plugin status code.
//! Every failure, including bad arguments, is reported as UNKNOWN.

use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use check_elasticsearch::{
    CheckError, CheckEs, ConnectionSettings, Monitor, Monitoring, PartialSettings,
};

/// Check Elasticsearch
#[derive(Parser)]
#[command(name = "check-es")]
#[command(about = "Check Elasticsearch ILM, SLM, index locks and transforms")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// The Elasticsearch URL.
    #[arg(long, env = "ELASTICSEARCH_URL", global = true)]
    url: Option<String>,

    /// The Elasticsearch user (or set `ELASTICSEARCH_USERNAME`).
    #[arg(long, env = "ELASTICSEARCH_USER", global = true)]
    user: Option<String>,

    /// The Elasticsearch password.
    #[arg(long, env = "ELASTICSEARCH_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Disable the TLS certificate check.
    #[arg(long, global = true)]
    self_signed_certificate: bool,

    /// Display debug output on stderr.
    #[arg(long, global = true)]
    debug: bool,

    /// Load url, user and password from a YAML file.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// [ILM] Check the ILM on specific indice. Set indice _all to check all ILM policies.
    CheckIlmIndice {
        /// The indice name.
        #[arg(long)]
        indice: Option<String>,

        /// The indice name to exclude (repeatable).
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// [ILM] Check that ILM is running.
    CheckIlmStatus,

    /// [Indice] Check if there are indice locked. Use _all as indice name to check all indices.
    CheckIndiceLocked {
        /// The indice name.
        #[arg(long)]
        indice: Option<String>,
    },

    /// [SLM] Check snapshots state on repository.
    CheckRepositorySnapshot {
        /// The repository name.
        #[arg(long)]
        repository: Option<String>,
    },

    /// [SLM] Check that SLM policies did not fail on their last run.
    CheckSlmPolicy {
        /// The policy name, or empty to check all policies.
        #[arg(long, default_value = "")]
        name: String,
    },

    /// [SLM] Check that SLM service is running.
    CheckSlmStatus,

    /// [Transform] Check that transforms are not in error state.
    CheckTransform {
        /// The transform id, or empty to check all transforms.
        #[arg(long, default_value = "")]
        name: String,

        /// The transform id to exclude (repeatable).
        #[arg(long)]
        exclude: Vec<String>,
    },
}

/// Return the value of a mandatory subcommand flag.
fn required<'a>(value: Option<&'a String>, flag: &str) -> Result<&'a str, CheckError> {
    value
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CheckError::Validation(format!("You must set --{flag} parameter")))
}

impl Commands {
    /// Reject missing mandatory flags before any network call.
    fn validate(&self) -> Result<(), CheckError> {
        match self {
            Self::CheckIlmIndice { indice, .. } | Self::CheckIndiceLocked { indice } => {
                required(indice.as_ref(), "indice").map(|_| ())
            }
            Self::CheckRepositorySnapshot { repository } => {
                required(repository.as_ref(), "repository").map(|_| ())
            }
            _ => Ok(()),
        }
    }
}

async fn dispatch(monitor: &dyn Monitor, command: &Commands) -> Result<Monitoring, CheckError> {
    match command {
        Commands::CheckIlmIndice { indice, exclude } => {
            monitor
                .check_ilm_error(required(indice.as_ref(), "indice")?, exclude)
                .await
        }
        Commands::CheckIlmStatus => monitor.check_ilm_status().await,
        Commands::CheckIndiceLocked { indice } => {
            monitor
                .check_indice_locked(required(indice.as_ref(), "indice")?)
                .await
        }
        Commands::CheckRepositorySnapshot { repository } => {
            monitor
                .check_slm_error(required(repository.as_ref(), "repository")?)
                .await
        }
        Commands::CheckSlmPolicy { name } => monitor.check_slm_policy(name).await,
        Commands::CheckSlmStatus => monitor.check_slm_status().await,
        Commands::CheckTransform { name, exclude } => {
            monitor.check_transform_error(name, exclude).await
        }
    }
}

async fn run(cli: Cli) -> Result<Monitoring> {
    cli.command.validate()?;

    let mut partial = PartialSettings {
        url: cli.url,
        user: cli.user,
        password: cli.password,
    }
    .or(PartialSettings::from_env_fallback());
    if let Some(path) = &cli.config {
        partial = partial.or(PartialSettings::from_yaml_file(path)?);
    }
    let settings = ConnectionSettings::resolve(partial, cli.self_signed_certificate)?;
    debug!(url = %settings.url, "Resolved connection settings");

    let checks = CheckEs::connect(&settings).await?;
    Ok(dispatch(&checks, &cli.command).await?)
}

fn report(monitoring: &Monitoring) -> ! {
    println!("{monitoring}");
    std::process::exit(monitoring.exit_code())
}

fn failure(error: impl std::fmt::Display) -> Monitoring {
    Monitoring::unknown(format!("Error appear during check: {error}"))
}

/// Usage errors keep only the first line of the clap message.
fn usage_failure(error: &clap::Error) -> Monitoring {
    let rendered = error.to_string();
    failure(rendered.lines().next().unwrap_or_default())
}

/// `--debug` wins over `RUST_LOG`, which wins over the `warn` default.
fn log_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => report(&usage_failure(&e)),
    };

    // Initialize logging, kept off stdout which carries the plugin output
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.debug))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(monitoring) => report(&monitoring),
        Err(e) => report(&failure(format!("{e:#}"))),
    }
}

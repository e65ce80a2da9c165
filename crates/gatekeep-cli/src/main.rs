//! Gatekeep CLI.
//!
//! Evaluates access decisions against role and policy fixtures.
//!
//! # Quick Start
//!
//! ```bash
//! # Check a request
//! gatekeep check --fixture access.toml --actor alice --resource users --action delete
//!
//! # Supply context attributes and pin the clock
//! gatekeep check --fixture access.toml --actor carol --resource reports --action view \
//!     --attr region=eu --at 2025-03-14T20:00:00Z
//!
//! # Lint a fixture
//! gatekeep validate --fixture access.toml
//! ```

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gatekeep_config::GatekeepConfig;
use std::path::PathBuf;
use std::process::ExitCode;

/// Gatekeep - combined RBAC + ABAC access decisions.
#[derive(Parser)]
#[command(name = "gatekeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding gatekeep.toml / gatekeep.local.toml.
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether an actor may perform an action on a resource.
    Check {
        /// Fixture file (.toml or .json) with assignments and policies.
        #[arg(short, long)]
        fixture: PathBuf,

        /// Acting user id.
        #[arg(long)]
        actor: String,

        /// Resource name.
        #[arg(short, long)]
        resource: String,

        /// Action name.
        #[arg(short, long)]
        action: String,

        /// Context attribute as key=value (repeatable).
        #[arg(long = "attr", value_name = "KEY=VALUE")]
        attrs: Vec<String>,

        /// Evaluate as of this RFC 3339 instant instead of now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Report counts and unrecognized tokens in a fixture.
    Validate {
        /// Fixture file (.toml or .json).
        #[arg(short, long)]
        fixture: PathBuf,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            fixture,
            actor,
            resource,
            action,
            attrs,
            at,
        } => GatekeepConfig::load_from_dir(&cli.config_dir)
            .context("Failed to load configuration")
            .and_then(|config| {
                commands::check::run(&commands::check::CheckArgs {
                    config: &config,
                    fixture: &fixture,
                    actor: &actor,
                    resource: &resource,
                    action: &action,
                    attrs: &attrs,
                    at: at.as_deref(),
                })
            }),
        Commands::Validate { fixture } => commands::validate::run(&fixture),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

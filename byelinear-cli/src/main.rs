//! byelinear CLI - migrate Linear issues into GitHub
//!
//! Issues are fetched newest first, rendered into GitHub issues and created
//! one at a time, optionally landing on a Projects (v2) board.

mod commands;

use std::path::PathBuf;

use byelinear_core::{CliOverrides, Config, Secrets};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{MigrateArgs, ReserveArgs};

/// byelinear: move Linear issues to GitHub
#[derive(Parser, Debug)]
#[command(name = "byelinear")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/byelinear/config.toml)
    #[arg(long, global = true, env = "BYELINEAR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Migrate issues from a Linear team into a GitHub repository
    #[command(visible_alias = "m")]
    Migrate(MigrateArgs),

    /// Burn issue numbers and hold the requested one with an open placeholder
    Reserve(ReserveArgs),

    /// Show current configuration
    Config,

    /// Write a secrets template to ~/.config/byelinear/secrets.toml
    InitSecrets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let overrides = match &cli.command {
        Some(Commands::Migrate(args)) => args.overrides()?,
        Some(Commands::Reserve(args)) => {
            let (org, repo) = commands::split_repo(args.repo.as_deref())?;
            CliOverrides {
                org,
                repo,
                ..Default::default()
            }
        }
        _ => CliOverrides::default(),
    };
    let config = Config::load_with_overrides(cli.config.as_deref(), overrides)?;

    if cli.verbose {
        tracing::debug!(
            org = %config.github.org,
            repo = %config.github.repo,
            project = ?config.project_name(),
            team = %config.linear.team,
            identities = config.identities.len(),
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("byelinear {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Migrate(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Reserve(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => print_config(&config, cli.config.as_deref()),
        Some(Commands::InitSecrets) => {
            let path = Secrets::create_template()?;
            println!("Created {}", path.display());
        }
        None => {
            println!("byelinear - migrate Linear issues to GitHub");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config, path: Option<&std::path::Path>) {
    println!("byelinear Configuration");
    println!("=======================");
    println!();
    println!("GitHub:");
    println!("  org: {}", config.github.org);
    println!("  repo: {}", config.github.repo);
    println!("  project: {}", config.project_name().unwrap_or("(none)"));
    println!();
    println!("Linear:");
    println!("  team: {}", config.linear.team);
    match config.linear.number {
        Some(number) => println!("  number: {}", number),
        None => println!("  number: (all)"),
    }
    println!();
    println!("Export:");
    println!("  timeout: {:?}", config.export.timeout);
    println!("  continue_on_error: {}", config.export.continue_on_error);
    println!("  identities: {}", config.identities.len());
    println!();

    let path = path
        .map(std::path::Path::to_path_buf)
        .or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}

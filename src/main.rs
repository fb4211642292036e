use crate::utils::{
    config::Config,
    logger::{LogLevel, Logger},
    path::resolve_root,
    semver::BumpKind,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod bump;
mod types;
mod utils;

#[derive(Parser)]
#[command(name = "versionbump")]
#[command(author = "Devaloop")]
#[command(version)]
#[command(about = "Bump the version of app.json / package.json manifests in place")]
struct Cli {
    /// Directory manifest paths are relative to (defaults to the nearest
    /// ancestor holding versionbump.toml or app.json)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Configuration file (defaults to <root>/versionbump.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    // No command means a patch bump.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bump the version of every configured manifest
    Bump {
        /// Bump type: major | minor | patch
        #[arg(default_value = "patch")]
        kind: String,

        /// Show what would change without writing anything
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Print the current version of every configured manifest
    Show {},
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let root = resolve_root(cli.root.as_deref());
    let config = Config::load(&root, cli.config.as_deref())?;

    match cli.command {
        None => {
            bump::run::bump(&config, &root, BumpKind::default(), false)?;
        }
        Some(Commands::Bump { kind, dry_run }) => {
            let kind: BumpKind = kind.parse()?;
            bump::run::bump(&config, &root, kind, dry_run)?;
        }
        Some(Commands::Show {}) => {
            bump::run::show(&config, &root)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Logger::new().log_message(LogLevel::Error, &format!("{:#}", e));
            ExitCode::from(1)
        }
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use roster::engine::Session;
use roster::remote::RemoteClient;
use roster::store::ConfigStore;

use crate::Commands;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Reconcile group memberships against a directory authority", long_about = None)]
pub(crate) struct Cli {
    /// Config directory (defaults to $ROSTER_HOME, then ./.roster)
    #[arg(long = "config-dir", value_name = "PATH", global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("get current dir")?;
    let store = ConfigStore::locate(cli.config_dir, &cwd);

    match cli.command {
        None | Some(Commands::Tui) => {
            init_file_logging(&store)?;
            roster::tui::run(roster::tui::TuiRunOptions { store })
        }
        Some(command) => {
            init_stderr_logging();
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("start async runtime")?;
            runtime.block_on(crate::cli_exec::handle_command(&store, command))
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

// The TUI owns the terminal, so events go to <config-dir>/roster.log.
fn init_file_logging(store: &ConfigStore) -> Result<()> {
    std::fs::create_dir_all(store.root())
        .with_context(|| format!("create config dir {}", store.root().display()))?;
    let path = store.log_path();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

/// A session against the configured remote, with the first snapshot loaded.
pub(crate) async fn connect(store: &ConfigStore) -> Result<Session<RemoteClient>> {
    let (remote, token) = store.require_remote()?;
    let base_url = remote.base_url.clone();
    let client = RemoteClient::new(remote, token)?;
    let mut session = Session::new(Arc::new(client));
    session
        .refresh()
        .await
        .with_context(|| format!("load directory from {}", base_url))?;
    Ok(session)
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use tokio::sync::RwLock;

use roster::remote::{
    ArchiveGroupRequest, CreateGroupRequest, DirectoryData, MutationResponse,
    RegisterMemberRequest, UpdateMembershipsRequest,
};

#[path = "roster_server/directory.rs"]
mod directory;
use self::directory::*;
#[path = "roster_server/persistence.rs"]
mod persistence;
use self::persistence::*;
#[path = "roster_server/validators.rs"]
mod validators;
use self::validators::*;
#[path = "roster_server/http_error.rs"]
mod http_error;
use self::http_error::*;
#[path = "roster_server/handlers.rs"]
mod handlers;
use self::handlers::*;

struct AppState {
    data_dir: PathBuf,

    // Stored hash of the bearer token secret.
    token_hash: String,

    directory: RwLock<Directory>,
}

#[derive(Parser)]
#[command(name = "roster-server")]
#[command(about = "Roster directory authority (development)", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Data directory holding directory.json
    #[arg(long, default_value = "./roster-data")]
    data_dir: PathBuf,

    /// Seed file used when the data directory holds no directory yet
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Member id of the account the authority acts as. It joins every group
    /// it creates and is never removed by a membership replace.
    #[arg(long, default_value = "roster-bot")]
    service_member: String,

    /// Development bearer token
    #[arg(long, default_value = "dev")]
    dev_token: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    std::fs::create_dir_all(&args.data_dir)
        .with_context(|| format!("create data dir {}", args.data_dir.display()))?;

    let directory = load_or_seed_directory(&args.data_dir, args.seed.as_deref(), &args.service_member)
        .context("load directory")?;
    tracing::info!(
        members = directory.members.len(),
        groups = directory.groups.len(),
        "directory loaded"
    );

    let state = Arc::new(AppState {
        data_dir: args.data_dir,
        token_hash: hash_token(&args.dev_token),
        directory: RwLock::new(directory),
    });

    let authed = Router::new()
        .route("/api/data", get(get_data))
        .route("/api/update_memberships", post(update_memberships))
        .route("/api/create_group", post(create_group))
        .route("/api/archive_group", post(archive_group))
        .route("/api/members", post(register_member))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    let app = Router::new()
        .route("/healthz", get(healthz))
        .merge(authed)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;

    let local_addr = listener.local_addr().context("read listener local addr")?;
    eprintln!("roster-server listening on {}", local_addr);

    if let Some(addr_file) = &args.addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn require_bearer(
    State(state): State<Arc<AppState>>,
    req: axum::extract::Request,
    next: Next,
) -> Response {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return unauthorized();
    };

    let Ok(value) = value.to_str() else {
        return unauthorized();
    };

    let Some(token) = value.strip_prefix("Bearer ") else {
        return unauthorized();
    };

    if hash_token(token) != state.token_hash {
        return unauthorized();
    }

    next.run(req).await
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

fn hash_token(secret: &str) -> String {
    blake3::hash(secret.as_bytes()).to_hex().to_string()
}

fn now_ts() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "<time>".to_string())
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::model::{CONFIG_VERSION, RemoteConfig, RosterConfig};

pub const STORE_DIR: &str = ".roster";
pub const HOME_ENV: &str = "ROSTER_HOME";
pub const TOKEN_ENV: &str = "ROSTER_TOKEN";

/// On-disk home of the client's connection settings.
///
/// Only configuration lives here; snapshots and focus are rebuilt on every run.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    /// Uses `dir` when given, else `$ROSTER_HOME`, else `.roster` under `cwd`.
    pub fn locate(dir: Option<PathBuf>, cwd: &Path) -> Self {
        let root = dir
            .or_else(|| std::env::var_os(HOME_ENV).map(PathBuf::from))
            .unwrap_or_else(|| cwd.join(STORE_DIR));
        Self { root }
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join("roster.log")
    }

    pub fn read_config(&self) -> Result<RosterConfig> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(RosterConfig::default());
        }
        let bytes = fs::read(&path).context("read config.json")?;
        let cfg: RosterConfig = serde_json::from_slice(&bytes).context("parse config.json")?;
        if cfg.version > CONFIG_VERSION {
            return Err(anyhow!(
                "config.json version {} is newer than supported ({})",
                cfg.version,
                CONFIG_VERSION
            ));
        }
        Ok(cfg)
    }

    pub fn write_config(&self, cfg: &RosterConfig) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(cfg).context("serialize config")?;
        write_atomic(&self.config_path(), &bytes).context("write config.json")?;
        Ok(())
    }

    pub fn set_remote(&self, remote: RemoteConfig) -> Result<()> {
        let mut cfg = self.read_config()?;
        cfg.remote = Some(remote);
        self.write_config(&cfg)
    }

    /// The configured remote with its token resolved (`ROSTER_TOKEN` wins).
    pub fn require_remote(&self) -> Result<(RemoteConfig, String)> {
        let cfg = self.read_config()?;
        let remote = cfg
            .remote
            .context("no remote configured (run `roster remote set --url ... --token ...`)")?;
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| remote.token.clone())
            .with_context(|| {
                format!(
                    "no token for remote {} (pass --token to `roster remote set` or set {})",
                    remote.base_url, TOKEN_ENV
                )
            })?;
        Ok((remote, token))
    }
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

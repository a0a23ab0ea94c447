use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::model::{GroupSummary, RemoteConfig, Snapshot};

mod error;
pub use self::error::{FetchError, UpdateError};

mod types;
pub use self::types::*;

mod http_client;
mod membership;

pub mod fake;

/// The directory authority as seen by the reconciliation engine.
///
/// `set_group_members` replaces a group's membership with exactly the given
/// set; there is no add/remove primitive.
#[async_trait]
pub trait MembershipRemote: Send + Sync {
    async fn fetch_all(&self) -> Result<Snapshot, FetchError>;

    async fn set_group_members(
        &self,
        group_id: &str,
        member_ids: &BTreeSet<String>,
    ) -> Result<(), UpdateError>;

    async fn create_group(&self, name: &str, is_private: bool)
    -> Result<GroupSummary, UpdateError>;

    async fn archive_group(&self, group_id: &str) -> Result<(), UpdateError>;
}

pub struct RemoteClient {
    remote: RemoteConfig,
    token: String,
    client: reqwest::Client,
}

impl RemoteClient {
    pub fn new(remote: RemoteConfig, token: String) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("roster");
        if let Some(secs) = remote.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("build reqwest client")?;
        Ok(Self {
            remote,
            token,
            client,
        })
    }

    pub fn remote(&self) -> &RemoteConfig {
        &self.remote
    }
}

use std::sync::Arc;

use tracing::{info, warn};

use crate::model::Snapshot;
use crate::remote::{FetchError, MembershipRemote};

/// Holds the last snapshot fetched from the authority.
///
/// Readers get an `Arc` to a complete snapshot; a refresh swaps the whole
/// `Arc`, so a reader keeps seeing the old data until it asks again.
#[derive(Debug, Default)]
pub struct EntityStore {
    current: Arc<Snapshot>,
    generation: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Number of successful replacements so far; 0 means nothing was loaded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loaded(&self) -> bool {
        self.generation > 0
    }

    /// Fetches and installs a new snapshot. On failure the held snapshot is
    /// left untouched. There is no retry.
    pub async fn load<R>(&mut self, remote: &R) -> Result<Arc<Snapshot>, FetchError>
    where
        R: MembershipRemote + ?Sized,
    {
        let fetched = remote.fetch_all().await;
        self.install(fetched)
    }

    /// Applies the result of a fetch that ran elsewhere.
    pub fn install(
        &mut self,
        fetched: Result<Snapshot, FetchError>,
    ) -> Result<Arc<Snapshot>, FetchError> {
        match fetched {
            Ok(snapshot) => Ok(self.replace(snapshot)),
            Err(err) => {
                warn!(error = %err, generation = self.generation, "snapshot load failed; keeping previous data");
                Err(err)
            }
        }
    }

    pub fn replace(&mut self, snapshot: Snapshot) -> Arc<Snapshot> {
        self.current = Arc::new(snapshot);
        self.generation += 1;
        info!(
            generation = self.generation,
            members = self.current.members.len(),
            groups = self.current.groups.len(),
            "snapshot replaced"
        );
        self.snapshot()
    }
}

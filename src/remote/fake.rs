//! In-memory [`MembershipRemote`] for tests and offline demos.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::*;
use crate::model::{Group, Member};

/// One mutation as received by the fake, in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCall {
    SetGroupMembers {
        group_id: String,
        member_ids: BTreeSet<String>,
    },
    CreateGroup {
        name: String,
        is_private: bool,
    },
    ArchiveGroup {
        group_id: String,
    },
}

#[derive(Default)]
struct FakeState {
    members: Vec<Member>,
    groups: BTreeMap<String, Group>,
    calls: Vec<RecordedCall>,
    failing_groups: HashSet<String>,
    fetch_failure: Option<FetchError>,
    create_failure: Option<String>,
    next_group: u64,
}

#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<FakeState>,
    fetches: AtomicUsize,
    delay: Option<std::time::Duration>,
}

impl FakeRemote {
    pub fn new(members: Vec<Member>, groups: Vec<Group>) -> Self {
        let state = FakeState {
            members,
            groups: groups.into_iter().map(|g| (g.id.clone(), g)).collect(),
            ..FakeState::default()
        };
        Self {
            state: Mutex::new(state),
            fetches: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Every remote call sleeps this long before answering.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Membership updates for this group are rejected until cleared.
    pub fn fail_group(&self, group_id: &str) {
        self.lock().failing_groups.insert(group_id.to_string());
    }

    pub fn fail_fetch(&self, err: Option<FetchError>) {
        self.lock().fetch_failure = err;
    }

    pub fn fail_create(&self, message: Option<&str>) {
        self.lock().create_failure = message.map(str::to_string);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn group_members(&self, group_id: &str) -> Option<BTreeSet<String>> {
        self.lock().groups.get(group_id).map(|g| g.members.clone())
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MembershipRemote for FakeRemote {
    async fn fetch_all(&self) -> Result<Snapshot, FetchError> {
        self.pause().await;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let st = self.lock();
        if let Some(err) = &st.fetch_failure {
            return Err(err.clone());
        }
        Ok(Snapshot::new(
            st.members.clone(),
            st.groups.values().cloned().collect(),
        ))
    }

    async fn set_group_members(
        &self,
        group_id: &str,
        member_ids: &BTreeSet<String>,
    ) -> Result<(), UpdateError> {
        self.pause().await;
        let mut st = self.lock();
        st.calls.push(RecordedCall::SetGroupMembers {
            group_id: group_id.to_string(),
            member_ids: member_ids.clone(),
        });
        if st.failing_groups.contains(group_id) {
            return Err(UpdateError::Rejected(format!(
                "not a member of private group {}",
                group_id
            )));
        }
        let Some(group) = st.groups.get_mut(group_id) else {
            return Err(UpdateError::Rejected("group not found".to_string()));
        };
        group.members = member_ids.clone();
        Ok(())
    }

    async fn create_group(
        &self,
        name: &str,
        is_private: bool,
    ) -> Result<GroupSummary, UpdateError> {
        self.pause().await;
        let mut st = self.lock();
        st.calls.push(RecordedCall::CreateGroup {
            name: name.to_string(),
            is_private,
        });
        if let Some(msg) = &st.create_failure {
            return Err(UpdateError::Rejected(msg.clone()));
        }
        st.next_group += 1;
        let id = format!("GNEW{}", st.next_group);
        let group = Group {
            id: id.clone(),
            name: name.to_string(),
            is_private,
            members: BTreeSet::new(),
        };
        st.groups.insert(id.clone(), group);
        Ok(GroupSummary {
            id,
            name: name.to_string(),
            is_private,
        })
    }

    async fn archive_group(&self, group_id: &str) -> Result<(), UpdateError> {
        self.pause().await;
        let mut st = self.lock();
        st.calls.push(RecordedCall::ArchiveGroup {
            group_id: group_id.to_string(),
        });
        if st.failing_groups.contains(group_id) {
            return Err(UpdateError::Rejected("archive refused".to_string()));
        }
        match st.groups.remove(group_id) {
            Some(_) => Ok(()),
            None => Err(UpdateError::Rejected("group not found".to_string())),
        }
    }
}

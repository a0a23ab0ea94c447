//! The authority's view of people and groups, and the rules for changing it.

use std::collections::{BTreeMap, BTreeSet};

use super::*;

pub(super) const DIRECTORY_VERSION: u32 = 1;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub(super) struct DirectoryMember {
    pub(super) id: String,
    pub(super) name: String,

    #[serde(default)]
    pub(super) is_bot: bool,

    #[serde(default)]
    pub(super) deleted: bool,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub(super) struct DirectoryGroup {
    pub(super) id: String,
    pub(super) name: String,

    #[serde(default)]
    pub(super) is_private: bool,

    #[serde(default)]
    pub(super) members: BTreeSet<String>,

    #[serde(default)]
    pub(super) created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) archived_at: Option<String>,
}

impl DirectoryGroup {
    fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub(super) struct Directory {
    pub(super) version: u32,

    /// Account the authority acts as; see `--service-member`.
    pub(super) service_member: String,

    #[serde(default)]
    pub(super) members: BTreeMap<String, DirectoryMember>,

    #[serde(default)]
    pub(super) groups: BTreeMap<String, DirectoryGroup>,
}

/// Why the authority refused a change. Maps onto an HTTP status.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Refusal {
    BadRequest(String),
    NotInPrivateGroup,
    NotFound,
    Conflict(String),
}

impl Refusal {
    pub(super) fn message(&self) -> String {
        match self {
            Refusal::BadRequest(msg) | Refusal::Conflict(msg) => msg.clone(),
            Refusal::NotInPrivateGroup => {
                "the service account is not a member of this private group; add it manually first"
                    .to_string()
            }
            Refusal::NotFound => "group not found".to_string(),
        }
    }
}

impl Directory {
    pub(super) fn empty(service_member: &str) -> Self {
        Self {
            version: DIRECTORY_VERSION,
            service_member: service_member.to_string(),
            members: BTreeMap::new(),
            groups: BTreeMap::new(),
        }
    }

    /// The fetch-all view: real, active people and unarchived groups.
    pub(super) fn data(&self) -> DirectoryData {
        let members = self
            .members
            .values()
            .filter(|m| !m.is_bot && !m.deleted)
            .map(|m| roster::model::Member {
                id: m.id.clone(),
                name: m.name.clone(),
            })
            .collect();
        let groups = self
            .groups
            .values()
            .filter(|g| !g.is_archived())
            .map(|g| roster::model::Group {
                id: g.id.clone(),
                name: g.name.clone(),
                is_private: g.is_private,
                members: g.members.clone(),
            })
            .collect();
        DirectoryData { members, groups }
    }

    fn active_group_mut(&mut self, group_id: &str) -> Result<&mut DirectoryGroup, Refusal> {
        match self.groups.get_mut(group_id) {
            Some(g) if !g.is_archived() => Ok(g),
            _ => Err(Refusal::NotFound),
        }
    }

    /// Makes the group's membership exactly `target`, except that the service
    /// account is never removed. Returns (invited, removed) counts.
    pub(super) fn set_members(
        &mut self,
        group_id: &str,
        target: &BTreeSet<String>,
    ) -> Result<(usize, usize), Refusal> {
        let service = self.service_member.clone();
        let unknown: Vec<String> = {
            let group = self
                .groups
                .get(group_id)
                .filter(|g| !g.is_archived())
                .ok_or(Refusal::NotFound)?;
            target
                .difference(&group.members)
                .filter(|id| !self.members.contains_key(id.as_str()))
                .cloned()
                .collect()
        };
        if !unknown.is_empty() {
            return Err(Refusal::BadRequest(format!(
                "user_not_found: {}",
                unknown.join(",")
            )));
        }

        let group = self.active_group_mut(group_id)?;
        if group.is_private && !group.members.contains(&service) {
            return Err(Refusal::NotInPrivateGroup);
        }

        let invite: Vec<String> = target.difference(&group.members).cloned().collect();
        let remove: Vec<String> = group
            .members
            .difference(target)
            .filter(|id| **id != service)
            .cloned()
            .collect();

        for id in &invite {
            group.members.insert(id.clone());
        }
        for id in &remove {
            group.members.remove(id);
        }
        Ok((invite.len(), remove.len()))
    }

    pub(super) fn create_group(
        &mut self,
        name: &str,
        is_private: bool,
        id: String,
        created_at: String,
    ) -> Result<DirectoryGroup, Refusal> {
        let name = name.trim().to_lowercase();
        validate_group_name(&name).map_err(|e| Refusal::BadRequest(e.to_string()))?;
        if self
            .groups
            .values()
            .any(|g| !g.is_archived() && g.name == name)
        {
            return Err(Refusal::Conflict("name_taken".to_string()));
        }
        if self.groups.contains_key(&id) {
            return Err(Refusal::Conflict("group id collision; retry".to_string()));
        }

        let group = DirectoryGroup {
            id: id.clone(),
            name,
            is_private,
            members: BTreeSet::from([self.service_member.clone()]),
            created_at: Some(created_at),
            archived_at: None,
        };
        self.groups.insert(id, group.clone());
        Ok(group)
    }

    pub(super) fn archive_group(&mut self, group_id: &str, now: String) -> Result<(), Refusal> {
        let service = self.service_member.clone();
        let Some(group) = self.groups.get_mut(group_id) else {
            return Err(Refusal::NotFound);
        };
        if group.is_archived() {
            return Err(Refusal::Conflict("already_archived".to_string()));
        }
        if group.is_private && !group.members.contains(&service) {
            return Err(Refusal::NotInPrivateGroup);
        }
        group.archived_at = Some(now);
        Ok(())
    }

    pub(super) fn register_member(&mut self, id: &str, name: &str, is_bot: bool) -> Result<(), Refusal> {
        validate_member_id(id).map_err(|e| Refusal::BadRequest(e.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Refusal::BadRequest("member name cannot be empty".to_string()));
        }
        self.members.insert(
            id.to_string(),
            DirectoryMember {
                id: id.to_string(),
                name: name.to_string(),
                is_bot,
                deleted: false,
            },
        );
        Ok(())
    }
}

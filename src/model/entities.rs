use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub is_private: bool,

    /// Member ids as last observed remotely. Ids without a matching
    /// [`Member`] are kept as-is.
    #[serde(default)]
    pub members: BTreeSet<String>,
}

impl Group {
    pub fn has_member(&self, member_id: &str) -> bool {
        self.members.contains(member_id)
    }

    pub fn label(&self) -> String {
        if self.is_private {
            format!("#{} (private)", self.name)
        } else {
            format!("#{}", self.name)
        }
    }
}

/// A freshly created group as reported by the authority (no members yet).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub is_private: bool,
}

/// Everything known about the directory at one point in time.
///
/// Snapshots are never patched; a refresh builds a new one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub members: Vec<Member>,
    pub groups: Vec<Group>,
}

impl Snapshot {
    pub fn new(mut members: Vec<Member>, mut groups: Vec<Group>) -> Self {
        members.sort_by(|a, b| by_display_name(&a.name, &a.id, &b.name, &b.id));
        groups.sort_by(|a, b| by_display_name(&a.name, &a.id, &b.name, &b.id));
        Self { members, groups }
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn contains_group(&self, id: &str) -> bool {
        self.group(id).is_some()
    }

    pub fn contains_member(&self, id: &str) -> bool {
        self.member(id).is_some()
    }

    /// Looks a group up by id, then by name (a leading `#` is ignored).
    pub fn find_group(&self, key: &str) -> Option<&Group> {
        if let Some(g) = self.group(key) {
            return Some(g);
        }
        let name = key.strip_prefix('#').unwrap_or(key);
        self.groups.iter().find(|g| g.name == name)
    }

    /// Looks a member up by id, then by display name.
    pub fn find_member(&self, key: &str) -> Option<&Member> {
        self.member(key)
            .or_else(|| self.members.iter().find(|m| m.name == key))
    }

    /// Groups the member currently belongs to.
    pub fn groups_of(&self, member_id: &str) -> BTreeSet<String> {
        self.groups
            .iter()
            .filter(|g| g.has_member(member_id))
            .map(|g| g.id.clone())
            .collect()
    }

    pub fn member_ids(&self) -> BTreeSet<String> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }

    pub fn group_ids(&self) -> BTreeSet<String> {
        self.groups.iter().map(|g| g.id.clone()).collect()
    }

    /// Display name for a member id, falling back to the id for dangling refs.
    pub fn member_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.member(id).map(|m| m.name.as_str()).unwrap_or(id)
    }
}

fn by_display_name(a_name: &str, a_id: &str, b_name: &str, b_id: &str) -> std::cmp::Ordering {
    a_name
        .to_lowercase()
        .cmp(&b_name.to_lowercase())
        .then_with(|| a_id.cmp(b_id))
}

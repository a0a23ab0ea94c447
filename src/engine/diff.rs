use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::Group;

/// Full-replace plan for one group: the authority is told the complete
/// target membership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReplacementPlan {
    pub group_id: String,
    pub target_members: BTreeSet<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipChange {
    Add,
    Remove,
}

/// One group whose membership has to change for a member-centric edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupUpdate {
    pub group_id: String,
    pub new_member_set: BTreeSet<String>,
    pub change: MembershipChange,
}

/// The checked set is authoritative; nothing is compared against `group`.
pub fn diff_for_group(group: &Group, checked_member_ids: &BTreeSet<String>) -> ReplacementPlan {
    ReplacementPlan {
        group_id: group.id.clone(),
        target_members: checked_member_ids.clone(),
    }
}

/// Emits an update only for groups where the member's presence differs from
/// what is checked. Every other member of those groups is carried over.
///
/// Checked ids that name no group in `all_groups` are ignored.
pub fn diff_for_member<'a, I>(
    member_id: &str,
    checked_group_ids: &BTreeSet<String>,
    all_groups: I,
) -> Vec<GroupUpdate>
where
    I: IntoIterator<Item = &'a Group>,
{
    all_groups
        .into_iter()
        .filter_map(|g| {
            let is_in = g.has_member(member_id);
            let wants = checked_group_ids.contains(&g.id);
            if is_in == wants {
                return None;
            }

            let mut new_member_set = g.members.clone();
            let change = if wants {
                new_member_set.insert(member_id.to_string());
                MembershipChange::Add
            } else {
                new_member_set.remove(member_id);
                MembershipChange::Remove
            };
            Some(GroupUpdate {
                group_id: g.id.clone(),
                new_member_set,
                change,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../tests/engine/diff_tests.rs"]
mod tests;

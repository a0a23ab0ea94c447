//! DTOs and payload types for the directory authority's HTTP API.

use crate::model::{Group, GroupSummary, Member, Snapshot};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DirectoryData {
    pub members: Vec<Member>,
    pub groups: Vec<Group>,
}

impl From<DirectoryData> for Snapshot {
    fn from(data: DirectoryData) -> Self {
        Snapshot::new(data.members, data.groups)
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct UpdateMembershipsRequest {
    pub group_id: String,
    pub target_member_ids: Vec<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,

    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ArchiveGroupRequest {
    pub group_id: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RegisterMemberRequest {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub is_bot: bool,
}

/// Envelope shared by every mutation endpoint.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct MutationResponse {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupSummary>,
}

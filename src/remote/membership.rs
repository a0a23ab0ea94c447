//! Directory snapshot and group membership operations.

use super::*;

#[async_trait]
impl MembershipRemote for RemoteClient {
    async fn fetch_all(&self) -> Result<Snapshot, FetchError> {
        let resp = self
            .client
            .get(self.url("/api/data"))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::Network(
                "unauthorized (token invalid or expired)".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(FetchError::Network(format!("server error: {}", status)));
        }

        let bytes = resp.bytes().await?;
        let data: DirectoryData =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(Snapshot::from(data))
    }

    async fn set_group_members(
        &self,
        group_id: &str,
        member_ids: &BTreeSet<String>,
    ) -> Result<(), UpdateError> {
        let resp = self
            .client
            .post(self.url("/api/update_memberships"))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(&UpdateMembershipsRequest {
                group_id: group_id.to_string(),
                target_member_ids: member_ids.iter().cloned().collect(),
            })
            .send()
            .await?;
        self.read_mutation(resp, "update memberships").await?;
        Ok(())
    }

    async fn create_group(
        &self,
        name: &str,
        is_private: bool,
    ) -> Result<GroupSummary, UpdateError> {
        let resp = self
            .client
            .post(self.url("/api/create_group"))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(&CreateGroupRequest {
                name: name.to_string(),
                is_private,
            })
            .send()
            .await?;
        let body = self.read_mutation(resp, "create group").await?;
        body.group.ok_or_else(|| {
            UpdateError::Transport("create group response is missing the group".to_string())
        })
    }

    async fn archive_group(&self, group_id: &str) -> Result<(), UpdateError> {
        let resp = self
            .client
            .post(self.url("/api/archive_group"))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(&ArchiveGroupRequest {
                group_id: group_id.to_string(),
            })
            .send()
            .await?;
        self.read_mutation(resp, "archive group").await?;
        Ok(())
    }
}

impl RemoteClient {
    /// Adds a person to the directory. Used to provision the development
    /// authority; not part of the reconciliation flow.
    pub async fn register_member(&self, id: &str, name: &str) -> Result<(), UpdateError> {
        let resp = self
            .client
            .post(self.url("/api/members"))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(&RegisterMemberRequest {
                id: id.to_string(),
                name: name.to_string(),
                is_bot: false,
            })
            .send()
            .await?;
        self.read_mutation(resp, "register member").await?;
        Ok(())
    }
}

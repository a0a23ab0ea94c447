use super::*;

impl RemoteClient {
    pub(super) fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.remote.base_url.trim_end_matches('/'), path)
    }

    /// Turns a mutation response into the authority's verdict.
    ///
    /// Error statuses still carry a JSON envelope, so the body is read before
    /// the status is judged.
    pub(super) async fn read_mutation(
        &self,
        resp: reqwest::Response,
        label: &str,
    ) -> Result<MutationResponse, UpdateError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(UpdateError::Unauthorized);
        }

        let bytes = resp.bytes().await?;
        let body: MutationResponse = match serde_json::from_slice(&bytes) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(UpdateError::Rejected(format!("{} failed ({})", label, status)));
            }
            Err(err) => {
                return Err(UpdateError::Transport(format!(
                    "parse {} response: {}",
                    label, err
                )));
            }
        };

        if !body.ok {
            let msg = body
                .error
                .clone()
                .unwrap_or_else(|| format!("{} failed ({})", label, status));
            return Err(UpdateError::Rejected(msg));
        }
        Ok(body)
    }
}

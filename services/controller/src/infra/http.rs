//! Reqwest-backed [`AgentCaller`].

use std::time::Duration;

use deskpool_wire::execute::{ExecuteRequest, ExecuteResponse};

use crate::domain::repository::{AgentCaller, DispatchError};

#[derive(Clone)]
pub struct HttpAgentCaller {
    client: reqwest::Client,
    token: Option<String>,
}

impl HttpAgentCaller {
    /// `timeout` is the per-call deadline; the dispatch loop counts on it
    /// to bound the total `/launch` latency.
    pub fn new(timeout: Duration, token: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, token })
    }
}

impl AgentCaller for HttpAgentCaller {
    async fn execute(
        &self,
        base_url: &str,
        request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, DispatchError> {
        let url = format!("{}/execute", base_url.trim_end_matches('/'));
        let mut builder = self.client.post(&url).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        if !status.is_success() {
            // Agent-side rejections (validation, port exhaustion) still
            // carry the error envelope; surface its message in the
            // diagnostic when present.
            let detail = serde_json::from_str::<ExecuteResponse>(&body)
                .ok()
                .and_then(|r| match r {
                    ExecuteResponse::Error { error } => Some(error),
                    ExecuteResponse::Ok { .. } => None,
                });
            return Err(DispatchError::Status {
                code: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|e| DispatchError::Decode(e.to_string()))
    }
}

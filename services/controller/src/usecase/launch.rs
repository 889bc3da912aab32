//! Dispatch with fallback: walk the ranked candidates, first success wins.
//!
//! The protocol is optimistic — two concurrent launches may pick the same
//! agent, and the runtime bind on the agent is authoritative. The
//! controller performs the only retry, and only across distinct
//! candidates; a candidate is never retried in place.

use std::time::Duration;

use tracing::{info, warn};

use deskpool_wire::execute::{ExecuteRequest, ExecuteResponse};

use crate::domain::repository::AgentCaller;
use crate::domain::types::{AgentView, LaunchOutcome};
use crate::error::ControllerError;

pub struct DispatchUseCase<C: AgentCaller> {
    pub caller: C,
    /// Spacing slept between consecutive candidate attempts.
    pub retry_delay: Duration,
}

impl<C: AgentCaller> DispatchUseCase<C> {
    pub async fn execute(
        &self,
        candidates: &[AgentView],
        request: &ExecuteRequest,
    ) -> Result<LaunchOutcome, ControllerError> {
        if candidates.is_empty() {
            return Err(ControllerError::NoCandidate);
        }

        let mut diagnostics = Vec::new();
        for candidate in candidates {
            if !diagnostics.is_empty() {
                tokio::time::sleep(self.retry_delay).await;
            }

            match self.caller.execute(&candidate.url, request).await {
                Ok(ExecuteResponse::Ok {
                    rdp_host,
                    rdp_port,
                    container_id,
                    startup_seconds,
                }) => {
                    info!(
                        agent_id = %candidate.agent_id,
                        rdp_port,
                        attempts = diagnostics.len() + 1,
                        "session placed"
                    );
                    return Ok(LaunchOutcome {
                        agent_id: candidate.agent_id.clone(),
                        rdp_host,
                        rdp_port,
                        container_id,
                        startup_seconds,
                    });
                }
                Ok(ExecuteResponse::Error { error }) => {
                    let diag = format!("{}: agent error: {error}", candidate.agent_id);
                    warn!(agent_id = %candidate.agent_id, error = %error, "candidate refused launch");
                    diagnostics.push(diag);
                }
                Err(e) => {
                    let diag = format!("{}: {e}", candidate.agent_id);
                    warn!(agent_id = %candidate.agent_id, error = %e, "candidate unreachable");
                    diagnostics.push(diag);
                }
            }
        }

        Err(ControllerError::DispatchFailed(diagnostics))
    }
}

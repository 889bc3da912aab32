//! Candidate selection and scoring, as pure functions over a fleet
//! snapshot. No I/O and no clocks here: the snapshot already carries each
//! agent's online verdict.

use deskpool_domain::capacity::CapacitySnapshot;

use crate::domain::types::AgentView;

/// Scoring weights. Free memory counts in GiB so one spare core and one
/// spare GiB are the same order of magnitude.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub cpu: f64,
    pub mem: f64,
    pub running_penalty: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            cpu: 1.0,
            mem: 0.7,
            running_penalty: 0.2,
        }
    }
}

/// Headroom score of one snapshot; higher is a better placement target.
pub fn score(capacity: &CapacitySnapshot, weights: ScoreWeights) -> f64 {
    weights.cpu * capacity.free_cpu() + weights.mem * (capacity.free_mem_mb() as f64 / 1024.0)
        - weights.running_penalty * f64::from(capacity.running_containers)
}

/// What a request demands of a candidate.
#[derive(Debug, Clone, Copy)]
pub struct Demand {
    pub cpu: u32,
    pub mem_mb: u64,
    pub gpu: bool,
}

/// Admission-filtered candidates, best first.
///
/// Ordering is total and deterministic: descending score, ties broken by
/// `agent_id` so identical fleets always produce identical orderings.
pub fn rank_candidates(
    fleet: &[AgentView],
    demand: Demand,
    weights: ScoreWeights,
) -> Vec<AgentView> {
    let mut scored: Vec<(f64, &AgentView)> = fleet
        .iter()
        .filter(|a| a.online)
        .filter(|a| !demand.gpu || a.capacity.gpu_capable)
        .filter(|a| a.capacity.free_cpu() >= f64::from(demand.cpu))
        .filter(|a| a.capacity.free_mem_mb() >= demand.mem_mb)
        .map(|a| (score(&a.capacity, weights), a))
        .collect();

    scored.sort_by(|(sa, a), (sb, b)| {
        sb.total_cmp(sa).then_with(|| a.agent_id.cmp(&b.agent_id))
    });
    scored.into_iter().map(|(_, a)| a.clone()).collect()
}

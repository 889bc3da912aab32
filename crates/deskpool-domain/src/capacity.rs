//! Live capacity snapshot of one worker host.

use serde::{Deserialize, Serialize};

/// What an agent reports about its host, either via heartbeat or `/info`.
///
/// `used_cpu` is a real number of vCPUs and may transiently exceed
/// `total_cpu` under load; free headroom clamps at zero instead of going
/// negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacitySnapshot {
    pub total_cpu: u32,
    pub used_cpu: f64,
    pub total_mem_mb: u64,
    pub used_mem_mb: u64,
    pub running_containers: u32,
    pub gpu_capable: bool,
}

impl CapacitySnapshot {
    /// Free logical cores, clamped to `[0, total_cpu]`.
    pub fn free_cpu(&self) -> f64 {
        (f64::from(self.total_cpu) - self.used_cpu.max(0.0)).max(0.0)
    }

    /// Free memory in MiB, clamped to zero.
    pub fn free_mem_mb(&self) -> u64 {
        self.total_mem_mb.saturating_sub(self.used_mem_mb)
    }

    /// Sanity bounds on a reported snapshot. Snapshots violating these are
    /// rejected at the heartbeat endpoint rather than poisoning placement.
    pub fn validate(&self) -> Result<(), CapacityError> {
        if self.total_cpu < 1 {
            return Err(CapacityError::NoCpu);
        }
        if self.total_mem_mb < 256 {
            return Err(CapacityError::TooLittleMemory(self.total_mem_mb));
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    #[error("total_cpu must be at least 1")]
    NoCpu,
    #[error("total_mem_mb must be at least 256, got {0}")]
    TooLittleMemory(u64),
}

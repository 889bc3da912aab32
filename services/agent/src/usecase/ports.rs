//! Host RDP port allocation.
//!
//! Random probing spreads sessions across the range so two agents restarted
//! at the same time do not hand out the same low ports in lockstep. The
//! chosen port is not reserved beyond the probe; the runtime bind is the
//! effective reservation, and a lost race surfaces as a launch failure the
//! controller recovers from by failing over.

use std::collections::HashSet;

use rand::RngExt;

use crate::domain::repository::PortScanner;

/// Random probes attempted before falling back to a linear scan.
pub const PROBE_ATTEMPTS: usize = 50;

/// Pick a free port in `[start, end]`, or `None` when the range is
/// exhausted.
pub async fn pick_free_port<S: PortScanner>(scanner: &S, start: u16, end: u16) -> Option<u16> {
    if start > end {
        return None;
    }

    let mut tried = HashSet::new();
    for _ in 0..PROBE_ATTEMPTS {
        let port = rand::rng().random_range(start..=end);
        if !tried.insert(port) {
            continue;
        }
        if scanner.is_free(port).await {
            return Some(port);
        }
    }

    // Random probing saturates quickly on small or crowded ranges.
    for port in start..=end {
        if tried.contains(&port) {
            continue;
        }
        if scanner.is_free(port).await {
            return Some(port);
        }
    }
    None
}

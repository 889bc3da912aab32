//! User roles and per-role admission ceilings.

use serde::{Deserialize, Serialize};

/// User permission level.
///
/// Store/wire format: lowercase string. Unknown role strings fall back to
/// `Standard` so a hand-edited user file cannot grant more than the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Standard,
    Power,
}

impl UserRole {
    pub fn parse(s: &str) -> Self {
        match s {
            "power" => Self::Power,
            _ => Self::Standard,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Power => "power",
        }
    }

    /// Static admission ceiling for this role.
    pub fn limits(self) -> RoleLimits {
        match self {
            Self::Standard => RoleLimits {
                max_cpu: 4,
                max_ram_gb: 4,
            },
            Self::Power => RoleLimits {
                max_cpu: 10,
                max_ram_gb: 32,
            },
        }
    }
}

/// Maximum resources a single launch request may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLimits {
    pub max_cpu: u32,
    pub max_ram_gb: u64,
}

impl RoleLimits {
    pub fn max_ram_mb(&self) -> u64 {
        self.max_ram_gb * 1024
    }
}

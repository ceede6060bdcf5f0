//! Shared value types: quality samples and interface status.

use serde::{Deserialize, Serialize};

/// One second of link quality measurements for a single interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Round-trip time in milliseconds.
    pub rtt_ms: f64,
    /// Observed throughput in Mbit/s.
    pub throughput_mbps: f64,
    /// Packet loss in percent (0–100).
    pub loss_pct: f64,
    /// Jitter in milliseconds.
    pub jitter_ms: f64,
}

impl Sample {
    pub fn new(rtt_ms: f64, throughput_mbps: f64, loss_pct: f64, jitter_ms: f64) -> Self {
        Sample {
            rtt_ms,
            throughput_mbps,
            loss_pct,
            jitter_ms,
        }
    }
}

/// Stable three-level interface status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Healthy,
    /// Starting point for every interface: no evidence yet, so never optimistic.
    #[default]
    Degraded,
    Down,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Healthy => write!(f, "healthy"),
            Status::Degraded => write!(f, "degraded"),
            Status::Down => write!(f, "down"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(Status::Healthy),
            "degraded" => Ok(Status::Degraded),
            "down" => Ok(Status::Down),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

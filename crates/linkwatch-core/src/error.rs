use std::path::PathBuf;

use thiserror::Error;

// ── Errors ──────────────────────────────────────────────────────────

/// Failures while loading a [`HealthConfig`](crate::config::HealthConfig).
///
/// The classification pipeline itself has no failure modes; only the
/// configuration layer can error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unsupported config version {0}")]
    UnsupportedVersion(u32),
    #[error("unknown score strategy: {0} (expected raw|smoothed)")]
    UnknownStrategy(String),
}

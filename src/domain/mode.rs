//! Run mode (TEST vs LIVE).

use serde::{Deserialize, Serialize};

/// Controls whether a batch run writes documents and snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunMode {
    /// Selects and consumes a batch without writing documents
    #[default]
    Test,

    /// Writes documents, delays between them, and snapshots the result
    Live,
}

impl RunMode {
    pub fn is_live(&self) -> bool {
        matches!(self, RunMode::Live)
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Test => write!(f, "TEST"),
            RunMode::Live => write!(f, "LIVE"),
        }
    }
}

impl std::str::FromStr for RunMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TEST" => Ok(RunMode::Test),
            "LIVE" => Ok(RunMode::Live),
            _ => anyhow::bail!("Unknown run mode: {} (expected TEST or LIVE)", s),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::result::SessionSummary;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileData {
    pub schema_version: u32,
    /// Sessions finished so far; drives the session-completion bonus.
    pub completed_sessions: u32,
    pub total_xp: u64,
    #[serde(default)]
    pub last_session_at: Option<DateTime<Utc>>,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            completed_sessions: 0,
            total_xp: 0,
            last_session_at: None,
        }
    }
}

impl ProfileData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    pub sessions: Vec<SessionSummary>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

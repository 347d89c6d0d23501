use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final aggregate handed to the session completion handler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub correct: u32,
    pub mistakes: u32,
    pub total_units: usize,
    pub elapsed_secs: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub lesson: String,
}

impl SessionSummary {
    /// Share of submitted units answered without an error, in percent.
    pub fn accuracy(&self) -> f64 {
        let answered = self.correct + self.mistakes;
        if answered == 0 {
            return 100.0;
        }
        (self.correct as f64 / answered as f64 * 100.0).clamp(0.0, 100.0)
    }
}

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::engine::scoring::{self, XpRules};
use crate::session::result::SessionSummary;
use crate::store::schema::{HistoryData, ProfileData};

const PROFILE_FILE: &str = "profile.json";
const HISTORY_FILE: &str = "history.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lingodrill");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating data dir {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                    warn!(file = name, error = %err, "unreadable store file, starting fresh");
                    T::default()
                }),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Profile with a stale schema version is replaced by a fresh one.
    pub fn load_profile(&self) -> ProfileData {
        let profile: ProfileData = self.load(PROFILE_FILE);
        if profile.needs_reset() {
            warn!(
                found = profile.schema_version,
                "profile schema mismatch, resetting"
            );
            return ProfileData::default();
        }
        profile
    }

    pub fn save_profile(&self, data: &ProfileData) -> Result<()> {
        self.save(PROFILE_FILE, data)
    }

    pub fn load_history(&self) -> HistoryData {
        self.load(HISTORY_FILE)
    }

    pub fn save_history(&self, data: &HistoryData) -> Result<()> {
        self.save(HISTORY_FILE, data)
    }

    /// Persist a finished session and return the completion bonus it earned,
    /// based on how many sessions were completed before it.
    pub fn record_session(&self, summary: &SessionSummary, rules: &XpRules) -> Result<u32> {
        let mut profile = self.load_profile();
        let bonus = scoring::session_completion_bonus(profile.completed_sessions, rules);

        profile.completed_sessions = profile.completed_sessions.saturating_add(1);
        profile.total_xp += u64::from(summary.xp) + u64::from(bonus);
        profile.last_session_at = Some(summary.timestamp);

        let mut history = self.load_history();
        history.sessions.push(summary.clone());

        self.save_history(&history)?;
        self.save_profile(&profile)?;
        Ok(bonus)
    }
}

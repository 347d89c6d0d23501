use serde::{Deserialize, Serialize};

pub const WORD_BASE_XP: u32 = 10;
pub const NO_MISTAKE_BONUS_XP: u32 = 5;
pub const NO_HELP_BONUS_XP: u32 = 5;
pub const CLOZE_BLANK_XP: u32 = 10;
pub const MATCHING_PAIR_XP: u32 = 10;
pub const SESSION_BONUS_STEP_XP: u32 = 10;
pub const SESSION_BONUS_CAP_XP: u32 = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpRules {
    #[serde(default = "default_word_base")]
    pub word_base: u32,
    #[serde(default = "default_no_mistake_bonus")]
    pub no_mistake_bonus: u32,
    #[serde(default = "default_no_help_bonus")]
    pub no_help_bonus: u32,
    #[serde(default = "default_cloze_blank")]
    pub cloze_blank: u32,
    #[serde(default = "default_matching_pair")]
    pub matching_pair: u32,
    #[serde(default = "default_session_bonus_step")]
    pub session_bonus_step: u32,
    #[serde(default = "default_session_bonus_cap")]
    pub session_bonus_cap: u32,
}

fn default_word_base() -> u32 {
    WORD_BASE_XP
}
fn default_no_mistake_bonus() -> u32 {
    NO_MISTAKE_BONUS_XP
}
fn default_no_help_bonus() -> u32 {
    NO_HELP_BONUS_XP
}
fn default_cloze_blank() -> u32 {
    CLOZE_BLANK_XP
}
fn default_matching_pair() -> u32 {
    MATCHING_PAIR_XP
}
fn default_session_bonus_step() -> u32 {
    SESSION_BONUS_STEP_XP
}
fn default_session_bonus_cap() -> u32 {
    SESSION_BONUS_CAP_XP
}

impl Default for XpRules {
    fn default() -> Self {
        Self {
            word_base: default_word_base(),
            no_mistake_bonus: default_no_mistake_bonus(),
            no_help_bonus: default_no_help_bonus(),
            cloze_blank: default_cloze_blank(),
            matching_pair: default_matching_pair(),
            session_bonus_step: default_session_bonus_step(),
            session_bonus_cap: default_session_bonus_cap(),
        }
    }
}

/// Per-word flags as they stand when the last letterable slot is filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WordOutcome {
    pub has_mistakes: bool,
    pub help_used: bool,
    pub revealed_letters: usize,
    pub letterable_letters: usize,
}

impl WordOutcome {
    pub fn fully_revealed(&self) -> bool {
        self.letterable_letters > 0 && self.revealed_letters >= self.letterable_letters
    }
}

pub fn word_reward(outcome: &WordOutcome, rules: &XpRules) -> u32 {
    if outcome.fully_revealed() {
        return 0;
    }
    let mut xp = rules.word_base;
    if !outcome.has_mistakes {
        xp += rules.no_mistake_bonus;
    }
    if !outcome.help_used {
        xp += rules.no_help_bonus;
    }
    xp
}

pub fn cloze_blank_reward(rules: &XpRules) -> u32 {
    rules.cloze_blank
}

pub fn matching_pair_reward(rules: &XpRules) -> u32 {
    rules.matching_pair
}

/// Bonus granted by the completion handler when a session ends. Grows with the
/// number of sessions the learner finished before this one.
pub fn session_completion_bonus(prior_completions: u32, rules: &XpRules) -> u32 {
    rules
        .session_bonus_step
        .saturating_mul(prior_completions.saturating_add(1))
        .min(rules.session_bonus_cap)
}

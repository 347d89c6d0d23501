use std::time::Instant;

use tracing::{debug, trace};

use crate::config::{Config, TimingConfig};
use crate::engine::compare::{CharMatch, compare_char};
use crate::engine::scoring::{self, WordOutcome, XpRules};
use crate::engine::timer::TimerQueue;
use crate::engine::tokenizer::{self, Token, is_apostrophe, is_punctuation_char};
use crate::exercise::unit::SentenceUnit;
use crate::exercise::{ExerciseEvent, XpContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotStatus {
    Empty,
    Focused,
    Correct,
    Incorrect,
    DiacriticMissing,
    Disabled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    pub target: char,
    pub letterable: bool,
    pub status: SlotStatus,
    pub typed: Option<char>,
    pub revealed: bool,
}

/// Typing progress through one word.
#[derive(Clone, Debug)]
pub struct WordProgress {
    pub word: String,
    pub slots: Vec<Slot>,
    /// Next letterable slot to fill; `None` once the word is finished.
    pub cursor: Option<usize>,
    pub has_mistakes: bool,
    pub help_used: bool,
    pub reveal_count: usize,
}

impl WordProgress {
    pub fn new(token: &Token) -> Self {
        let slots: Vec<Slot> = token
            .chars()
            .map(|ch| {
                let letterable = !is_punctuation_char(ch) && !is_apostrophe(ch);
                Slot {
                    target: ch,
                    letterable,
                    status: if letterable {
                        SlotStatus::Empty
                    } else {
                        SlotStatus::Disabled
                    },
                    typed: if letterable { None } else { Some(ch) },
                    revealed: false,
                }
            })
            .collect();

        let mut progress = Self {
            word: token.as_str().to_string(),
            slots,
            cursor: None,
            has_mistakes: false,
            help_used: false,
            reveal_count: 0,
        };
        progress.cursor = progress.next_letterable(0);
        if let Some(first) = progress.cursor {
            progress.slots[first].status = SlotStatus::Focused;
        }
        progress
    }

    fn next_letterable(&self, from: usize) -> Option<usize> {
        (from..self.slots.len()).find(|&i| self.slots[i].letterable)
    }

    fn prev_letterable(&self, before: usize) -> Option<usize> {
        (0..before).rev().find(|&i| self.slots[i].letterable)
    }

    pub fn letterable_count(&self) -> usize {
        self.slots.iter().filter(|s| s.letterable).count()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor.is_none()
    }

    pub fn outcome(&self) -> WordOutcome {
        WordOutcome {
            has_mistakes: self.has_mistakes,
            help_used: self.help_used,
            revealed_letters: self.slots.iter().filter(|s| s.revealed).count(),
            letterable_letters: self.letterable_count(),
        }
    }

    /// What has been entered so far, with `_` for unfilled letterable slots.
    pub fn display(&self) -> String {
        self.slots
            .iter()
            .map(|s| match s.status {
                SlotStatus::Empty | SlotStatus::Focused => '_',
                _ => s.typed.unwrap_or('_'),
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub enum RoundState {
    Idle,
    Active {
        word_index: usize,
        word: WordProgress,
    },
    Completed,
}

#[derive(Clone, Copy, Debug)]
enum StandardTask {
    RevertSlot {
        word_index: usize,
        slot: usize,
        typed: char,
        revision: u64,
    },
    AdvanceWord {
        word_index: usize,
    },
}

/// Letter-by-letter transcription of a sentence, one word at a time.
pub struct StandardRound {
    timing: TimingConfig,
    xp: XpRules,
    tokens: Vec<Token>,
    revealed: Vec<bool>,
    state: RoundState,
    timers: TimerQueue<StandardTask>,
    revision: u64,
}

impl StandardRound {
    pub fn new(config: &Config) -> Self {
        Self {
            timing: config.timing.clone(),
            xp: config.xp.clone(),
            tokens: Vec::new(),
            revealed: Vec::new(),
            state: RoundState::Idle,
            timers: TimerQueue::new(),
            revision: 0,
        }
    }

    pub fn initialize(&mut self, unit: &SentenceUnit, _now: Instant) -> Vec<ExerciseEvent> {
        self.timers.clear();
        self.revision = 0;
        self.tokens = tokenizer::tokenize(&unit.target);
        self.revealed = vec![false; self.tokens.len()];
        self.state = RoundState::Idle;
        debug!(tokens = self.tokens.len(), "sentence round initialized");

        let mut events = Vec::new();
        self.activate_from(0, &mut events);
        events
    }

    /// Reveal punctuation (and anything else with nothing to type) starting at
    /// `start`, then make the next typeable token active or finish the round.
    fn activate_from(&mut self, start: usize, events: &mut Vec<ExerciseEvent>) {
        let mut index = start;
        while index < self.tokens.len() {
            let word = WordProgress::new(&self.tokens[index]);
            if word.letterable_count() > 0 {
                trace!(word_index = index, word = %word.word, "word active");
                self.state = RoundState::Active {
                    word_index: index,
                    word,
                };
                return;
            }
            self.revealed[index] = true;
            index += 1;
        }

        debug!("sentence round complete");
        self.state = RoundState::Completed;
        self.timers.clear();
        events.push(ExerciseEvent::UnitComplete);
    }

    pub fn type_letter(&mut self, ch: char, now: Instant) -> Vec<ExerciseEvent> {
        let RoundState::Active { word_index, word } = &mut self.state else {
            return Vec::new();
        };
        let Some(slot_index) = word.cursor else {
            return Vec::new();
        };
        let word_index = *word_index;
        self.revision += 1;

        let slot = &mut word.slots[slot_index];
        match compare_char(ch, slot.target) {
            CharMatch::Correct => {
                slot.status = SlotStatus::Correct;
                slot.typed = Some(slot.target);
                slot.revealed = false;
                self.advance_cursor(slot_index, now)
            }
            outcome => {
                slot.status = if outcome == CharMatch::DiacriticMissing {
                    SlotStatus::DiacriticMissing
                } else {
                    SlotStatus::Incorrect
                };
                slot.typed = Some(ch);
                word.has_mistakes = true;
                trace!(word_index, slot = slot_index, typed = %ch, ?outcome, "mistake");
                self.timers.schedule(
                    now,
                    self.timing.mistake_revert(),
                    StandardTask::RevertSlot {
                        word_index,
                        slot: slot_index,
                        typed: ch,
                        revision: self.revision,
                    },
                );
                vec![ExerciseEvent::Mistake]
            }
        }
    }

    pub fn reveal_letter(&mut self, now: Instant) -> Vec<ExerciseEvent> {
        let RoundState::Active { word, .. } = &mut self.state else {
            return Vec::new();
        };
        let Some(slot_index) = word.cursor else {
            return Vec::new();
        };
        self.revision += 1;

        let slot = &mut word.slots[slot_index];
        slot.status = SlotStatus::Correct;
        slot.typed = Some(slot.target);
        slot.revealed = true;
        word.help_used = true;
        word.reveal_count += 1;
        self.advance_cursor(slot_index, now)
    }

    pub fn backspace(&mut self) {
        let RoundState::Active { word, .. } = &mut self.state else {
            return;
        };
        let Some(current) = word.cursor else {
            return;
        };
        self.revision += 1;

        match word.prev_letterable(current) {
            Some(prev) => {
                let slot = &mut word.slots[current];
                slot.status = SlotStatus::Empty;
                slot.typed = None;
                let slot = &mut word.slots[prev];
                slot.status = SlotStatus::Focused;
                slot.typed = None;
                slot.revealed = false;
                word.cursor = Some(prev);
            }
            None => {
                let slot = &mut word.slots[current];
                slot.status = SlotStatus::Focused;
                slot.typed = None;
            }
        }
    }

    /// Move past a freshly filled slot. Finishing the last slot scores the word
    /// and schedules the move to the next token.
    fn advance_cursor(&mut self, filled: usize, now: Instant) -> Vec<ExerciseEvent> {
        let RoundState::Active { word_index, word } = &mut self.state else {
            return Vec::new();
        };

        word.cursor = word.next_letterable(filled + 1);
        if let Some(next) = word.cursor {
            let slot = &mut word.slots[next];
            slot.status = SlotStatus::Focused;
            slot.typed = None;
            return Vec::new();
        }

        let outcome = word.outcome();
        let amount = scoring::word_reward(&outcome, &self.xp);
        debug!(word_index = *word_index, word = %word.word, amount, ?outcome, "word complete");
        self.timers.schedule(
            now,
            self.timing.word_advance(),
            StandardTask::AdvanceWord {
                word_index: *word_index,
            },
        );
        vec![ExerciseEvent::xp(
            amount,
            XpContext::Word {
                word_index: *word_index,
                word: word.word.clone(),
            },
        )]
    }

    pub fn tick(&mut self, now: Instant) -> Vec<ExerciseEvent> {
        let mut events = Vec::new();
        for task in self.timers.take_due(now) {
            match task {
                StandardTask::RevertSlot {
                    word_index,
                    slot,
                    typed,
                    revision,
                } => self.revert_slot(word_index, slot, typed, revision),
                StandardTask::AdvanceWord { word_index } => {
                    let finished = matches!(
                        &self.state,
                        RoundState::Active { word_index: active, word }
                            if *active == word_index && word.is_finished()
                    );
                    if finished {
                        self.revealed[word_index] = true;
                        self.activate_from(word_index + 1, &mut events);
                    }
                }
            }
        }
        events
    }

    fn revert_slot(&mut self, word_index: usize, slot_index: usize, typed: char, revision: u64) {
        let RoundState::Active {
            word_index: active,
            word,
        } = &mut self.state
        else {
            return;
        };
        if *active != word_index || word.cursor != Some(slot_index) || self.revision != revision {
            trace!(word_index, slot = slot_index, "stale revert skipped");
            return;
        }
        let slot = &mut word.slots[slot_index];
        let still_wrong = matches!(
            slot.status,
            SlotStatus::Incorrect | SlotStatus::DiacriticMissing
        );
        if still_wrong && slot.typed == Some(typed) {
            slot.status = SlotStatus::Focused;
            slot.typed = None;
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn revealed(&self) -> &[bool] {
        &self.revealed
    }

    pub fn current_word(&self) -> Option<&WordProgress> {
        match &self.state {
            RoundState::Active { word, .. } => Some(word),
            _ => None,
        }
    }

    pub fn current_word_index(&self) -> Option<usize> {
        match &self.state {
            RoundState::Active { word_index, .. } => Some(*word_index),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, RoundState::Completed)
    }

    /// True when every token is either revealed or punctuation.
    pub fn sentence_complete(&self) -> bool {
        self.tokens
            .iter()
            .zip(&self.revealed)
            .all(|(token, &revealed)| revealed || token.is_punctuation())
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_due()
    }
}

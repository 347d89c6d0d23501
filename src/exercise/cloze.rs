use std::time::Instant;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, trace, warn};

use crate::config::{Config, TimingConfig};
use crate::engine::scoring::{self, XpRules};
use crate::engine::timer::TimerQueue;
use crate::exercise::unit::{ClozeUnit, UnitError};
use crate::exercise::{ExerciseEvent, XpContext};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedSegment {
    Text(String),
    Blank(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedCloze {
    pub segments: Vec<ParsedSegment>,
}

impl ParsedCloze {
    pub fn answers(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            ParsedSegment::Blank(answer) => Some(answer.as_str()),
            ParsedSegment::Text(_) => None,
        })
    }
}

/// Split literal text into alternating runs of whitespace and non-whitespace,
/// so the pieces concatenate back to the input.
fn split_literal(text: &str, out: &mut Vec<ParsedSegment>) {
    let mut run = String::new();
    let mut run_is_space = false;
    for ch in text.chars() {
        if !run.is_empty() && ch.is_whitespace() != run_is_space {
            out.push(ParsedSegment::Text(std::mem::take(&mut run)));
        }
        run_is_space = ch.is_whitespace();
        run.push(ch);
    }
    if !run.is_empty() {
        out.push(ParsedSegment::Text(run));
    }
}

/// Parse `[answer]` blanks out of cloze text. Error positions are byte offsets.
pub fn parse_cloze(text: &str) -> Result<ParsedCloze, UnitError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut answer = String::new();
    let mut open: Option<usize> = None;

    for (pos, ch) in text.char_indices() {
        match (ch, open) {
            ('[', Some(_)) => return Err(UnitError::NestedBracket(pos)),
            ('[', None) => {
                split_literal(&literal, &mut segments);
                literal.clear();
                open = Some(pos);
            }
            (']', None) => return Err(UnitError::UnexpectedClosingBracket(pos)),
            (']', Some(start)) => {
                let trimmed = answer.trim();
                if trimmed.is_empty() {
                    return Err(UnitError::EmptyBlank(start));
                }
                segments.push(ParsedSegment::Blank(trimmed.to_string()));
                answer.clear();
                open = None;
            }
            (_, Some(_)) => answer.push(ch),
            (_, None) => literal.push(ch),
        }
    }

    if let Some(start) = open {
        return Err(UnitError::UnterminatedBracket(start));
    }
    split_literal(&literal, &mut segments);
    Ok(ParsedCloze { segments })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Blank(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlankCorrectness {
    Unknown,
    Correct,
    /// Shown briefly after a distractor is picked, then cleared.
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blank {
    pub id: usize,
    pub answer: String,
    pub user_answer: Option<String>,
    pub correctness: BlankCorrectness,
    rewarded: bool,
}

impl Blank {
    pub fn is_filled(&self) -> bool {
        self.user_answer.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClozeState {
    Idle,
    Active { blank: usize },
    /// Every blank is filled; completion is scheduled and blanks are locked.
    Finishing,
    Completed,
}

#[derive(Clone, Copy, Debug)]
enum ClozeTask {
    ClearRejection { blank: usize, revision: u64 },
    Complete,
}

pub struct ClozeRound {
    timing: TimingConfig,
    xp: XpRules,
    segments: Vec<Segment>,
    blanks: Vec<Blank>,
    options: Vec<String>,
    rejected: Option<String>,
    state: ClozeState,
    timers: TimerQueue<ClozeTask>,
    revision: u64,
}

impl ClozeRound {
    pub fn new(config: &Config) -> Self {
        Self {
            timing: config.timing.clone(),
            xp: config.xp.clone(),
            segments: Vec::new(),
            blanks: Vec::new(),
            options: Vec::new(),
            rejected: None,
            state: ClozeState::Idle,
            timers: TimerQueue::new(),
            revision: 0,
        }
    }

    pub fn initialize<R: Rng + ?Sized>(
        &mut self,
        unit: &ClozeUnit,
        rng: &mut R,
        _now: Instant,
    ) -> Vec<ExerciseEvent> {
        self.timers.clear();
        self.revision = 0;
        self.rejected = None;
        self.segments.clear();
        self.blanks.clear();
        self.options.clear();

        match parse_cloze(&unit.text) {
            Ok(parsed) => {
                for segment in parsed.segments {
                    match segment {
                        ParsedSegment::Text(text) => self.segments.push(Segment::Text(text)),
                        ParsedSegment::Blank(answer) => {
                            let id = self.blanks.len();
                            self.options.push(answer.clone());
                            self.blanks.push(Blank {
                                id,
                                answer,
                                user_answer: None,
                                correctness: BlankCorrectness::Unknown,
                                rewarded: false,
                            });
                            self.segments.push(Segment::Blank(id));
                        }
                    }
                }
                self.options.extend(unit.distractors.iter().cloned());
                self.options.shuffle(rng);
            }
            Err(err) => {
                warn!(error = %err, "malformed cloze text, showing it without blanks");
                self.segments.push(Segment::Text(unit.text.clone()));
            }
        }

        debug!(
            blanks = self.blanks.len(),
            options = self.options.len(),
            "cloze round initialized"
        );
        match self.first_unfilled() {
            Some(blank) => {
                self.state = ClozeState::Active { blank };
                Vec::new()
            }
            None => {
                self.state = ClozeState::Completed;
                vec![ExerciseEvent::UnitComplete]
            }
        }
    }

    fn first_unfilled(&self) -> Option<usize> {
        self.blanks.iter().position(|b| !b.is_filled())
    }

    /// Whether the option instance at `index` in the pool is spoken for.
    ///
    /// Equal strings are told apart by pool order: the k-th instance of a
    /// value is used once at least k blanks hold that value.
    pub fn is_option_used(&self, index: usize) -> bool {
        let Some(value) = self.options.get(index) else {
            return true;
        };
        let filled = self
            .blanks
            .iter()
            .filter(|b| b.user_answer.as_deref() == Some(value.as_str()))
            .count();
        let rank = self.options[..=index]
            .iter()
            .filter(|o| *o == value)
            .count();
        filled >= rank
    }

    fn is_option_available(&self, word: &str) -> bool {
        self.options
            .iter()
            .enumerate()
            .any(|(i, o)| o == word && !self.is_option_used(i))
    }

    pub fn select_option(&mut self, word: &str, now: Instant) -> Vec<ExerciseEvent> {
        let ClozeState::Active { blank } = self.state else {
            return Vec::new();
        };
        if !self.is_option_available(word) {
            return Vec::new();
        }
        self.revision += 1;

        if self.blanks[blank].answer != word {
            trace!(blank, option = word, "distractor picked");
            self.blanks[blank].correctness = BlankCorrectness::Incorrect;
            self.rejected = Some(word.to_string());
            self.timers.schedule(
                now,
                self.timing.option_flash(),
                ClozeTask::ClearRejection {
                    blank,
                    revision: self.revision,
                },
            );
            return vec![ExerciseEvent::OptionRejected {
                option: word.to_string(),
            }];
        }

        self.rejected = None;
        let filled = &mut self.blanks[blank];
        filled.user_answer = Some(word.to_string());
        filled.correctness = BlankCorrectness::Correct;

        let mut events = Vec::new();
        if !filled.rewarded {
            filled.rewarded = true;
            events.push(ExerciseEvent::xp(
                scoring::cloze_blank_reward(&self.xp),
                XpContext::Blank { blank_id: blank },
            ));
        }
        debug!(blank, answer = word, "blank filled");

        match self.first_unfilled() {
            Some(next) => self.state = ClozeState::Active { blank: next },
            None => {
                self.state = ClozeState::Finishing;
                self.timers
                    .schedule(now, self.timing.round_complete(), ClozeTask::Complete);
            }
        }
        events
    }

    /// Empty a filled blank so its word returns to the pool. Refilling it does
    /// not pay out again.
    pub fn deselect_blank(&mut self, blank_id: usize) {
        if !matches!(self.state, ClozeState::Active { .. }) {
            return;
        }
        let Some(blank) = self.blanks.get_mut(blank_id) else {
            return;
        };
        if blank.user_answer.take().is_none() {
            return;
        }
        blank.correctness = BlankCorrectness::Unknown;
        self.revision += 1;
        self.rejected = None;
        for b in &mut self.blanks {
            if b.correctness == BlankCorrectness::Incorrect {
                b.correctness = BlankCorrectness::Unknown;
            }
        }
        if let Some(next) = self.first_unfilled() {
            self.state = ClozeState::Active { blank: next };
        }
        trace!(blank_id, "blank cleared");
    }

    pub fn tick(&mut self, now: Instant) -> Vec<ExerciseEvent> {
        let mut events = Vec::new();
        for task in self.timers.take_due(now) {
            match task {
                ClozeTask::ClearRejection { blank, revision } => {
                    if revision != self.revision {
                        continue;
                    }
                    self.rejected = None;
                    if let Some(b) = self.blanks.get_mut(blank) {
                        if b.correctness == BlankCorrectness::Incorrect {
                            b.correctness = BlankCorrectness::Unknown;
                        }
                    }
                }
                ClozeTask::Complete => {
                    if self.state == ClozeState::Finishing {
                        debug!("cloze round complete");
                        self.state = ClozeState::Completed;
                        events.push(ExerciseEvent::UnitComplete);
                    }
                }
            }
        }
        events
    }

    pub fn state(&self) -> ClozeState {
        self.state
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn blanks(&self) -> &[Blank] {
        &self.blanks
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn active_blank(&self) -> Option<&Blank> {
        match self.state {
            ClozeState::Active { blank } => self.blanks.get(blank),
            _ => None,
        }
    }

    pub fn rejected_option(&self) -> Option<&str> {
        self.rejected.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.state == ClozeState::Completed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_due()
    }

    /// Text with blanks shown as `[answer]` when filled and `[___]` otherwise.
    pub fn rendered(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.clone(),
                Segment::Blank(id) => match &self.blanks[*id].user_answer {
                    Some(answer) => format!("[{answer}]"),
                    None => "[___]".to_string(),
                },
            })
            .collect()
    }
}

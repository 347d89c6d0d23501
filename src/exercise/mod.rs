pub mod cloze;
pub mod matching;
pub mod standard;
pub mod unit;

use std::time::Instant;

use rand::Rng;

use crate::config::Config;
use crate::exercise::cloze::ClozeRound;
use crate::exercise::matching::{CardId, MatchingRound};
use crate::exercise::standard::StandardRound;
use crate::exercise::unit::{Unit, UnitKind};

/// Opaque position of the interaction that earned a reward. The engine only
/// carries it through to the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OriginHint {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XpContext {
    Word { word_index: usize, word: String },
    Blank { blank_id: usize },
    Pair { pair_id: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct XpAward {
    pub amount: u32,
    pub context: XpContext,
    pub origin: Option<OriginHint>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExerciseEvent {
    Xp(XpAward),
    Mistake,
    OptionRejected { option: String },
    Mismatch { source: CardId, target: CardId },
    UnitComplete,
}

impl ExerciseEvent {
    pub(crate) fn xp(amount: u32, context: XpContext) -> Self {
        ExerciseEvent::Xp(XpAward {
            amount,
            context,
            origin: None,
        })
    }

    /// Anything the learner got wrong within the unit.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ExerciseEvent::Mistake
                | ExerciseEvent::OptionRejected { .. }
                | ExerciseEvent::Mismatch { .. }
        )
    }
}

/// Callback side of the event stream. Every method defaults to doing nothing,
/// so a listener only implements what it reacts to.
pub trait ExerciseListener {
    fn on_xp(&mut self, _award: &XpAward) {}
    fn on_mistake(&mut self) {}
    fn on_option_rejected(&mut self, _option: &str) {}
    fn on_mismatch(&mut self, _source: CardId, _target: CardId) {}
    fn on_unit_complete(&mut self) {}
}

pub fn dispatch<L: ExerciseListener + ?Sized>(events: &[ExerciseEvent], listener: &mut L) {
    for event in events {
        match event {
            ExerciseEvent::Xp(award) => listener.on_xp(award),
            ExerciseEvent::Mistake => listener.on_mistake(),
            ExerciseEvent::OptionRejected { option } => listener.on_option_rejected(option),
            ExerciseEvent::Mismatch { source, target } => listener.on_mismatch(*source, *target),
            ExerciseEvent::UnitComplete => listener.on_unit_complete(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExerciseInput {
    Letter(char),
    Backspace,
    RevealLetter,
    SelectOption(String),
    DeselectBlank(usize),
    SelectCard(CardId),
}

/// The state machine for the unit currently on screen, chosen by unit kind.
pub enum ActiveExercise {
    Standard(StandardRound),
    Cloze(ClozeRound),
    Matching(MatchingRound),
}

impl ActiveExercise {
    /// Build the matching state machine for `unit` and initialize it. The
    /// returned events may already contain `UnitComplete` for empty units.
    pub fn start<R: Rng + ?Sized>(
        unit: &Unit,
        config: &Config,
        rng: &mut R,
        now: Instant,
    ) -> (Self, Vec<ExerciseEvent>) {
        match unit {
            Unit::Sentence(sentence) => {
                let mut round = StandardRound::new(config);
                let events = round.initialize(sentence, now);
                (ActiveExercise::Standard(round), events)
            }
            Unit::Cloze(cloze) => {
                let mut round = ClozeRound::new(config);
                let events = round.initialize(cloze, rng, now);
                (ActiveExercise::Cloze(round), events)
            }
            Unit::Matching(matching) => {
                let mut round = MatchingRound::new(config);
                let events = round.initialize(matching, rng, now);
                (ActiveExercise::Matching(round), events)
            }
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            ActiveExercise::Standard(_) => UnitKind::Sentence,
            ActiveExercise::Cloze(_) => UnitKind::Cloze,
            ActiveExercise::Matching(_) => UnitKind::Matching,
        }
    }

    /// Route one input to the state machine. Inputs that do not belong to the
    /// active kind are ignored.
    pub fn apply(
        &mut self,
        input: ExerciseInput,
        origin: Option<OriginHint>,
        now: Instant,
    ) -> Vec<ExerciseEvent> {
        let mut events = match (self, input) {
            (ActiveExercise::Standard(round), ExerciseInput::Letter(ch)) => {
                round.type_letter(ch, now)
            }
            (ActiveExercise::Standard(round), ExerciseInput::Backspace) => {
                round.backspace();
                Vec::new()
            }
            (ActiveExercise::Standard(round), ExerciseInput::RevealLetter) => {
                round.reveal_letter(now)
            }
            (ActiveExercise::Cloze(round), ExerciseInput::SelectOption(word)) => {
                round.select_option(&word, now)
            }
            (ActiveExercise::Cloze(round), ExerciseInput::DeselectBlank(blank_id)) => {
                round.deselect_blank(blank_id);
                Vec::new()
            }
            (ActiveExercise::Matching(round), ExerciseInput::SelectCard(card)) => {
                round.select_card(card, now)
            }
            _ => Vec::new(),
        };

        if origin.is_some() {
            for event in &mut events {
                if let ExerciseEvent::Xp(award) = event {
                    award.origin = origin;
                }
            }
        }
        events
    }

    pub fn tick(&mut self, now: Instant) -> Vec<ExerciseEvent> {
        match self {
            ActiveExercise::Standard(round) => round.tick(now),
            ActiveExercise::Cloze(round) => round.tick(now),
            ActiveExercise::Matching(round) => round.tick(now),
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            ActiveExercise::Standard(round) => round.is_complete(),
            ActiveExercise::Cloze(round) => round.is_complete(),
            ActiveExercise::Matching(round) => round.is_complete(),
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self {
            ActiveExercise::Standard(round) => round.next_deadline(),
            ActiveExercise::Cloze(round) => round.next_deadline(),
            ActiveExercise::Matching(round) => round.next_deadline(),
        }
    }
}

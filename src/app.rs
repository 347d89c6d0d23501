use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, error};

use lingodrill::config::Config;
use lingodrill::exercise::cloze::{BlankCorrectness, ClozeRound};
use lingodrill::exercise::matching::{CardId, MatchingRound};
use lingodrill::exercise::unit::Lesson;
use lingodrill::exercise::{
    ActiveExercise, ExerciseEvent, ExerciseInput, ExerciseListener, OriginHint, XpAward,
    XpContext, dispatch,
};
use lingodrill::session::runner::SessionRunner;
use lingodrill::store::json_store::JsonStore;

use crate::ui::theme::Theme;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feedback {
    Xp(u32),
    Mistake,
    Rejected(String),
    Mismatch,
    UnitDone,
}

pub struct App {
    pub runner: SessionRunner,
    pub theme: Theme,
    pub store: Option<JsonStore>,
    pub feedback: Option<Feedback>,
    /// Completion bonus credited for the last finished session.
    pub session_bonus: Option<u32>,
    pub lifetime_xp: u64,
    pub should_quit: bool,
    recorded: bool,
}

impl App {
    pub fn new(lesson: Lesson, config: Config, store: Option<JsonStore>, now: Instant) -> Self {
        let lifetime_xp = store.as_ref().map_or(0, |s| s.load_profile().total_xp);
        let mut app = Self {
            runner: SessionRunner::from_lesson(lesson, config, now),
            theme: Theme::load(),
            store,
            feedback: None,
            session_bonus: None,
            lifetime_xp,
            should_quit: false,
            recorded: false,
        };
        let events = app.runner.start(now);
        app.absorb(&events);
        app
    }

    pub fn tick(&mut self, now: Instant) {
        let events = self.runner.tick(now);
        self.absorb(&events);
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            self.should_quit = true;
            return;
        }

        if self.runner.is_complete() {
            if key.code == KeyCode::Char('r') {
                self.restart(now);
            }
            return;
        }

        let Some((input, origin)) = self.runner.exercise().and_then(|ex| map_key(ex, key)) else {
            return;
        };
        let events = self.runner.apply(input, origin, now);
        self.absorb(&events);
    }

    fn restart(&mut self, now: Instant) {
        self.recorded = false;
        self.session_bonus = None;
        self.feedback = None;
        let events = self.runner.restart(now);
        self.absorb(&events);
    }

    fn absorb(&mut self, events: &[ExerciseEvent]) {
        dispatch(events, self);
        if self.runner.is_complete() && !self.recorded {
            self.recorded = true;
            self.record_session();
        }
    }

    fn record_session(&mut self) {
        let (Some(store), Some(summary)) = (self.store.as_ref(), self.runner.summary()) else {
            return;
        };
        match store.record_session(summary, &self.runner.config().xp) {
            Ok(bonus) => {
                self.session_bonus = Some(bonus);
                self.lifetime_xp = store.load_profile().total_xp;
            }
            Err(err) => error!(error = %err, "failed to save session"),
        }
    }
}

impl ExerciseListener for App {
    fn on_xp(&mut self, award: &XpAward) {
        self.feedback = Some(Feedback::Xp(award.amount));
        if let XpContext::Word { word, .. } = &award.context {
            tracing::trace!(word = word.as_str(), amount = award.amount, "xp");
        }
    }

    fn on_mistake(&mut self) {
        self.feedback = Some(Feedback::Mistake);
    }

    fn on_option_rejected(&mut self, option: &str) {
        self.feedback = Some(Feedback::Rejected(option.to_string()));
    }

    fn on_mismatch(&mut self, _source: CardId, _target: CardId) {
        self.feedback = Some(Feedback::Mismatch);
    }

    fn on_unit_complete(&mut self) {
        self.feedback = Some(Feedback::UnitDone);
    }
}

fn map_key(
    exercise: &ActiveExercise,
    key: KeyEvent,
) -> Option<(ExerciseInput, Option<OriginHint>)> {
    match exercise {
        ActiveExercise::Standard(_) => match key.code {
            KeyCode::Backspace => Some((ExerciseInput::Backspace, None)),
            KeyCode::Tab => Some((ExerciseInput::RevealLetter, None)),
            KeyCode::Char(ch) if !ch.is_whitespace() => Some((ExerciseInput::Letter(ch), None)),
            _ => None,
        },
        ActiveExercise::Cloze(round) => match key.code {
            KeyCode::Backspace => {
                last_filled_blank(round).map(|id| (ExerciseInput::DeselectBlank(id), None))
            }
            KeyCode::Char(ch) => {
                let index = digit_index(ch)?;
                let option = round.options().get(index)?;
                let origin = OriginHint {
                    x: index as f32,
                    y: 0.0,
                };
                Some((ExerciseInput::SelectOption(option.clone()), Some(origin)))
            }
            _ => None,
        },
        ActiveExercise::Matching(round) => {
            let KeyCode::Char(ch) = key.code else {
                return None;
            };
            let (card, origin) = matching_card(round, ch)?;
            Some((ExerciseInput::SelectCard(card), Some(origin)))
        }
    }
}

/// `1`..`9` select the first nine entries.
pub fn digit_index(ch: char) -> Option<usize> {
    match ch.to_digit(10)? {
        0 => None,
        d => Some(d as usize - 1),
    }
}

/// `a`..`z` select target cards top to bottom.
pub fn letter_index(ch: char) -> Option<usize> {
    ch.is_ascii_lowercase().then(|| (ch as u8 - b'a') as usize)
}

fn last_filled_blank(round: &ClozeRound) -> Option<usize> {
    round
        .blanks()
        .iter()
        .rev()
        .find(|b| b.is_filled() && b.correctness == BlankCorrectness::Correct)
        .map(|b| b.id)
}

fn matching_card(round: &MatchingRound, ch: char) -> Option<(CardId, OriginHint)> {
    if let Some(row) = digit_index(ch) {
        let card = round.sources().get(row)?;
        return Some((card.id, OriginHint { x: 0.0, y: row as f32 }));
    }
    if let Some(row) = letter_index(ch) {
        let card = round.targets().get(row)?;
        return Some((card.id, OriginHint { x: 1.0, y: row as f32 }));
    }
    debug!(key = %ch, "no card bound to key");
    None
}

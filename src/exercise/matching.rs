use std::time::Instant;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use crate::config::{Config, TimingConfig};
use crate::engine::scoring::{self, XpRules};
use crate::engine::timer::TimerQueue;
use crate::exercise::unit::MatchingUnit;
use crate::exercise::{ExerciseEvent, XpContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub text: String,
    pub pair_id: usize,
    pub side: Side,
    pub matched: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchingState {
    Idle,
    Active,
    Finishing,
    Completed,
}

#[derive(Clone, Copy, Debug)]
enum MatchingTask {
    ClearMismatch { revision: u64 },
    Complete,
}

/// Two shuffled columns of cards; a source and a target with the same pair id
/// belong together.
pub struct MatchingRound {
    timing: TimingConfig,
    xp: XpRules,
    sources: Vec<Card>,
    targets: Vec<Card>,
    selected_source: Option<CardId>,
    selected_target: Option<CardId>,
    mismatch: Option<(CardId, CardId)>,
    state: MatchingState,
    timers: TimerQueue<MatchingTask>,
    revision: u64,
}

impl MatchingRound {
    pub fn new(config: &Config) -> Self {
        Self {
            timing: config.timing.clone(),
            xp: config.xp.clone(),
            sources: Vec::new(),
            targets: Vec::new(),
            selected_source: None,
            selected_target: None,
            mismatch: None,
            state: MatchingState::Idle,
            timers: TimerQueue::new(),
            revision: 0,
        }
    }

    pub fn initialize<R: Rng + ?Sized>(
        &mut self,
        unit: &MatchingUnit,
        rng: &mut R,
        _now: Instant,
    ) -> Vec<ExerciseEvent> {
        self.timers.clear();
        self.revision = 0;
        self.selected_source = None;
        self.selected_target = None;
        self.mismatch = None;

        self.sources = unit
            .pairs
            .iter()
            .enumerate()
            .map(|(pair_id, pair)| Card {
                id: CardId(pair_id * 2),
                text: pair.source.clone(),
                pair_id,
                side: Side::Source,
                matched: false,
            })
            .collect();
        self.targets = unit
            .pairs
            .iter()
            .enumerate()
            .map(|(pair_id, pair)| Card {
                id: CardId(pair_id * 2 + 1),
                text: pair.target.clone(),
                pair_id,
                side: Side::Target,
                matched: false,
            })
            .collect();
        self.sources.shuffle(rng);
        self.targets.shuffle(rng);
        debug!(pairs = unit.pairs.len(), "matching round initialized");

        if self.sources.is_empty() {
            self.state = MatchingState::Completed;
            return vec![ExerciseEvent::UnitComplete];
        }
        self.state = MatchingState::Active;
        Vec::new()
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.sources
            .iter()
            .chain(self.targets.iter())
            .find(|c| c.id == id)
    }

    fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.sources
            .iter_mut()
            .chain(self.targets.iter_mut())
            .find(|c| c.id == id)
    }

    pub fn select_card(&mut self, id: CardId, now: Instant) -> Vec<ExerciseEvent> {
        if self.state != MatchingState::Active || self.mismatch.is_some() {
            return Vec::new();
        }
        let Some(card) = self.card(id) else {
            return Vec::new();
        };
        if card.matched {
            return Vec::new();
        }
        let side = card.side;

        let selection = match side {
            Side::Source => &mut self.selected_source,
            Side::Target => &mut self.selected_target,
        };
        *selection = if *selection == Some(id) {
            None
        } else {
            Some(id)
        };

        match (self.selected_source, self.selected_target) {
            (Some(source), Some(target)) => self.resolve(source, target, now),
            _ => Vec::new(),
        }
    }

    fn resolve(&mut self, source: CardId, target: CardId, now: Instant) -> Vec<ExerciseEvent> {
        let source_pair = self.card(source).map(|c| c.pair_id);
        let target_pair = self.card(target).map(|c| c.pair_id);

        match (source_pair, target_pair) {
            (Some(pair_id), Some(other)) if pair_id == other => {
                for id in [source, target] {
                    if let Some(card) = self.card_mut(id) {
                        card.matched = true;
                    }
                }
                self.selected_source = None;
                self.selected_target = None;
                debug!(pair_id, "pair matched");

                if self.sources.iter().all(|c| c.matched) {
                    self.state = MatchingState::Finishing;
                    self.timers
                        .schedule(now, self.timing.round_complete(), MatchingTask::Complete);
                }
                vec![ExerciseEvent::xp(
                    scoring::matching_pair_reward(&self.xp),
                    XpContext::Pair { pair_id },
                )]
            }
            _ => {
                trace!(?source, ?target, "mismatch");
                self.revision += 1;
                self.mismatch = Some((source, target));
                self.timers.schedule(
                    now,
                    self.timing.mismatch(),
                    MatchingTask::ClearMismatch {
                        revision: self.revision,
                    },
                );
                vec![ExerciseEvent::Mismatch { source, target }]
            }
        }
    }

    pub fn tick(&mut self, now: Instant) -> Vec<ExerciseEvent> {
        let mut events = Vec::new();
        for task in self.timers.take_due(now) {
            match task {
                MatchingTask::ClearMismatch { revision } => {
                    if revision == self.revision && self.mismatch.is_some() {
                        self.mismatch = None;
                        self.selected_source = None;
                        self.selected_target = None;
                    }
                }
                MatchingTask::Complete => {
                    if self.state == MatchingState::Finishing {
                        debug!("matching round complete");
                        self.state = MatchingState::Completed;
                        events.push(ExerciseEvent::UnitComplete);
                    }
                }
            }
        }
        events
    }

    pub fn state(&self) -> MatchingState {
        self.state
    }

    pub fn sources(&self) -> &[Card] {
        &self.sources
    }

    pub fn targets(&self) -> &[Card] {
        &self.targets
    }

    pub fn selected_source(&self) -> Option<CardId> {
        self.selected_source
    }

    pub fn selected_target(&self) -> Option<CardId> {
        self.selected_target
    }

    pub fn mismatch(&self) -> Option<(CardId, CardId)> {
        self.mismatch
    }

    pub fn matched_pairs(&self) -> usize {
        self.sources.iter().filter(|c| c.matched).count()
    }

    pub fn is_complete(&self) -> bool {
        self.state == MatchingState::Completed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_due()
    }
}

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::config::Config;
use crate::engine::timer::TimerQueue;
use crate::exercise::unit::{Lesson, Unit};
use crate::exercise::{ActiveExercise, ExerciseEvent, ExerciseInput, OriginHint};
use crate::session::controller::{CompletionHandler, SessionController, SessionStep};
use crate::session::result::SessionSummary;

#[derive(Clone, Copy, Debug)]
enum RunnerTask {
    AdvanceUnit { unit_index: usize },
}

/// Plays a whole session: one state machine per unit, in order, feeding the
/// controller as units finish.
pub struct SessionRunner {
    config: Config,
    controller: SessionController,
    exercise: Option<ActiveExercise>,
    timers: TimerQueue<RunnerTask>,
    rng: SmallRng,
    unit_had_error: bool,
    unit_resolved: bool,
    summary: Option<SessionSummary>,
}

impl SessionRunner {
    pub fn new(units: Vec<Unit>, config: Config, now: Instant) -> Self {
        Self::with_controller(SessionController::new(units, now), config)
    }

    pub fn from_lesson(lesson: Lesson, config: Config, now: Instant) -> Self {
        let controller = SessionController::new(lesson.units, now).with_lesson(&lesson.title);
        Self::with_controller(controller, config)
    }

    fn with_controller(controller: SessionController, config: Config) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            config,
            controller,
            exercise: None,
            timers: TimerQueue::new(),
            rng,
            unit_had_error: false,
            unit_resolved: false,
            summary: None,
        }
    }

    pub fn set_completion_handler(&mut self, handler: CompletionHandler) {
        self.controller.set_completion_handler(handler);
    }

    /// Initialize the first unit. An empty session completes right away.
    pub fn start(&mut self, now: Instant) -> Vec<ExerciseEvent> {
        if self.controller.units().is_empty() {
            self.finish(now);
            return Vec::new();
        }
        self.start_unit(self.controller.index(), now)
    }

    fn start_unit(&mut self, index: usize, now: Instant) -> Vec<ExerciseEvent> {
        let Some(unit) = self.controller.units().get(index).cloned() else {
            return Vec::new();
        };
        debug!(index, kind = unit.kind().as_str(), "starting unit");
        let (exercise, events) = ActiveExercise::start(&unit, &self.config, &mut self.rng, now);
        self.exercise = Some(exercise);
        self.unit_had_error = false;
        self.unit_resolved = false;
        self.absorb(&events, now);
        events
    }

    pub fn apply(
        &mut self,
        input: ExerciseInput,
        origin: Option<OriginHint>,
        now: Instant,
    ) -> Vec<ExerciseEvent> {
        if self.summary.is_some() {
            return Vec::new();
        }
        let Some(exercise) = self.exercise.as_mut() else {
            return Vec::new();
        };
        let events = exercise.apply(input, origin, now);
        self.absorb(&events, now);
        events
    }

    pub fn tick(&mut self, now: Instant) -> Vec<ExerciseEvent> {
        let mut events = match self.exercise.as_mut() {
            Some(exercise) => exercise.tick(now),
            None => Vec::new(),
        };
        self.absorb(&events, now);

        loop {
            let due = self.timers.take_due(now);
            if due.is_empty() {
                break;
            }
            for task in due {
                match task {
                    RunnerTask::AdvanceUnit { unit_index } => {
                        events.extend(self.advance_unit(unit_index, now));
                    }
                }
            }
        }
        events
    }

    fn advance_unit(&mut self, unit_index: usize, now: Instant) -> Vec<ExerciseEvent> {
        if self.controller.index() != unit_index || self.controller.is_complete() {
            return Vec::new();
        }
        match self.controller.next(now) {
            SessionStep::Advanced(index) => self.start_unit(index, now),
            SessionStep::Completed(summary) => {
                self.summary = Some(summary);
                Vec::new()
            }
            SessionStep::AlreadyComplete => Vec::new(),
        }
    }

    fn finish(&mut self, now: Instant) {
        if let SessionStep::Completed(summary) = self.controller.next(now) {
            self.summary = Some(summary);
        }
    }

    fn absorb(&mut self, events: &[ExerciseEvent], now: Instant) {
        for event in events {
            if event.is_error() {
                self.unit_had_error = true;
            }
            match event {
                ExerciseEvent::Xp(award) => self.controller.record_xp(award.amount),
                ExerciseEvent::UnitComplete if !self.unit_resolved => {
                    self.unit_resolved = true;
                    self.controller.submit_result(!self.unit_had_error);
                    self.timers.schedule(
                        now,
                        self.config.timing.unit_advance(),
                        RunnerTask::AdvanceUnit {
                            unit_index: self.controller.index(),
                        },
                    );
                }
                _ => {}
            }
        }
    }

    pub fn restart(&mut self, now: Instant) -> Vec<ExerciseEvent> {
        self.timers.clear();
        self.summary = None;
        self.exercise = None;
        self.controller.restart(now);
        self.start(now)
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn exercise(&self) -> Option<&ActiveExercise> {
        self.exercise.as_ref()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.summary.is_some()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let exercise = self.exercise.as_ref().and_then(ActiveExercise::next_deadline);
        match (exercise, self.timers.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::exercise::unit::UnitKind;

    fn config() -> Config {
        Config {
            shuffle_seed: Some(5),
            ..Config::default()
        }
    }

    fn step(now: Instant) -> Instant {
        now + Duration::from_secs(2)
    }

    #[test]
    fn test_runs_units_in_order() {
        let t0 = Instant::now();
        let units = vec![Unit::sentence("a", ""), Unit::cloze("[b]", &[])];
        let mut runner = SessionRunner::new(units, config(), t0);
        assert!(runner.start(t0).is_empty());
        assert_eq!(runner.exercise().unwrap().kind(), UnitKind::Sentence);

        runner.apply(ExerciseInput::Letter('a'), None, t0);
        let t1 = step(t0);
        assert_eq!(runner.tick(t1), vec![ExerciseEvent::UnitComplete]);
        assert_eq!(runner.controller().correct(), 1);

        let t2 = step(t1);
        runner.tick(t2);
        assert_eq!(runner.controller().index(), 1);
        assert_eq!(runner.exercise().unwrap().kind(), UnitKind::Cloze);

        runner.apply(ExerciseInput::SelectOption("b".into()), None, t2);
        let t3 = step(t2);
        runner.tick(t3);
        runner.tick(step(t3));
        let summary = runner.summary().unwrap();
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.mistakes, 0);
        assert_eq!(summary.xp, 20 + 10);
    }

    #[test]
    fn test_unit_with_error_counts_as_mistake() {
        let t0 = Instant::now();
        let mut runner = SessionRunner::new(vec![Unit::sentence("a", "")], config(), t0);
        runner.start(t0);
        runner.apply(ExerciseInput::Letter('z'), None, t0);
        runner.apply(ExerciseInput::Letter('a'), None, t0);
        let t1 = step(t0);
        runner.tick(t1);
        runner.tick(step(t1));
        let summary = runner.summary().unwrap();
        assert_eq!(summary.correct, 0);
        assert_eq!(summary.mistakes, 1);
        assert_eq!(summary.xp, 15);
    }

    #[test]
    fn test_empty_units_cascade_to_completion() {
        let t0 = Instant::now();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let units = vec![Unit::sentence("?", ""), Unit::matching(&[])];
        let mut runner = SessionRunner::new(units, config(), t0);
        runner.set_completion_handler(Box::new(move |_| seen.set(seen.get() + 1)));
        assert_eq!(runner.start(t0), vec![ExerciseEvent::UnitComplete]);

        let t1 = step(t0);
        assert_eq!(runner.tick(t1), vec![ExerciseEvent::UnitComplete]);
        runner.tick(step(t1));
        assert!(runner.is_complete());
        runner.tick(step(step(t1)));
        assert_eq!(calls.get(), 1);
        assert_eq!(runner.summary().unwrap().correct, 2);
    }

    #[test]
    fn test_empty_session_completes_on_start() {
        let t0 = Instant::now();
        let mut runner = SessionRunner::new(Vec::new(), config(), t0);
        runner.start(t0);
        assert!(runner.is_complete());
        assert_eq!(runner.summary().unwrap().total_units, 0);
    }

    #[test]
    fn test_input_after_completion_ignored() {
        let t0 = Instant::now();
        let mut runner = SessionRunner::new(vec![Unit::sentence("a", "")], config(), t0);
        runner.start(t0);
        runner.apply(ExerciseInput::Letter('a'), None, t0);
        runner.tick(step(t0));
        runner.tick(step(step(t0)));
        assert!(runner.is_complete());
        assert!(
            runner
                .apply(ExerciseInput::Letter('a'), None, step(step(t0)))
                .is_empty()
        );
    }

    #[test]
    fn test_restart_replays_from_first_unit() {
        let t0 = Instant::now();
        let mut runner = SessionRunner::new(vec![Unit::sentence("a", "")], config(), t0);
        runner.start(t0);
        runner.apply(ExerciseInput::Letter('a'), None, t0);
        runner.tick(step(t0));
        runner.tick(step(step(t0)));
        assert!(runner.is_complete());

        let t1 = step(step(step(t0)));
        runner.restart(t1);
        assert!(!runner.is_complete());
        assert_eq!(runner.controller().correct(), 0);
        assert!(!runner.exercise().unwrap().is_complete());
    }

    #[test]
    fn test_lesson_title_reaches_summary() {
        let t0 = Instant::now();
        let lesson = Lesson {
            title: "Greetings".into(),
            units: Vec::new(),
        };
        let mut runner = SessionRunner::from_lesson(lesson, config(), t0);
        runner.start(t0);
        assert_eq!(runner.summary().unwrap().lesson, "Greetings");
    }
}

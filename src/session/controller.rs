use std::time::Instant;

use chrono::Utc;
use tracing::info;

use crate::exercise::unit::Unit;
use crate::session::result::SessionSummary;

pub type CompletionHandler = Box<dyn FnMut(&SessionSummary)>;

#[derive(Clone, Debug, PartialEq)]
pub enum SessionStep {
    Advanced(usize),
    Completed(SessionSummary),
    AlreadyComplete,
}

/// Walks an ordered list of units and keeps the session counters.
pub struct SessionController {
    lesson: String,
    units: Vec<Unit>,
    index: usize,
    correct: u32,
    mistakes: u32,
    xp: u32,
    started_at: Instant,
    completed: bool,
    on_complete: Option<CompletionHandler>,
}

impl SessionController {
    pub fn new(units: Vec<Unit>, now: Instant) -> Self {
        Self {
            lesson: String::new(),
            units,
            index: 0,
            correct: 0,
            mistakes: 0,
            xp: 0,
            started_at: now,
            completed: false,
            on_complete: None,
        }
    }

    pub fn with_lesson(mut self, lesson: &str) -> Self {
        self.lesson = lesson.to_string();
        self
    }

    pub fn with_completion_handler(
        mut self,
        handler: impl FnMut(&SessionSummary) + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(handler));
        self
    }

    pub fn set_completion_handler(&mut self, handler: CompletionHandler) {
        self.on_complete = Some(handler);
    }

    pub fn submit_result(&mut self, is_correct: bool) {
        if is_correct {
            self.correct += 1;
        } else {
            self.mistakes += 1;
        }
    }

    pub fn record_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
    }

    /// Move to the following unit. Stepping past the last unit completes the
    /// session and fires the completion handler; later calls do nothing.
    pub fn next(&mut self, now: Instant) -> SessionStep {
        if self.completed {
            return SessionStep::AlreadyComplete;
        }
        if self.index + 1 < self.units.len() {
            self.index += 1;
            return SessionStep::Advanced(self.index);
        }

        self.completed = true;
        let summary = self.summary(now);
        info!(
            correct = summary.correct,
            mistakes = summary.mistakes,
            xp = summary.xp,
            elapsed_secs = summary.elapsed_secs,
            "session complete"
        );
        if let Some(handler) = self.on_complete.as_mut() {
            handler(&summary);
        }
        SessionStep::Completed(summary)
    }

    /// Step back for review. Does not reopen anything already finished.
    pub fn previous(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn restart(&mut self, now: Instant) {
        self.index = 0;
        self.correct = 0;
        self.mistakes = 0;
        self.xp = 0;
        self.started_at = now;
        self.completed = false;
    }

    fn summary(&self, now: Instant) -> SessionSummary {
        SessionSummary {
            correct: self.correct,
            mistakes: self.mistakes,
            total_units: self.units.len(),
            elapsed_secs: now.saturating_duration_since(self.started_at).as_secs_f64(),
            timestamp: Utc::now(),
            xp: self.xp,
            lesson: self.lesson.clone(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn current_unit(&self) -> Option<&Unit> {
        self.units.get(self.index)
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;

    fn units(n: usize) -> Vec<Unit> {
        (0..n).map(|i| Unit::sentence(&format!("word{i}"), "")).collect()
    }

    #[test]
    fn test_counters() {
        let mut session = SessionController::new(units(3), Instant::now());
        session.submit_result(true);
        session.submit_result(false);
        session.submit_result(true);
        session.record_xp(15);
        assert_eq!(session.correct(), 2);
        assert_eq!(session.mistakes(), 1);
        assert_eq!(session.xp(), 15);
    }

    #[test]
    fn test_next_walks_then_completes_once() {
        let t0 = Instant::now();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let mut session = SessionController::new(units(2), t0)
            .with_lesson("Basics")
            .with_completion_handler(move |s| sink.borrow_mut().push(s.clone()));

        session.submit_result(true);
        assert_eq!(session.next(t0), SessionStep::Advanced(1));
        session.submit_result(false);

        let step = session.next(t0 + Duration::from_secs(30));
        let SessionStep::Completed(summary) = step else {
            panic!("expected completion, got {step:?}");
        };
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.mistakes, 1);
        assert_eq!(summary.total_units, 2);
        assert_eq!(summary.lesson, "Basics");
        assert!((summary.elapsed_secs - 30.0).abs() < 1e-6);

        assert_eq!(session.next(t0), SessionStep::AlreadyComplete);
        assert_eq!(session.index(), 1);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_empty_session_completes_on_first_next() {
        let mut session = SessionController::new(Vec::new(), Instant::now());
        assert!(session.current_unit().is_none());
        assert!(matches!(
            session.next(Instant::now()),
            SessionStep::Completed(_)
        ));
    }

    #[test]
    fn test_previous_stops_at_first_unit() {
        let t0 = Instant::now();
        let mut session = SessionController::new(units(3), t0);
        assert!(!session.previous());
        session.next(t0);
        session.next(t0);
        assert_eq!(session.index(), 2);
        assert!(session.previous());
        assert_eq!(session.index(), 1);
        assert_eq!(session.current_unit(), Some(&Unit::sentence("word1", "")));
    }

    #[test]
    fn test_restart_resets_everything() {
        let t0 = Instant::now();
        let mut session = SessionController::new(units(1), t0);
        session.submit_result(false);
        session.record_xp(10);
        session.next(t0);
        assert!(session.is_complete());

        let t1 = t0 + Duration::from_secs(60);
        session.restart(t1);
        assert_eq!(session.index(), 0);
        assert_eq!(session.correct(), 0);
        assert_eq!(session.mistakes(), 0);
        assert_eq!(session.xp(), 0);
        assert_eq!(session.started_at(), t1);
        assert!(!session.is_complete());
        assert!(matches!(session.next(t1), SessionStep::Completed(_)));
    }
}

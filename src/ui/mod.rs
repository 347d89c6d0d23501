pub mod components;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use lingodrill::exercise::ActiveExercise;
use lingodrill::exercise::unit::Unit;

use crate::app::{App, Feedback};
use components::cloze_view::ClozeView;
use components::matching_view::MatchingView;
use components::progress_bar::ProgressBar;
use components::sentence_view::SentenceView;
use components::summary_view::SummaryView;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let theme = &app.theme;
    frame.render_widget(Block::default().style(Style::default().bg(theme.bg())), area);

    let [header, body, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(area);

    let controller = app.runner.controller();
    let total = controller.units().len();
    let done = if app.runner.is_complete() {
        total
    } else {
        controller.index()
    };
    let ratio = if total == 0 {
        1.0
    } else {
        done as f64 / total as f64
    };
    let label = format!("Unit {}/{}  XP {}", (done + 1).min(total), total, controller.xp());
    frame.render_widget(ProgressBar::new(&label, ratio, theme), header);

    if let Some(summary) = app.runner.summary() {
        frame.render_widget(
            SummaryView::new(summary, app.session_bonus, app.lifetime_xp, theme),
            body,
        );
    } else {
        match app.runner.exercise() {
            Some(ActiveExercise::Standard(round)) => {
                let source = match controller.current_unit() {
                    Some(Unit::Sentence(sentence)) => sentence.source.as_str(),
                    _ => "",
                };
                frame.render_widget(SentenceView::new(round, source, theme), body);
            }
            Some(ActiveExercise::Cloze(round)) => {
                frame.render_widget(ClozeView::new(round, theme), body);
            }
            Some(ActiveExercise::Matching(round)) => {
                frame.render_widget(MatchingView::new(round, theme), body);
            }
            None => {}
        }
    }

    frame.render_widget(status_line(app), status);
}

fn status_line(app: &App) -> Paragraph<'static> {
    let theme = &app.theme;
    let hint = if app.runner.is_complete() {
        "[r] Restart  [Esc] Quit"
    } else {
        match app.runner.exercise() {
            Some(ActiveExercise::Standard(_)) => {
                "[Tab] Reveal letter  [Backspace] Erase  [Esc] Quit"
            }
            Some(ActiveExercise::Cloze(_)) => {
                "[1-9] Pick option  [Backspace] Undo blank  [Esc] Quit"
            }
            Some(ActiveExercise::Matching(_)) => "[1-9] Left card  [a-z] Right card  [Esc] Quit",
            None => "[Esc] Quit",
        }
    };

    let mut spans = Vec::new();
    if let Some(feedback) = &app.feedback {
        let (text, color) = match feedback {
            Feedback::Xp(amount) => (format!("+{amount} XP"), theme.correct()),
            Feedback::Mistake => ("Mistake".to_string(), theme.incorrect()),
            Feedback::Rejected(option) => (format!("Not \"{option}\""), theme.incorrect()),
            Feedback::Mismatch => ("No match".to_string(), theme.incorrect()),
            Feedback::UnitDone => ("Done!".to_string(), theme.accent()),
        };
        spans.push(Span::styled(
            text,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(hint, Style::default().fg(theme.pending())));
    Paragraph::new(Line::from(spans))
}

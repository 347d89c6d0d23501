use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use lingodrill::session::result::SessionSummary;

use crate::ui::theme::Theme;

pub struct SummaryView<'a> {
    summary: &'a SessionSummary,
    bonus: Option<u32>,
    lifetime_xp: u64,
    theme: &'a Theme,
}

impl<'a> SummaryView<'a> {
    pub fn new(
        summary: &'a SessionSummary,
        bonus: Option<u32>,
        lifetime_xp: u64,
        theme: &'a Theme,
    ) -> Self {
        Self {
            summary,
            bonus,
            lifetime_xp,
            theme,
        }
    }
}

pub fn format_elapsed(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

impl Widget for SummaryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label = Style::default().fg(self.theme.pending());
        let value = Style::default()
            .fg(self.theme.fg())
            .add_modifier(Modifier::BOLD);
        let row = |name: &str, text: String| {
            Line::from(vec![
                Span::styled(format!("{name:<14}"), label),
                Span::styled(text, value),
            ])
        };

        let s = self.summary;
        let mut lines = vec![
            row("Correct", format!("{}/{}", s.correct, s.total_units)),
            row("Mistakes", s.mistakes.to_string()),
            row("Accuracy", format!("{:.0}%", s.accuracy())),
            row("Time", format_elapsed(s.elapsed_secs)),
            row("XP earned", s.xp.to_string()),
        ];
        if let Some(bonus) = self.bonus {
            lines.push(row("Session bonus", format!("+{bonus}")));
        }
        lines.push(row("Lifetime XP", self.lifetime_xp.to_string()));

        let title = if s.lesson.is_empty() {
            " Session complete ".to_string()
        } else {
            format!(" {} complete ", s.lesson)
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(self.theme.accent()));
        Paragraph::new(lines).block(block).render(area, buf);
    }
}

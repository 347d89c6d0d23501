use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Widget};

use lingodrill::exercise::matching::{Card, MatchingRound};

use crate::ui::theme::Theme;

pub struct MatchingView<'a> {
    round: &'a MatchingRound,
    theme: &'a Theme,
}

impl<'a> MatchingView<'a> {
    pub fn new(round: &'a MatchingRound, theme: &'a Theme) -> Self {
        Self { round, theme }
    }

    fn card_style(&self, card: &Card) -> Style {
        let mismatched = self
            .round
            .mismatch()
            .is_some_and(|(s, t)| s == card.id || t == card.id);
        let selected = self.round.selected_source() == Some(card.id)
            || self.round.selected_target() == Some(card.id);

        if card.matched {
            Style::default()
                .fg(self.theme.matched())
                .add_modifier(Modifier::DIM)
        } else if mismatched {
            Style::default()
                .fg(self.theme.incorrect())
                .add_modifier(Modifier::BOLD)
        } else if selected {
            Style::default()
                .fg(self.theme.bg())
                .bg(self.theme.selected())
        } else {
            Style::default().fg(self.theme.fg())
        }
    }

    fn column(&self, cards: &[Card], key: impl Fn(usize) -> char) -> Vec<Line<'static>> {
        cards
            .iter()
            .enumerate()
            .map(|(row, card)| {
                Line::styled(format!("[{}] {}", key(row), card.text), self.card_style(card))
            })
            .collect()
    }
}

/// Key label for a row: digits on the left, letters on the right.
pub fn row_key(row: usize, left: bool) -> char {
    if left {
        char::from_digit((row + 1) as u32, 10).unwrap_or('?')
    } else {
        u8::try_from(row)
            .ok()
            .filter(|r| *r < 26)
            .map_or('?', |r| (b'a' + r) as char)
    }
}

impl Widget for MatchingView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(format!(
                " Match the pairs ({}/{}) ",
                self.round.matched_pairs(),
                self.round.sources().len()
            ))
            .border_style(Style::default().fg(self.theme.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(inner);
        Paragraph::new(self.column(self.round.sources(), |row| row_key(row, true)))
            .render(left, buf);
        Paragraph::new(self.column(self.round.targets(), |row| row_key(row, false)))
            .render(right, buf);
    }
}

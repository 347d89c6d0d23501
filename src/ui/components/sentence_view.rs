use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use lingodrill::engine::tokenizer::{Token, is_apostrophe, is_punctuation_char};
use lingodrill::exercise::standard::{RoundState, SlotStatus, StandardRound, WordProgress};

use crate::ui::theme::Theme;

pub struct SentenceView<'a> {
    round: &'a StandardRound,
    source: &'a str,
    theme: &'a Theme,
}

impl<'a> SentenceView<'a> {
    pub fn new(round: &'a StandardRound, source: &'a str, theme: &'a Theme) -> Self {
        Self {
            round,
            source,
            theme,
        }
    }

    fn word_spans(&self, word: &WordProgress) -> Vec<Span<'static>> {
        word.display()
            .chars()
            .zip(&word.slots)
            .map(|(text, slot)| {
                let style = match slot.status {
                    SlotStatus::Empty => Style::default().fg(self.theme.pending()),
                    SlotStatus::Focused => Style::default()
                        .fg(self.theme.bg())
                        .bg(self.theme.cursor()),
                    SlotStatus::Correct if slot.revealed => {
                        Style::default().fg(self.theme.revealed())
                    }
                    SlotStatus::Correct | SlotStatus::Disabled => {
                        Style::default().fg(self.theme.correct())
                    }
                    SlotStatus::DiacriticMissing => Style::default()
                        .fg(self.theme.diacritic())
                        .add_modifier(Modifier::UNDERLINED),
                    SlotStatus::Incorrect => Style::default()
                        .fg(self.theme.incorrect())
                        .add_modifier(Modifier::CROSSED_OUT),
                };
                Span::styled(text.to_string(), style)
            })
            .collect()
    }
}

/// Pending word with letters hidden and punctuation kept.
pub fn masked(token: &Token) -> String {
    token
        .chars()
        .map(|ch| {
            if is_punctuation_char(ch) || is_apostrophe(ch) {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

impl Widget for SentenceView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let active = match self.round.state() {
            RoundState::Active { word_index, word } => Some((*word_index, word)),
            _ => None,
        };

        let mut spans = Vec::new();
        for (index, token) in self.round.tokens().iter().enumerate() {
            if index > 0 && !token.is_punctuation() {
                spans.push(Span::raw(" "));
            }
            match active {
                Some((word_index, word)) if word_index == index => {
                    spans.extend(self.word_spans(word));
                }
                _ if self.round.revealed()[index] => spans.push(Span::styled(
                    token.to_string(),
                    Style::default().fg(self.theme.correct()),
                )),
                _ => spans.push(Span::styled(
                    masked(token),
                    Style::default().fg(self.theme.pending()),
                )),
            }
        }

        let lines = vec![
            Line::from(Span::styled(
                self.source.to_string(),
                Style::default()
                    .fg(self.theme.fg())
                    .add_modifier(Modifier::ITALIC),
            )),
            Line::default(),
            Line::from(spans),
        ];

        let block = Block::bordered()
            .title(" Translate ")
            .border_style(Style::default().fg(self.theme.border()));
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

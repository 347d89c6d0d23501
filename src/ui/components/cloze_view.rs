use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use lingodrill::exercise::cloze::{BlankCorrectness, ClozeRound, Segment};

use crate::ui::theme::Theme;

pub struct ClozeView<'a> {
    round: &'a ClozeRound,
    theme: &'a Theme,
}

impl<'a> ClozeView<'a> {
    pub fn new(round: &'a ClozeRound, theme: &'a Theme) -> Self {
        Self { round, theme }
    }
}

impl Widget for ClozeView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let active = self.round.active_blank().map(|b| b.id);

        let text: Vec<Span> = self
            .round
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => {
                    Span::styled(text.clone(), Style::default().fg(self.theme.fg()))
                }
                Segment::Blank(id) => {
                    let blank = &self.round.blanks()[*id];
                    let style = match blank.correctness {
                        BlankCorrectness::Correct => Style::default().fg(self.theme.correct()),
                        BlankCorrectness::Incorrect => Style::default()
                            .fg(self.theme.incorrect())
                            .add_modifier(Modifier::CROSSED_OUT),
                        BlankCorrectness::Unknown if active == Some(*id) => Style::default()
                            .fg(self.theme.bg())
                            .bg(self.theme.cursor()),
                        BlankCorrectness::Unknown => Style::default().fg(self.theme.pending()),
                    };
                    let shown = match (&blank.user_answer, self.round.rejected_option()) {
                        (Some(answer), _) => answer.clone(),
                        (None, Some(rejected))
                            if blank.correctness == BlankCorrectness::Incorrect =>
                        {
                            rejected.to_string()
                        }
                        _ => "_".repeat(blank.answer.chars().count().max(3)),
                    };
                    Span::styled(shown, style)
                }
            })
            .collect();

        let options: Vec<Span> = self
            .round
            .options()
            .iter()
            .enumerate()
            .flat_map(|(i, option)| {
                let style = if self.round.is_option_used(i) {
                    Style::default()
                        .fg(self.theme.matched())
                        .add_modifier(Modifier::DIM)
                } else {
                    Style::default().fg(self.theme.accent())
                };
                [
                    Span::styled(format!("[{}] {option}", i + 1), style),
                    Span::raw("   "),
                ]
            })
            .collect();

        let lines = vec![Line::from(text), Line::default(), Line::from(options)];
        let block = Block::bordered()
            .title(" Fill in the blanks ")
            .border_style(Style::default().fg(self.theme.border()));
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

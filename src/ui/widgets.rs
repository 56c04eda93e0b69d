//! Custom widgets for the review screen.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::theme::{icons, Theme};
use crate::models::DeckStats;

// ══════════════════════════════════════════════════════════════════════════
// Stats Bar Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct StatsBar<'a> {
    stats: DeckStats,
    theme: &'a Theme,
}

impl<'a> StatsBar<'a> {
    pub fn new(stats: DeckStats, theme: &'a Theme) -> Self {
        Self { stats, theme }
    }
}

impl Widget for StatsBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::horizontal([Constraint::Percentage(25); 4]).split(area);

        let cells = [
            ("Due: ", self.stats.due_cards, self.theme.stats_due()),
            ("Learning: ", self.stats.learning_cards, self.theme.stats_learning()),
            ("Long-term: ", self.stats.graduated_cards, self.theme.stats_graduated()),
        ];
        for (i, (label, count, style)) in cells.into_iter().enumerate() {
            let text = Line::from(vec![
                Span::styled("● ", style),
                Span::styled(label, self.theme.muted()),
                Span::styled(count.to_string(), style),
            ]);
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .render(chunks[i], buf);
        }

        let total_text = Line::from(vec![
            Span::styled("Total: ", self.theme.muted()),
            Span::styled(
                self.stats.total_cards.to_string(),
                Style::default().fg(self.theme.colors.text_dim),
            ),
        ]);
        Paragraph::new(total_text)
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Flashcard Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct FlashcardWidget<'a> {
    content: &'a str,
    is_front: bool,
    theme: &'a Theme,
}

impl<'a> FlashcardWidget<'a> {
    pub fn new(content: &'a str, is_front: bool, theme: &'a Theme) -> Self {
        Self { content, is_front, theme }
    }
}

impl Widget for FlashcardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (label, label_style, border_color) = if self.is_front {
            ("QUESTION", self.theme.card_front(), self.theme.colors.accent)
        } else {
            ("ANSWER", self.theme.card_back(), self.theme.colors.right)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(label, label_style),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        // Card bodies keep their own indentation, so no trimming here
        let content_area = Rect {
            x: inner.x + 1,
            y: inner.y,
            width: inner.width.saturating_sub(2),
            height: inner.height,
        };
        Paragraph::new(self.content.trim_end_matches('\n'))
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(self.theme.colors.text))
            .render(content_area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Answer Input Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct AnswerInput<'a> {
    text: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> AnswerInput<'a> {
    pub fn new(text: &'a str, focused: bool, theme: &'a Theme) -> Self {
        Self { text, focused, theme }
    }

    /// Where the terminal cursor belongs for the end of `text` inside `area`.
    pub fn cursor_position(text: &str, area: Rect) -> (u16, u16) {
        let last = text.rsplit('\n').next().unwrap_or("");
        let row = text.matches('\n').count() as u16;
        let x = area.x + 1 + (last.width() as u16).min(area.width.saturating_sub(3));
        let y = area.y + 1 + row.min(area.height.saturating_sub(3));
        (x, y)
    }
}

impl Widget for AnswerInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.focused {
            self.theme.colors.primary
        } else {
            self.theme.colors.text_dim
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(" Your answer ")
            .style(Style::default().bg(self.theme.colors.bg_input));

        Paragraph::new(self.text)
            .block(block)
            .style(Style::default().fg(self.theme.colors.text))
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Judgment Line Widget
// ══════════════════════════════════════════════════════════════════════════

/// Shows the statistics of the card just judged.
pub struct JudgmentLine<'a> {
    correct: bool,
    summary: &'a str,
    theme: &'a Theme,
}

impl<'a> JudgmentLine<'a> {
    pub fn new(correct: bool, summary: &'a str, theme: &'a Theme) -> Self {
        Self { correct, summary, theme }
    }
}

impl Widget for JudgmentLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mark = if self.correct { icons::CHECK } else { icons::CROSS };
        let line = Line::from(vec![
            Span::styled(format!("{} ", mark), self.theme.judged(self.correct)),
            Span::styled(self.summary, self.theme.muted()),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Key Hints Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct KeyHints<'a> {
    hints: &'a [(&'a str, &'a str)],
    theme: &'a Theme,
}

impl<'a> KeyHints<'a> {
    pub fn new(hints: &'a [(&'a str, &'a str)], theme: &'a Theme) -> Self {
        Self { hints, theme }
    }
}

impl Widget for KeyHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = self
            .hints
            .iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(*key, self.theme.key_highlight()),
                    Span::styled(format!(" {} ", desc), self.theme.key_hint()),
                    Span::styled("│ ", Style::default().fg(self.theme.colors.text_dim)),
                ]
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Completion Screen Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct CompletionScreen<'a> {
    cards_reviewed: usize,
    summary: &'a str,
    theme: &'a Theme,
}

impl<'a> CompletionScreen<'a> {
    pub fn new(cards_reviewed: usize, summary: &'a str, theme: &'a Theme) -> Self {
        Self {
            cards_reviewed,
            summary,
            theme,
        }
    }
}

impl Widget for CompletionScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.right))
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled("SESSION COMPLETE", self.theme.card_back()),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let strong = Style::default()
            .fg(self.theme.colors.primary)
            .add_modifier(Modifier::BOLD);
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(icons::BRAIN, strong)),
            Line::from(""),
            Line::from(vec![
                Span::styled("Cards reviewed: ", self.theme.muted()),
                Span::styled(self.cards_reviewed.to_string(), strong),
            ]),
            Line::from(Span::styled(self.summary, self.theme.muted())),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", self.theme.key_hint()),
                Span::styled("any key", self.theme.key_highlight()),
                Span::styled(" to save and exit", self.theme.key_hint()),
            ]),
        ];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_follows_last_line() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(AnswerInput::cursor_position("", area), (1, 1));
        assert_eq!(AnswerInput::cursor_position("abc", area), (4, 1));
        assert_eq!(AnswerInput::cursor_position("abc\nde", area), (3, 2));
        assert_eq!(AnswerInput::cursor_position("日本", area), (5, 1));
    }

    #[test]
    fn test_stats_bar_renders_counts() {
        let stats = DeckStats {
            total_cards: 12,
            due_cards: 3,
            learning_cards: 9,
            graduated_cards: 3,
        };
        let theme = Theme::default();
        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        StatsBar::new(stats, &theme).render(area, &mut buf);

        let rendered: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(rendered.contains("Due: 3"));
        assert!(rendered.contains("Learning: 9"));
        assert!(rendered.contains("Total: 12"));
    }
}

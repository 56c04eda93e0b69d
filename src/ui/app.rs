//! Full-screen review front-end.

use std::ops::ControlFlow;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame, Terminal,
};

use super::theme::Theme;
use super::widgets::{AnswerInput, CompletionScreen, FlashcardWidget, JudgmentLine, KeyHints, StatsBar};
use crate::config::Config;
use crate::models::{DeckStats, Flashcard};
use crate::session::{describe, Outcome, ReviewIo};

// ══════════════════════════════════════════════════════════════════════════
// Application State
// ══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Question shown, answer being typed.
    Question,
    /// Reference answer shown, waiting for a judgment.
    Answer,
    Complete,
}

/// What a key press asks the review loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Nothing,
    Submit,
    Judge(bool),
    CycleTheme,
    Quit,
}

/// Everything drawn on screen.
pub struct View {
    pub screen: Screen,
    pub theme: Theme,
    pub title: String,
    pub stats: DeckStats,
    pub question: String,
    pub answer: String,
    pub typed: String,
    pub last_judgment: Option<(bool, String)>,
    pub summary: Option<String>,
    pub reviewed: usize,
}

impl View {
    pub fn new(title: String, theme: Theme) -> Self {
        Self {
            screen: Screen::Question,
            theme,
            title,
            stats: DeckStats::default(),
            question: String::new(),
            answer: String::new(),
            typed: String::new(),
            last_judgment: None,
            summary: None,
            reviewed: 0,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Event Handling
    // ══════════════════════════════════════════════════════════════════════

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match self.screen {
            Screen::Question => self.handle_typing_keys(key.code, ctrl),
            Screen::Answer => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Judge(true),
                KeyCode::Char('n') | KeyCode::Char('N') => KeyAction::Judge(false),
                KeyCode::Char('t') => KeyAction::CycleTheme,
                KeyCode::Esc | KeyCode::Char('q') => KeyAction::Quit,
                _ => KeyAction::Nothing,
            },
            Screen::Complete => KeyAction::Quit,
        }
    }

    fn handle_typing_keys(&mut self, code: KeyCode, ctrl: bool) -> KeyAction {
        match code {
            KeyCode::Esc => KeyAction::Quit,
            KeyCode::Tab => KeyAction::Submit,
            KeyCode::Char('s') if ctrl => KeyAction::Submit,
            KeyCode::Enter => {
                self.typed.push('\n');
                KeyAction::Nothing
            }
            KeyCode::Backspace => {
                self.typed.pop();
                KeyAction::Nothing
            }
            KeyCode::Char(c) if !ctrl => {
                self.typed.push(c);
                KeyAction::Nothing
            }
            _ => KeyAction::Nothing,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Rendering
    // ══════════════════════════════════════════════════════════════════════

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.colors.bg)),
            area,
        );

        match self.screen {
            Screen::Question | Screen::Answer => self.render_review(frame, area),
            Screen::Complete => self.render_complete(frame, area),
        }
    }

    fn render_review(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(1),   // Title
            Constraint::Length(1),   // Stats
            Constraint::Length(1),   // Spacing
            Constraint::Min(8),      // Cards
            Constraint::Length(1),   // Last judgment
            Constraint::Length(1),   // Hints
        ])
        .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(self.title.as_str(), self.theme.title()),
            Span::styled(format!("  ·  reviewed {}", self.reviewed), self.theme.muted()),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);
        frame.render_widget(StatsBar::new(self.stats, &self.theme), chunks[1]);

        let cards_area = centered_rect(90, 100, chunks[3]);
        let halves = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(cards_area);
        frame.render_widget(
            FlashcardWidget::new(&self.question, true, &self.theme),
            halves[0],
        );

        if self.screen == Screen::Question {
            frame.render_widget(AnswerInput::new(&self.typed, true, &self.theme), halves[1]);
            frame.set_cursor_position(AnswerInput::cursor_position(&self.typed, halves[1]));
        } else {
            let sides = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(halves[1]);
            frame.render_widget(AnswerInput::new(&self.typed, false, &self.theme), sides[0]);
            frame.render_widget(
                FlashcardWidget::new(&self.answer, false, &self.theme),
                sides[1],
            );
        }

        if let Some((correct, ref summary)) = self.last_judgment {
            frame.render_widget(JudgmentLine::new(correct, summary, &self.theme), chunks[4]);
        }

        if self.screen == Screen::Question {
            let hints = [("Enter", "new line"), ("Tab/^S", "show answer"), ("Esc", "save & quit")];
            frame.render_widget(KeyHints::new(&hints, &self.theme), chunks[5]);
        } else {
            let hints = [
                ("y", "right"),
                ("n", "wrong"),
                ("t", self.theme.name.display_name()),
                ("Esc", "save & quit"),
            ];
            frame.render_widget(KeyHints::new(&hints, &self.theme), chunks[5]);
        }
    }

    fn render_complete(&self, frame: &mut Frame, area: Rect) {
        let card_area = centered_rect(60, 50, area);
        let summary = self.summary.as_deref().unwrap_or("Nothing was due for review.");
        frame.render_widget(
            CompletionScreen::new(self.reviewed, summary, &self.theme),
            card_area,
        );
    }
}

/// Review front-end drawing to a terminal.
pub struct App<B: Backend> {
    terminal: Terminal<B>,
    config: Config,
    view: View,
}

impl<B: Backend> App<B> {
    pub fn new(terminal: Terminal<B>, config: Config, title: String) -> Self {
        let theme = Theme::from_name(&config.theme);
        Self {
            terminal,
            config,
            view: View::new(title, theme),
        }
    }

    fn draw(&mut self) -> Result<()> {
        self.terminal.draw(|frame| self.view.render(frame))?;
        Ok(())
    }

    /// Block for the next key press, redrawing on anything else (resizes).
    fn next_action(&mut self) -> Result<KeyAction> {
        loop {
            self.draw()?;
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match self.view.handle_key(key) {
                    KeyAction::CycleTheme => self.cycle_theme(),
                    KeyAction::Nothing => {}
                    action => return Ok(action),
                }
            }
        }
    }

    pub fn cycle_theme(&mut self) {
        let new_theme_name = self.view.theme.name.next();
        self.view.theme = Theme::new(new_theme_name);
        self.config.theme = new_theme_name.as_str().to_string();
        if let Err(e) = self.config.save() {
            log::warn!("Could not save theme choice: {:#}", e);
        }
    }

    /// Show the completion screen after a full run and wait for a key.
    pub fn finish(&mut self, outcome: Outcome) -> Result<()> {
        if let Outcome::Completed { .. } = outcome {
            self.view.screen = Screen::Complete;
            self.next_action()?;
        }
        Ok(())
    }
}

impl<B: Backend> ReviewIo for App<B> {
    fn begin(&mut self, stats: DeckStats) -> Result<()> {
        self.view.stats = stats;
        Ok(())
    }

    fn show_question(&mut self, question: &str) -> Result<()> {
        self.view.screen = Screen::Question;
        self.view.question = question.to_string();
        self.view.answer.clear();
        self.view.typed.clear();
        self.draw()
    }

    fn wait_for_answer(&mut self) -> Result<ControlFlow<()>> {
        loop {
            match self.next_action()? {
                KeyAction::Submit => return Ok(ControlFlow::Continue(())),
                KeyAction::Quit => return Ok(ControlFlow::Break(())),
                _ => {}
            }
        }
    }

    fn show_answer(&mut self, answer: &str) -> Result<()> {
        self.view.screen = Screen::Answer;
        self.view.answer = answer.to_string();
        self.draw()
    }

    fn read_judgment(&mut self) -> Result<ControlFlow<(), bool>> {
        loop {
            match self.next_action()? {
                KeyAction::Judge(correct) => return Ok(ControlFlow::Continue(correct)),
                KeyAction::Quit => return Ok(ControlFlow::Break(())),
                _ => {}
            }
        }
    }

    fn show_statistics(&mut self, record: &Flashcard) -> Result<()> {
        if record.is_header() {
            self.view.summary = Some(describe(record));
        } else {
            self.view.reviewed += 1;
            self.view.last_judgment = Some((record.streak > 0, describe(record)));
        }
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Helper Functions
// ══════════════════════════════════════════════════════════════════════════

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

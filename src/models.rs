//! Data models for flashcards and decks.

use chrono::{DateTime, Utc};

/// Consecutive correct answers after which a card counts as learned for good.
pub const LONG_TERM_MEMORY: u32 = 10;

/// A single flashcard.
///
/// The same shape doubles as the deck header: a header has no question, and
/// its counters hold the aggregate of the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flashcard {
    pub comment: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,

    // Statistics
    pub review_count: u32,
    pub streak: u32,
    /// Percentage in `0.0..=100.0`.
    pub accuracy: f64,

    // Tracking
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
}

impl Flashcard {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_text(question: &str, answer: &str) -> Self {
        Self {
            question: Some(question.to_string()),
            answer: Some(answer.to_string()),
            ..Self::default()
        }
    }

    pub fn is_graduated(&self) -> bool {
        self.streak >= LONG_TERM_MEMORY
    }

    pub fn is_header(&self) -> bool {
        self.question.is_none()
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review {
            None => true,
            Some(due) => now >= due,
        }
    }

    pub fn comment(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    pub fn question(&self) -> &str {
        self.question.as_deref().unwrap_or("")
    }

    pub fn answer(&self) -> &str {
        self.answer.as_deref().unwrap_or("")
    }
}

/// Statistics for a deck.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeckStats {
    pub total_cards: usize,
    pub due_cards: usize,
    pub learning_cards: usize,
    pub graduated_cards: usize,
}

/// A header plus the cards in review order.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    pub header: Flashcard,
    pub cards: Vec<Flashcard>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get_stats(&self, now: DateTime<Utc>) -> DeckStats {
        let mut stats = DeckStats {
            total_cards: self.cards.len(),
            ..Default::default()
        };

        for card in &self.cards {
            if card.is_graduated() {
                stats.graduated_cards += 1;
                continue;
            }
            stats.learning_cards += 1;
            if card.is_due(now) {
                stats.due_cards += 1;
            }
        }

        stats
    }
}

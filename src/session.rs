//! Review session: walks the deck, asks the front-end for judgments and
//! writes the deck back when done.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::{Deck, DeckStats, Flashcard};
use crate::scheduler;
use crate::storage::{DeckError, DeckFile};

/// What a front-end has to provide to run a review.
pub trait ReviewIo {
    /// Called once before the first card.
    fn begin(&mut self, _stats: DeckStats) -> Result<()> {
        Ok(())
    }

    fn show_question(&mut self, question: &str) -> Result<()>;

    /// Block until the user is done typing an answer.
    fn wait_for_answer(&mut self) -> Result<ControlFlow<()>>;

    fn show_answer(&mut self, answer: &str) -> Result<()>;

    /// Block until the user says whether the answer was right.
    fn read_judgment(&mut self) -> Result<ControlFlow<(), bool>>;

    /// Statistics of a card after judging it, or of the header at the end.
    fn show_statistics(&mut self, record: &Flashcard) -> Result<()>;
}

/// How a call to [`Session::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every card that was due got judged.
    Completed { reviewed: usize },
    /// The user asked to stop.
    Quit { reviewed: usize },
    /// The deck was finalized from elsewhere (signal handler).
    Interrupted { reviewed: usize },
}

impl Outcome {
    pub fn reviewed(&self) -> usize {
        match *self {
            Self::Completed { reviewed } | Self::Quit { reviewed } | Self::Interrupted { reviewed } => {
                reviewed
            }
        }
    }
}

struct SessionState {
    file: DeckFile,
    deck: Mutex<Option<Deck>>,
}

/// Shared handle on the open deck.
///
/// Clones refer to the same deck, so one can be handed to the signal handler.
/// The deck is written back by the first [`Session::finalize`] call only.
#[derive(Clone)]
pub struct Session {
    state: Arc<SessionState>,
}

impl Session {
    /// Load the deck file, refusing one without cards.
    pub fn open(file: DeckFile, now: DateTime<Utc>) -> Result<Self, DeckError> {
        let deck = file.load_nonempty(now)?;
        Ok(Self::from_deck(file, deck))
    }

    pub fn from_deck(file: DeckFile, deck: Deck) -> Self {
        Self {
            state: Arc::new(SessionState {
                file,
                deck: Mutex::new(Some(deck)),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Deck>> {
        self.state.deck.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` on the deck unless it has already been finalized.
    fn with_deck<T>(&self, f: impl FnOnce(&mut Deck) -> T) -> Option<T> {
        self.lock().as_mut().map(f)
    }

    /// Review every card that is not in long-term memory, in deck order.
    pub fn run<I: ReviewIo + ?Sized>(&self, io: &mut I, now: DateTime<Utc>) -> Result<Outcome> {
        let Some((stats, order)) = self.with_deck(|deck| {
            (deck.get_stats(now), scheduler::due_indices(&deck.cards))
        }) else {
            return Ok(Outcome::Interrupted { reviewed: 0 });
        };

        io.begin(stats)?;
        let mut reviewed = 0;
        let outcome = 'cards: {
            for idx in order {
                let Some((question, answer)) = self.with_deck(|deck| {
                    let card = &deck.cards[idx];
                    (card.question().to_string(), card.answer().to_string())
                }) else {
                    break 'cards Outcome::Interrupted { reviewed };
                };

                io.show_question(&question)?;
                if io.wait_for_answer()?.is_break() {
                    break 'cards Outcome::Quit { reviewed };
                }

                io.show_answer(&answer)?;
                let correct = match io.read_judgment()? {
                    ControlFlow::Continue(correct) => correct,
                    ControlFlow::Break(()) => break 'cards Outcome::Quit { reviewed },
                };

                let Some(card) = self.with_deck(|deck| {
                    scheduler::update_statistics(&mut deck.cards[idx], correct);
                    scheduler::update_statistics(&mut deck.header, correct);
                    deck.cards[idx].clone()
                }) else {
                    break 'cards Outcome::Interrupted { reviewed };
                };
                reviewed += 1;
                log::debug!(
                    "card {} judged {}: {} reviews, streak {}",
                    idx,
                    if correct { "right" } else { "wrong" },
                    card.review_count,
                    card.streak
                );

                io.show_statistics(&card)?;
            }
            Outcome::Completed { reviewed }
        };

        if let Some(header) = self.with_deck(|deck| deck.header.clone()) {
            if header.review_count > 0 {
                io.show_statistics(&header)?;
            }
        }

        Ok(outcome)
    }

    /// Reorder and write the deck back, then drop it.
    ///
    /// Returns `Ok(false)` when another call already did so. The lock is held
    /// until the file is written, so a late caller only returns once the
    /// first one is done.
    pub fn finalize(&self, now: DateTime<Utc>) -> Result<bool, DeckError> {
        let mut guard = self.lock();
        let Some(mut deck) = guard.take() else {
            return Ok(false);
        };

        self.state.file.save(&mut deck, now)?;
        drop(guard);
        log::info!("Session finalized for {:?}", self.state.file.path());
        Ok(true)
    }
}

/// One line of statistics, worded for a card or for the session header.
pub fn describe(record: &Flashcard) -> String {
    if record.is_header() {
        format!(
            "This session: {} reviews, accuracy {}%.",
            record.review_count,
            format_percent(record.accuracy)
        )
    } else {
        format!(
            "Reviewed {} times, {} correct in a row, accuracy {}%.",
            record.review_count,
            record.streak,
            format_percent(record.accuracy)
        )
    }
}

/// Up to two decimals, trailing zeros dropped.
pub fn format_percent(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::models::LONG_TERM_MEMORY;
    use chrono::TimeZone;
    use std::collections::VecDeque;
    use std::fs;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 7, 0, 0).unwrap()
    }

    /// Plays back a fixed list of judgments; `None` means quit.
    #[derive(Default)]
    struct ScriptedIo {
        judgments: VecDeque<Option<bool>>,
        quit_on_answer: bool,
        questions: Vec<String>,
        statistics: Vec<String>,
    }

    impl ReviewIo for ScriptedIo {
        fn show_question(&mut self, question: &str) -> Result<()> {
            self.questions.push(question.trim().to_string());
            Ok(())
        }

        fn wait_for_answer(&mut self) -> Result<ControlFlow<()>> {
            if self.quit_on_answer {
                Ok(ControlFlow::Break(()))
            } else {
                Ok(ControlFlow::Continue(()))
            }
        }

        fn show_answer(&mut self, _answer: &str) -> Result<()> {
            Ok(())
        }

        fn read_judgment(&mut self) -> Result<ControlFlow<(), bool>> {
            match self.judgments.pop_front().flatten() {
                Some(correct) => Ok(ControlFlow::Continue(correct)),
                None => Ok(ControlFlow::Break(())),
            }
        }

        fn show_statistics(&mut self, record: &Flashcard) -> Result<()> {
            self.statistics.push(describe(record));
            Ok(())
        }
    }

    const DECK: &str = "\
# session test
>>
Q:
alpha
A:
a
S:
    2 1 50
<<
>>
Q:
beta
A:
b
S:
    20 12 95
<<
>>
Q:
gamma
A:
c
<<
";

    fn open_session(text: &str) -> (Session, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deck.txt");
        fs::write(&path, text).unwrap();
        let session = Session::open(DeckFile::new(path), now()).unwrap();
        (session, temp_dir)
    }

    #[test]
    fn test_run_skips_graduated_cards() {
        let (session, temp) = open_session(DECK);
        let mut io = ScriptedIo {
            judgments: VecDeque::from(vec![Some(true), Some(false)]),
            ..Default::default()
        };

        let outcome = session.run(&mut io, now()).unwrap();
        assert_eq!(outcome, Outcome::Completed { reviewed: 2 });
        assert_eq!(io.questions, ["gamma", "alpha"]);
        assert_eq!(io.statistics.len(), 3);
        assert_eq!(io.statistics[2], "This session: 2 reviews, accuracy 0%.");

        assert!(session.finalize(now()).unwrap());
        let saved = DeckFile::new(temp.path().join("deck.txt")).load(now()).unwrap();
        let beta = saved.cards.iter().find(|c| c.question() == "beta\n").unwrap();
        assert_eq!(beta.review_count, 20);
        assert_eq!(beta.streak, 12);
        assert_eq!(beta.accuracy, 95.0);

        let gamma = saved.cards.iter().find(|c| c.question() == "gamma\n").unwrap();
        assert_eq!((gamma.review_count, gamma.streak, gamma.accuracy), (1, 1, 100.0));

        let alpha = saved.cards.iter().find(|c| c.question() == "alpha\n").unwrap();
        assert_eq!((alpha.review_count, alpha.streak, alpha.accuracy), (3, 0, 0.0));
    }

    #[test]
    fn test_quit_during_judgment_keeps_earlier_updates() {
        let (session, temp) = open_session(DECK);
        let mut io = ScriptedIo {
            judgments: VecDeque::from(vec![Some(true), None]),
            ..Default::default()
        };

        let outcome = session.run(&mut io, now()).unwrap();
        assert_eq!(outcome, Outcome::Quit { reviewed: 1 });
        assert!(session.finalize(now()).unwrap());

        let text = fs::read_to_string(temp.path().join("deck.txt")).unwrap();
        let saved = codec::parse(&text, now());
        let gamma = saved.cards.iter().find(|c| c.question() == "gamma\n").unwrap();
        assert_eq!(gamma.review_count, 1);
        let alpha = saved.cards.iter().find(|c| c.question() == "alpha\n").unwrap();
        assert_eq!(alpha.review_count, 2);
    }

    #[test]
    fn test_quit_while_answering() {
        let (session, _temp) = open_session(DECK);
        let mut io = ScriptedIo {
            quit_on_answer: true,
            ..Default::default()
        };
        let outcome = session.run(&mut io, now()).unwrap();
        assert_eq!(outcome, Outcome::Quit { reviewed: 0 });
        assert!(io.statistics.is_empty());
    }

    #[test]
    fn test_finalize_runs_once() {
        let (session, temp) = open_session(DECK);
        let handler_copy = session.clone();

        assert!(handler_copy.finalize(now()).unwrap());
        let path = temp.path().join("deck.txt");
        let first = fs::read_to_string(&path).unwrap();

        fs::write(&path, "overwritten\n").unwrap();
        assert!(!session.finalize(now()).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "overwritten\n");
        assert!(first.contains(">>\nQ:\nalpha\n"));
    }

    #[test]
    fn test_concurrent_finalize_waits_for_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deck.txt");
        fs::write(&path, "OLD\n").unwrap();

        let cards = (0..5_000)
            .map(|i| Flashcard::with_text(&format!("q{}\n", i), "a\n"))
            .collect();
        let deck = Deck {
            header: Flashcard::new(),
            cards,
        };
        let session = Session::from_deck(DeckFile::new(path.clone()), deck);

        let handler_copy = session.clone();
        let handler = std::thread::spawn(move || handler_copy.finalize(now()).unwrap());
        std::thread::sleep(std::time::Duration::from_millis(5));
        let wrote_here = session.finalize(now()).unwrap();

        // whichever call lost the race, the deck is on disk once it returns
        let text = fs::read_to_string(&path).unwrap();
        assert_ne!(text, "OLD\n");
        assert_eq!(codec::parse(&text, now()).cards.len(), 5_000);

        let wrote_there = handler.join().unwrap();
        assert!(wrote_here ^ wrote_there);
    }

    #[test]
    fn test_run_after_finalize_is_interrupted() {
        let (session, _temp) = open_session(DECK);
        session.finalize(now()).unwrap();
        let mut io = ScriptedIo::default();
        assert_eq!(
            session.run(&mut io, now()).unwrap(),
            Outcome::Interrupted { reviewed: 0 }
        );
        assert!(io.questions.is_empty());
    }

    #[test]
    fn test_open_rejects_empty_deck() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deck.txt");
        fs::write(&path, "# nothing\n").unwrap();
        let err = Session::open(DeckFile::new(path), now()).err().unwrap();
        assert!(matches!(err, DeckError::EmptyCollection { .. }));
    }

    #[test]
    fn test_graduated_only_deck_asks_nothing() {
        let mut card = Flashcard::with_text("done\n", "yes\n");
        card.streak = LONG_TERM_MEMORY;
        card.accuracy = 100.0;
        let temp_dir = TempDir::new().unwrap();
        let deck = Deck {
            header: Flashcard::new(),
            cards: vec![card.clone()],
        };
        let session = Session::from_deck(DeckFile::new(temp_dir.path().join("d.txt")), deck);
        let mut io = ScriptedIo::default();
        assert_eq!(
            session.run(&mut io, now()).unwrap(),
            Outcome::Completed { reviewed: 0 }
        );
        assert!(io.questions.is_empty());
        assert!(io.statistics.is_empty());
    }

    #[test]
    fn test_describe() {
        let mut card = Flashcard::with_text("q\n", "a\n");
        card.review_count = 11;
        card.accuracy = 700.0 / 11.0;
        assert_eq!(
            describe(&card),
            "Reviewed 11 times, 0 correct in a row, accuracy 63.64%."
        );

        let mut header = Flashcard::new();
        header.review_count = 4;
        header.accuracy = 100.0;
        assert_eq!(describe(&header), "This session: 4 reviews, accuracy 100%.");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0), "0");
        assert_eq!(format_percent(50.5), "50.5");
        assert_eq!(format_percent(100.0), "100");
    }
}

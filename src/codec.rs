//! Plain text deck format.
//!
//! ```text
//! # header comment
//!
//! >>
//! # card comment
//! Q:
//!     question text
//! A:
//!     answer text
//! S:
//!     3 1 66.6 1718443800 1721035800
//! <<
//! ```
//!
//! The statistics line holds review count, streak, accuracy and the last and
//! next review times as epoch seconds. Only the first three are read back;
//! the times are recomputed on every load.

use std::fmt::Write as _;

use chrono::{DateTime, Months, Utc};

use crate::models::{Deck, Flashcard};
use crate::scheduler;

/// Which part of a card the following lines belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Question,
    Answer,
    Statistics,
    Ignore,
}

/// Parse a deck, inserting every closed card in review order relative to `now`.
pub fn parse(text: &str, now: DateTime<Utc>) -> Deck {
    let mut deck = Deck::new();
    let mut current: Option<Flashcard> = None;
    let mut stage = Stage::Ignore;
    let mut seen_card = false;

    for (lineno, raw) in text.split_inclusive('\n').enumerate() {
        let line = if raw.ends_with('\n') {
            raw.to_string()
        } else {
            format!("{}\n", raw)
        };
        let marker = line.trim_end();

        if line.starts_with('#') && !seen_card {
            append(&mut deck.header.comment, &line);
        } else if line.starts_with(">>") {
            if current.is_some() {
                log::warn!("line {}: card opened before the previous one was closed, dropping it", lineno + 1);
            }
            current = Some(Flashcard::new());
            stage = Stage::Ignore;
            seen_card = true;
        } else if line.starts_with("<<") {
            match current.take() {
                Some(mut card) => {
                    fixup(&mut card, now);
                    scheduler::insert(&mut deck.cards, card, now);
                }
                None => log::debug!("line {}: stray close marker", lineno + 1),
            }
            stage = Stage::Ignore;
        } else if let Some(card) = current.as_mut() {
            if line.starts_with('#') {
                append(&mut card.comment, &line);
            } else if marker == "Q:" {
                stage = Stage::Question;
            } else if marker == "A:" {
                stage = Stage::Answer;
            } else if marker == "S:" {
                stage = Stage::Statistics;
            } else {
                match stage {
                    Stage::Question => append(&mut card.question, &line),
                    Stage::Answer => append(&mut card.answer, &line),
                    Stage::Statistics if !marker.is_empty() => {
                        load_statistics(card, marker, now);
                        stage = Stage::Ignore;
                    }
                    Stage::Statistics | Stage::Ignore => {}
                }
            }
        } else if !marker.is_empty() {
            log::debug!("line {}: ignored outside of a card", lineno + 1);
        }
    }

    if current.is_some() {
        log::warn!("deck ends inside an unclosed card, dropping it");
    }

    deck
}

fn append(field: &mut Option<String>, line: &str) {
    field.get_or_insert_with(String::new).push_str(line);
}

/// Read `review_count streak accuracy`. Anything after the first bad or
/// missing token is left at zero.
fn load_statistics(card: &mut Flashcard, line: &str, now: DateTime<Utc>) {
    if read_counters(card, line).is_none() {
        log::debug!("incomplete statistics line {:?}", line);
    }
    card.last_reviewed = Some(now);
}

fn read_counters(card: &mut Flashcard, line: &str) -> Option<()> {
    let mut tokens = line.split_whitespace();
    card.review_count = tokens.next()?.parse().ok()?;
    card.streak = tokens.next()?.parse().ok()?;
    card.accuracy = scheduler::clamp_accuracy(tokens.next()?.parse().ok()?);
    Some(())
}

/// Fill in placeholders and schedule the next review one month out.
pub fn fixup(card: &mut Flashcard, now: DateTime<Utc>) {
    card.comment.get_or_insert_with(String::new);
    card.question.get_or_insert_with(|| "\n".to_string());
    card.answer.get_or_insert_with(|| "\n".to_string());

    let last = *card.last_reviewed.get_or_insert(now);
    card.next_review = Some(one_month_after(last));
}

fn one_month_after(time: DateTime<Utc>) -> DateTime<Utc> {
    time.checked_add_months(Months::new(1)).unwrap_or(time)
}

/// Reorder the deck for `now` and render it back to text.
pub fn serialize(deck: &mut Deck, now: DateTime<Utc>) -> String {
    scheduler::resort(&mut deck.cards, now);

    let mut out = String::new();
    out.push_str(deck.header.comment());
    for card in &deck.cards {
        out.push_str("\n>>\n");
        out.push_str(card.comment());
        out.push_str("Q:\n");
        out.push_str(card.question());
        out.push_str("A:\n");
        out.push_str(card.answer());
        out.push_str("S:\n");
        let _ = writeln!(
            out,
            "    {} {} {} {} {}",
            card.review_count,
            card.streak,
            card.accuracy,
            epoch(card.last_reviewed),
            epoch(card.next_review),
        );
        out.push_str("<<\n");
    }
    out
}

fn epoch(time: Option<DateTime<Utc>>) -> i64 {
    time.map(|t| t.timestamp()).unwrap_or(0)
}

/// Description of the file format with an example record.
pub fn template() -> &'static str {
    "\
# Flashcard deck
# This file is made of comments (lines starting with #), card records and
# blank lines. A card record is a start marker (>>), optional comments, a
# question marker (Q:) followed by the question, an answer marker (A:)
# followed by the answer, a statistics marker (S:) followed by one line of
# statistics, and an end marker (<<).
# The statistics are, in order: review count, consecutive correct answers,
# accuracy in percent, last review time and next review time. Any of them
# may be left out, trailing ones first; the two times are managed by the
# program and should not be entered by hand.
# Comments are kept when the file is rewritten: the ones at the top of the
# file and the ones inside a card record.

>>
[# comment]
Q:
    question
A:
    answer
S:
    [reviews] [streak] [accuracy] [last review] [next review]
<<

[more card records]
"
}

/// Commands available at any prompt.
pub fn help() -> &'static str {
    "\
The help command shows this message at any time.
To run a command, type its name and press Enter.
Commands:
    help      show this message
    quit      save progress and exit
    temp      show the data file template
    clear     clear the screen
"
}

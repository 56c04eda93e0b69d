//! Review ordering and statistics updates.
//!
//! Cards are kept in the order they should be reviewed in. That order is built
//! by inserting cards one at a time: a new card goes in front of the first card
//! it outranks, or at the back if it outranks none. The rank is:
//! - an overdue card goes before cards that are due later than it,
//! - otherwise, between two cards still being learned, the shorter streak goes first,
//! - otherwise the lower accuracy goes first.
//!
//! The rank is not transitive when cards differ in both due state and
//! graduation, so reordering always rebuilds by reinsertion instead of sorting.

use chrono::{DateTime, Utc};

use crate::models::Flashcard;

/// Whether `candidate` should be placed in front of `existing`.
pub fn ranks_before(candidate: &Flashcard, existing: &Flashcard, reference: DateTime<Utc>) -> bool {
    if let Some(due) = candidate.next_review {
        if reference > due {
            return match existing.next_review {
                Some(other) => due < other,
                None => false,
            };
        }
    }

    if !candidate.is_graduated() && !existing.is_graduated() {
        return candidate.streak < existing.streak;
    }

    candidate.accuracy < existing.accuracy
}

/// Insert `card` in front of the first element it outranks.
pub fn insert(cards: &mut Vec<Flashcard>, card: Flashcard, reference: DateTime<Utc>) {
    match cards
        .iter()
        .position(|existing| ranks_before(&card, existing, reference))
    {
        Some(idx) => cards.insert(idx, card),
        None => cards.push(card),
    }
}

/// Rebuild the review order from scratch by reinserting every card.
pub fn resort(cards: &mut Vec<Flashcard>, reference: DateTime<Utc>) {
    let mut sorted = Vec::with_capacity(cards.len());
    for card in cards.drain(..) {
        insert(&mut sorted, card, reference);
    }
    *cards = sorted;
}

/// Indices of cards to review, in deck order. Graduated cards are skipped.
pub fn due_indices(cards: &[Flashcard]) -> Vec<usize> {
    cards
        .iter()
        .enumerate()
        .filter(|(_, card)| !card.is_graduated())
        .map(|(i, _)| i)
        .collect()
}

/// Apply one judgment to a card (or to the session header).
pub fn update_statistics(card: &mut Flashcard, correct: bool) {
    let n = f64::from(card.review_count);
    card.review_count = card.review_count.saturating_add(1);

    if correct {
        card.streak = card.streak.saturating_add(1);
        card.accuracy = (card.accuracy * n + 100.0) / (n + 1.0);
    } else {
        card.streak = 0;
        card.accuracy = if card.accuracy > 0.0 {
            (card.accuracy * n - 100.0) / (n + 1.0)
        } else {
            0.0
        };
    }

    card.accuracy = clamp_accuracy(card.accuracy);
}

/// Force an accuracy value into `0.0..=100.0`; NaN becomes 0.
pub fn clamp_accuracy(accuracy: f64) -> f64 {
    if accuracy.is_nan() {
        0.0
    } else {
        accuracy.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LONG_TERM_MEMORY;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap()
    }

    fn card(name: &str, streak: u32, accuracy: f64, due_in_days: i64) -> Flashcard {
        let mut card = Flashcard::with_text(&format!("{}\n", name), "answer\n");
        card.streak = streak;
        card.accuracy = accuracy;
        card.next_review = Some(now() + Duration::days(due_in_days));
        card
    }

    fn names(cards: &[Flashcard]) -> Vec<String> {
        cards.iter().map(|c| c.question().trim().to_string()).collect()
    }

    #[test]
    fn test_first_correct_answer() {
        let mut c = Flashcard::with_text("q\n", "a\n");
        update_statistics(&mut c, true);
        assert_eq!(c.review_count, 1);
        assert_eq!(c.streak, 1);
        assert_eq!(c.accuracy, 100.0);
    }

    #[test]
    fn test_incorrect_answer_resets_streak() {
        let mut c = Flashcard::with_text("q\n", "a\n");
        c.review_count = 10;
        c.streak = 5;
        c.accuracy = 80.0;
        update_statistics(&mut c, false);
        assert_eq!(c.review_count, 11);
        assert_eq!(c.streak, 0);
        assert!((c.accuracy - 700.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_incorrect_answer_at_zero_accuracy_stays_zero() {
        let mut c = Flashcard::with_text("q\n", "a\n");
        c.review_count = 3;
        update_statistics(&mut c, false);
        assert_eq!(c.accuracy, 0.0);
        assert_eq!(c.review_count, 4);
        assert_eq!(c.streak, 0);
    }

    #[test]
    fn test_incorrect_answer_never_goes_negative() {
        let mut c = Flashcard::with_text("q\n", "a\n");
        c.review_count = 1;
        c.accuracy = 50.0;
        update_statistics(&mut c, false);
        assert_eq!(c.accuracy, 0.0);
    }

    #[test]
    fn test_accuracy_bounds_over_long_run() {
        let mut c = Flashcard::with_text("q\n", "a\n");
        let pattern = [true, true, false, true, false, false, false, true, true, true];
        for round in 0..20 {
            for (i, &correct) in pattern.iter().enumerate() {
                update_statistics(&mut c, correct ^ (round % 3 == 0 && i % 2 == 0));
                assert!((0.0..=100.0).contains(&c.accuracy), "accuracy {}", c.accuracy);
            }
        }
        assert_eq!(c.review_count, 200);
    }

    #[test]
    fn test_streak_counts_consecutive_correct() {
        let mut c = Flashcard::with_text("q\n", "a\n");
        for expected in 1..=LONG_TERM_MEMORY {
            update_statistics(&mut c, true);
            assert_eq!(c.streak, expected);
        }
        assert!(c.is_graduated());
        update_statistics(&mut c, false);
        assert_eq!(c.streak, 0);
        assert!(!c.is_graduated());
    }

    #[test]
    fn test_clamp_accuracy() {
        assert_eq!(clamp_accuracy(-3.0), 0.0);
        assert_eq!(clamp_accuracy(150.0), 100.0);
        assert_eq!(clamp_accuracy(f64::NAN), 0.0);
        assert_eq!(clamp_accuracy(42.5), 42.5);
    }

    #[test]
    fn test_due_card_before_graduated_card() {
        let due = card("due", 2, 90.0, -2);
        let graduated = card("graduated", LONG_TERM_MEMORY, 100.0, 5);
        assert!(ranks_before(&due, &graduated, now()));
        assert!(!ranks_before(&graduated, &due, now()));

        let mut cards = Vec::new();
        insert(&mut cards, graduated, now());
        insert(&mut cards, due, now());
        assert_eq!(names(&cards), ["due", "graduated"]);
    }

    #[test]
    fn test_lower_streak_first_while_learning() {
        let mut cards = Vec::new();
        insert(&mut cards, card("b", 3, 50.0, 10), now());
        insert(&mut cards, card("a", 1, 90.0, 10), now());
        insert(&mut cards, card("c", 7, 10.0, 10), now());
        assert_eq!(names(&cards), ["a", "b", "c"]);
    }

    #[test]
    fn test_lower_accuracy_first_once_graduated() {
        let mut cards = Vec::new();
        insert(&mut cards, card("x", LONG_TERM_MEMORY, 95.0, 10), now());
        insert(&mut cards, card("y", LONG_TERM_MEMORY + 2, 70.0, 10), now());
        assert_eq!(names(&cards), ["y", "x"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut cards = Vec::new();
        insert(&mut cards, card("first", 2, 50.0, 10), now());
        insert(&mut cards, card("second", 2, 50.0, 10), now());
        insert(&mut cards, card("third", 2, 50.0, 10), now());
        assert_eq!(names(&cards), ["first", "second", "third"]);
    }

    #[test]
    fn test_resort_is_independent_of_insertion_order() {
        let pool = vec![
            card("s0", 0, 10.0, 3),
            card("s1", 1, 20.0, 3),
            card("s2", 2, 30.0, 3),
            card("s3", 3, 40.0, 3),
        ];
        let expected = vec!["s0", "s1", "s2", "s3"];

        let permutations: [[usize; 4]; 6] = [
            [0, 1, 2, 3],
            [3, 2, 1, 0],
            [2, 0, 3, 1],
            [1, 3, 0, 2],
            [3, 0, 2, 1],
            [2, 3, 1, 0],
        ];
        for order in permutations {
            let mut cards = Vec::new();
            for &i in &order {
                insert(&mut cards, pool[i].clone(), now());
            }
            resort(&mut cards, now());
            assert_eq!(names(&cards), expected, "order {:?}", order);
        }
    }

    #[test]
    fn test_resort_is_stable_for_sorted_input() {
        let mut cards = vec![
            card("a", 0, 0.0, 1),
            card("b", 4, 0.0, 1),
            card("c", LONG_TERM_MEMORY, 20.0, 1),
            card("d", LONG_TERM_MEMORY, 80.0, 1),
        ];
        resort(&mut cards, now());
        let once = names(&cards);
        resort(&mut cards, now());
        assert_eq!(names(&cards), once);
    }

    #[test]
    fn test_intransitive_triple_depends_on_input_order() {
        // overdue ranks before graduated by due date, graduated ranks before
        // learner by accuracy, learner ranks before overdue by streak.
        let overdue = card("overdue", 5, 90.0, -3);
        let graduated = card("graduated", LONG_TERM_MEMORY, 20.0, 4);
        let learner = card("learner", 1, 50.0, 8);

        assert!(ranks_before(&overdue, &graduated, now()));
        assert!(ranks_before(&graduated, &learner, now()));
        assert!(ranks_before(&learner, &overdue, now()));

        let mut forward = vec![overdue.clone(), graduated.clone(), learner.clone()];
        let mut backward = vec![learner, graduated, overdue];
        resort(&mut forward, now());
        resort(&mut backward, now());
        assert_ne!(names(&forward), names(&backward));
    }

    #[test]
    fn test_due_indices_skip_graduated() {
        let cards = vec![
            card("a", 0, 0.0, 1),
            card("b", LONG_TERM_MEMORY, 100.0, 1),
            card("c", 9, 90.0, 1),
        ];
        assert_eq!(due_indices(&cards), vec![0, 2]);
    }
}

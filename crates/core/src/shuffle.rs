//! Randomized presentation order for answer options.
//!
//! Shuffle once per question presentation: the returned order is kept for
//! the lifetime of a single question view and discarded when the user moves
//! on. Re-shuffling on every render would let options jump under the cursor.

use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;

use crate::model::{Question, QuestionKind};

/// All answer options for a question in authored order: the correct answer
/// first, then the incorrect ones. Empty for open questions.
#[must_use]
pub fn answer_options(question: &Question) -> Vec<String> {
    match question.kind() {
        QuestionKind::Open => Vec::new(),
        QuestionKind::MultipleChoice => {
            let mut options = Vec::with_capacity(1 + question.incorrect_answers().len());
            options.push(question.correct_answer().to_owned());
            options.extend(question.incorrect_answers().iter().cloned());
            options
        }
    }
}

/// Answer options in uniformly random order.
///
/// Fisher-Yates over a fresh copy; the question is never mutated and the
/// returned sequence is the exact multiset of authored options. Each of the
/// n! orderings is equally likely given an unbiased source.
#[must_use]
pub fn shuffled_options(question: &Question) -> Vec<String> {
    shuffled_options_with(question, &mut rng())
}

/// Same as [`shuffled_options`] with a caller-provided source, for
/// deterministic tests.
pub fn shuffled_options_with<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Vec<String> {
    let mut options = answer_options(question);
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LevelId, QuestionId, TopicId};
    use crate::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn multiple_choice(correct: &str, incorrect: &[&str]) -> Question {
        Question::new(
            QuestionId::random(),
            TopicId::random(),
            LevelId::random(),
            "Pick one",
            QuestionKind::MultipleChoice,
            correct,
            incorrect.iter().map(|s| (*s).to_owned()).collect(),
            fixed_now(),
        )
        .unwrap()
    }

    fn open(correct: &str) -> Question {
        Question::new(
            QuestionId::random(),
            TopicId::random(),
            LevelId::random(),
            "Say it",
            QuestionKind::Open,
            correct,
            Vec::new(),
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn shuffle_preserves_the_option_multiset() {
        let q = multiple_choice("Mercury", &["Venus", "Mars", "Venus II"]);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let mut shuffled = shuffled_options_with(&q, &mut rng);
            let mut expected = answer_options(&q);
            shuffled.sort();
            expected.sort();
            assert_eq!(shuffled, expected);
        }
    }

    #[test]
    fn shuffle_does_not_mutate_the_question() {
        let q = multiple_choice("Mercury", &["Venus", "Mars"]);
        let before = q.clone();
        let _ = shuffled_options_with(&q, &mut StdRng::seed_from_u64(1));
        assert_eq!(q, before);
    }

    #[test]
    fn open_questions_have_no_options() {
        let q = open("paris");
        assert!(shuffled_options(&q).is_empty());
    }

    #[test]
    fn shuffle_is_approximately_uniform() {
        // 3 options, 6 permutations, 6000 draws: expect ~1000 each. A
        // window of ±20% is far wider than sampling noise for a seeded run.
        let q = multiple_choice("A", &["B", "C"]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<Vec<String>, u32> = HashMap::new();

        const DRAWS: u32 = 6_000;
        for _ in 0..DRAWS {
            *counts.entry(shuffled_options_with(&q, &mut rng)).or_default() += 1;
        }

        assert_eq!(counts.len(), 6);
        for (permutation, count) in &counts {
            assert!(
                (800..=1200).contains(count),
                "permutation {permutation:?} drawn {count} times"
            );
        }
    }
}

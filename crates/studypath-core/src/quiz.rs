//! Multiple-choice grading: vocabulary quizzes and listening/reading answer
//! sheets.
//!
//! Randomness is always drawn from a caller-supplied [`Rng`] so a seeded
//! generator reproduces the same quiz.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{Question, ReviewRecord, ReviewStatus, VocabularyItem};

pub const DEFAULT_QUIZ_SIZE: usize = 10;
pub const DISTRACTOR_COUNT: usize = 3;

/// `round(correct / total × 100)`, 0 when there is nothing to grade.
pub fn percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

// ---------------------------------------------------------------------------
// Vocabulary quiz
// ---------------------------------------------------------------------------

/// One quiz question. The correct definition is among `options` but is not
/// marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub word_id: u64,
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub word_id: u64,
    #[serde(default)]
    pub selected_option: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub word_id: u64,
    pub word: String,
    pub correct_answer: String,
    pub selected_answer: String,
    pub is_correct: bool,
}

/// Graded quiz. `total_questions` counts every submitted answer, including
/// the skipped ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOutcome {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score: u32,
    pub results: Vec<QuizResult>,
}

/// Which words to quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizRequest {
    pub count: usize,
    pub difficulty: Option<u8>,
}

impl Default for QuizRequest {
    fn default() -> Self {
        Self {
            count: DEFAULT_QUIZ_SIZE,
            difficulty: None,
        }
    }
}

/// Selection group: words being learned first, then unseen words, then the
/// rest.
fn selection_group(record: Option<&ReviewRecord>) -> u8 {
    match record.map(|r| r.status) {
        Some(ReviewStatus::Learning) => 0,
        None => 1,
        Some(_) => 2,
    }
}

/// Build a quiz from the catalog's vocabulary and the learner's records.
pub fn build_quiz<R: Rng + ?Sized>(
    items: &[VocabularyItem],
    records: &[ReviewRecord],
    request: QuizRequest,
    rng: &mut R,
) -> Vec<QuizQuestion> {
    let by_word: HashMap<u64, &ReviewRecord> = records.iter().map(|r| (r.word_id, r)).collect();

    let mut groups: [Vec<&VocabularyItem>; 3] = Default::default();
    for item in items
        .iter()
        .filter(|i| request.difficulty.map_or(true, |d| i.difficulty == d))
    {
        groups[selection_group(by_word.get(&item.id).copied()) as usize].push(item);
    }
    for group in &mut groups {
        group.shuffle(rng);
    }

    groups
        .into_iter()
        .flatten()
        .take(request.count)
        .map(|item| question_for(item, items, rng))
        .collect()
}

fn question_for<R: Rng + ?Sized>(
    item: &VocabularyItem,
    items: &[VocabularyItem],
    rng: &mut R,
) -> QuizQuestion {
    let pool: Vec<&str> = items
        .iter()
        .filter(|other| other.id != item.id && other.definition != item.definition)
        .map(|other| other.definition.as_str())
        .collect();

    let mut options = vec![item.definition.clone()];
    options.extend(
        pool.choose_multiple(rng, DISTRACTOR_COUNT)
            .map(|d| d.to_string()),
    );
    options.shuffle(rng);

    QuizQuestion {
        word_id: item.id,
        word: item.word.clone(),
        phonetic: item.phonetic.clone(),
        question: format!("What is the meaning of \"{}\"?", item.word),
        options,
    }
}

/// Grade one quiz answer against its word. Exact match on the definition.
pub fn grade_quiz_answer(item: &VocabularyItem, answer: &QuizAnswer) -> QuizResult {
    QuizResult {
        word_id: item.id,
        word: item.word.clone(),
        correct_answer: item.definition.clone(),
        selected_answer: answer.selected_option.clone(),
        is_correct: item.definition == answer.selected_option,
    }
}

// ---------------------------------------------------------------------------
// Answer sheets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetAnswer {
    pub question_id: u64,
    pub selected_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetResult {
    pub question_id: u64,
    pub correct_answer: String,
    pub selected_answer: String,
    pub is_correct: bool,
}

/// Graded answer sheet. `total_questions` is the item's question count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetOutcome {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score: u32,
    pub results: Vec<SheetResult>,
}

/// Grade a batch of answers for one listening or reading item.
///
/// Unknown question ids are ignored, and only the first answer to each
/// question counts. Comparison is case-insensitive.
pub fn grade_answer_sheet(questions: &[Question], answers: &[SheetAnswer]) -> SheetOutcome {
    let by_id: HashMap<u64, &Question> = questions.iter().map(|q| (q.id, q)).collect();
    let mut answered = HashSet::new();
    let mut results = Vec::with_capacity(answers.len());

    for answer in answers {
        let Some(question) = by_id.get(&answer.question_id) else {
            continue;
        };
        if !answered.insert(answer.question_id) {
            continue;
        }
        results.push(SheetResult {
            question_id: answer.question_id,
            correct_answer: question.answer.clone(),
            selected_answer: answer.selected_answer.clone(),
            is_correct: question.answer.to_lowercase() == answer.selected_answer.to_lowercase(),
        });
    }

    let correct = results.iter().filter(|r| r.is_correct).count();
    SheetOutcome {
        total_questions: questions.len() as u32,
        correct_answers: correct as u32,
        score: percent(correct, questions.len()),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn word(id: u64, definition: &str, difficulty: u8) -> VocabularyItem {
        VocabularyItem {
            id,
            word: format!("word{id}"),
            phonetic: None,
            definition: definition.into(),
            example: None,
            category: None,
            difficulty,
        }
    }

    fn record(word_id: u64, status: ReviewStatus) -> ReviewRecord {
        let now = Utc::now();
        ReviewRecord {
            user_id: "u1".into(),
            word_id,
            status,
            last_review: now,
            next_review: now + chrono::Duration::days(1),
            review_count: 1,
        }
    }

    fn question(id: u64, answer: &str) -> Question {
        Question {
            id,
            prompt: format!("Q{id}"),
            options: vec!["A".into(), "B".into(), "C".into()],
            answer: answer.into(),
            explanation: None,
        }
    }

    fn catalog() -> Vec<VocabularyItem> {
        (1..=8)
            .map(|i| word(i, &format!("definition {i}"), if i <= 4 { 1 } else { 2 }))
            .collect()
    }

    #[test]
    fn percent_rounds_and_handles_zero() {
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn quiz_puts_learning_words_first() {
        let items = catalog();
        let records = vec![
            record(5, ReviewStatus::Mastered),
            record(7, ReviewStatus::Learning),
            record(2, ReviewStatus::Learning),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let quiz = build_quiz(&items, &records, QuizRequest::default(), &mut rng);

        assert_eq!(quiz.len(), 8);
        let first_two: HashSet<u64> = quiz[..2].iter().map(|q| q.word_id).collect();
        assert_eq!(first_two, HashSet::from([2, 7]));
        assert_eq!(quiz.last().map(|q| q.word_id), Some(5));
    }

    #[test]
    fn quiz_filters_by_difficulty_and_limits_count() {
        let items = catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let request = QuizRequest {
            count: 3,
            difficulty: Some(2),
        };
        let quiz = build_quiz(&items, &[], request, &mut rng);
        assert_eq!(quiz.len(), 3);
        assert!(quiz.iter().all(|q| q.word_id > 4));
    }

    #[test]
    fn options_contain_the_answer_and_distinct_distractors() {
        let items = catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for q in build_quiz(&items, &[], QuizRequest::default(), &mut rng) {
            assert_eq!(q.options.len(), 4);
            let answer = format!("definition {}", q.word_id);
            assert_eq!(q.options.iter().filter(|o| **o == answer).count(), 1);
            assert!(q.question.contains(&q.word));
        }
    }

    #[test]
    fn tiny_catalog_gives_fewer_distractors() {
        let items = vec![word(1, "same", 1), word(2, "same", 1), word(3, "other", 1)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let quiz = build_quiz(&items, &[], QuizRequest::default(), &mut rng);
        let q1 = quiz.iter().find(|q| q.word_id == 1).unwrap();
        assert_eq!(q1.options.len(), 2);
    }

    #[test]
    fn same_seed_same_quiz() {
        let items = catalog();
        let a = build_quiz(&items, &[], QuizRequest::default(), &mut ChaCha8Rng::seed_from_u64(9));
        let b = build_quiz(&items, &[], QuizRequest::default(), &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn quiz_answer_requires_exact_definition() {
        let item = word(1, "to run quickly", 1);
        let answer = |s: &str| QuizAnswer {
            word_id: 1,
            selected_option: s.into(),
        };
        assert!(grade_quiz_answer(&item, &answer("to run quickly")).is_correct);
        assert!(!grade_quiz_answer(&item, &answer("To run quickly")).is_correct);
    }

    #[test]
    fn sheet_ignores_unknown_questions_and_compares_case_insensitively() {
        let questions = vec![question(1, "A"), question(2, "B"), question(3, "C")];
        let answers = vec![
            SheetAnswer {
                question_id: 1,
                selected_answer: "a".into(),
            },
            SheetAnswer {
                question_id: 2,
                selected_answer: "C".into(),
            },
            SheetAnswer {
                question_id: 99,
                selected_answer: "A".into(),
            },
        ];
        let outcome = grade_answer_sheet(&questions, &answers);
        assert_eq!(outcome.total_questions, 3);
        assert_eq!(outcome.correct_answers, 1);
        assert_eq!(outcome.score, 33);
        assert_eq!(outcome.results.len(), 2);
    }

    #[test]
    fn repeated_answers_count_once() {
        let questions = vec![question(1, "A")];
        let answers = vec![
            SheetAnswer {
                question_id: 1,
                selected_answer: "A".into(),
            };
            3
        ];
        let outcome = grade_answer_sheet(&questions, &answers);
        assert_eq!(outcome.correct_answers, 1);
        assert_eq!(outcome.score, 100);
    }

    #[test]
    fn item_without_questions_scores_zero() {
        let outcome = grade_answer_sheet(&[], &[]);
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.total_questions, 0);
    }
}

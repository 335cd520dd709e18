//! Exponential-interval review scheduling for vocabulary items.
//!
//! Remembered words double their interval up to 30 days; forgotten words fall
//! back to half the remembered interval. Status is recomputed on every review,
//! so a mastered word that is forgotten drops back to learning.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ReviewRecord, ReviewStatus};

/// Reviews needed (with a successful recall) before a word counts as mastered.
pub const MASTERY_REVIEW_COUNT: u32 = 5;

/// Longest interval handed out for a remembered word.
pub const MAX_REMEMBERED_INTERVAL_DAYS: f64 = 30.0;

/// Result of scheduling one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub status: ReviewStatus,
    pub last_review: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
    pub review_count: u32,
    pub interval_days: i64,
}

impl ReviewOutcome {
    /// Build the stored record for this outcome.
    pub fn into_record(self, user_id: &str, word_id: u64) -> ReviewRecord {
        ReviewRecord {
            user_id: user_id.to_string(),
            word_id,
            status: self.status,
            last_review: self.last_review,
            next_review: self.next_review,
            review_count: self.review_count,
        }
    }
}

/// Schedule an explicit "did you remember this word?" review.
///
/// A first review always lands one day out in `learning`, whatever the answer.
pub fn schedule_review(
    existing: Option<&ReviewRecord>,
    remembered: bool,
    now: DateTime<Utc>,
) -> ReviewOutcome {
    match existing {
        None => first_review(1, now),
        Some(record) => repeat_review(record.review_count, remembered, now),
    }
}

/// Schedule a word graded inside a vocabulary quiz.
///
/// Same as [`schedule_review`] except that a first correct answer is pushed
/// two days out instead of one.
pub fn schedule_quiz_outcome(
    existing: Option<&ReviewRecord>,
    correct: bool,
    now: DateTime<Utc>,
) -> ReviewOutcome {
    match existing {
        None => first_review(if correct { 2 } else { 1 }, now),
        Some(record) => repeat_review(record.review_count, correct, now),
    }
}

/// Interval in days and resulting status for the `review_count`-th review.
///
/// Uses floating-point powers so that the forgotten branch at count 1
/// (2^-1 = 0.5) floors to 0 before the minimum of one day applies.
pub fn interval_for(review_count: u32, remembered: bool) -> (i64, ReviewStatus) {
    let count = f64::from(review_count);
    if remembered {
        let days = 2f64.powf(count - 1.0).min(MAX_REMEMBERED_INTERVAL_DAYS);
        let status = if review_count >= MASTERY_REVIEW_COUNT {
            ReviewStatus::Mastered
        } else {
            ReviewStatus::Learning
        };
        (days as i64, status)
    } else {
        let days = 2f64.powf(count - 2.0).floor().max(1.0);
        // `as` saturates, which keeps huge review counts representable.
        (days as i64, ReviewStatus::Learning)
    }
}

fn first_review(interval_days: i64, now: DateTime<Utc>) -> ReviewOutcome {
    ReviewOutcome {
        status: ReviewStatus::Learning,
        last_review: now,
        next_review: add_days(now, interval_days),
        review_count: 1,
        interval_days,
    }
}

fn repeat_review(previous_count: u32, remembered: bool, now: DateTime<Utc>) -> ReviewOutcome {
    let review_count = previous_count.saturating_add(1);
    let (interval_days, status) = interval_for(review_count, remembered);
    ReviewOutcome {
        status,
        last_review: now,
        next_review: add_days(now, interval_days),
        review_count,
        interval_days,
    }
}

/// `now + days`, saturating at the latest representable instant.
fn add_days(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

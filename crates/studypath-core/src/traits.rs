//! Core trait definitions for the record store and the clock.
//!
//! The store is implemented by the `studypath-store` crate; the engine only
//! ever sees `Arc<dyn RecordStore>`.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{
    ActivityRecord, ContentKind, ListeningItem, ProgressSnapshot, QuizAttempt, ReadingItem,
    ReviewRecord, VocabularyItem, WritingPrompt, WritingSubmission,
};

// ---------------------------------------------------------------------------
// Record store trait
// ---------------------------------------------------------------------------

/// Read/append/update access to catalog content and learner records.
///
/// Lookups return `Ok(None)` for a missing row; `Err` is reserved for the
/// store itself failing.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Human-readable backend name (e.g. "memory").
    fn name(&self) -> &str;

    // Catalog
    async fn vocabulary_item(&self, id: u64) -> anyhow::Result<Option<VocabularyItem>>;
    async fn vocabulary_items(&self) -> anyhow::Result<Vec<VocabularyItem>>;
    async fn listening_item(&self, id: u64) -> anyhow::Result<Option<ListeningItem>>;
    async fn reading_item(&self, id: u64) -> anyhow::Result<Option<ReadingItem>>;
    async fn writing_prompt(&self, id: u64) -> anyhow::Result<Option<WritingPrompt>>;

    // Vocabulary reviews
    async fn review_record(&self, user_id: &str, word_id: u64)
        -> anyhow::Result<Option<ReviewRecord>>;
    async fn review_records(&self, user_id: &str) -> anyhow::Result<Vec<ReviewRecord>>;
    /// Insert or replace the record for `(record.user_id, record.word_id)`.
    async fn save_review_record(&self, record: &ReviewRecord) -> anyhow::Result<()>;

    // Listening / reading attempts. `kind` is `Listening` or `Reading`.
    async fn activity_records(
        &self,
        user_id: &str,
        kind: ContentKind,
    ) -> anyhow::Result<Vec<ActivityRecord>>;
    /// Insert or replace the record for `(record.user_id, record.item_id)`.
    async fn save_activity_record(
        &self,
        kind: ContentKind,
        record: &ActivityRecord,
    ) -> anyhow::Result<()>;

    // Append-only history
    async fn writing_submissions(&self, user_id: &str) -> anyhow::Result<Vec<WritingSubmission>>;
    async fn append_writing_submission(&self, submission: &WritingSubmission)
        -> anyhow::Result<()>;
    async fn quiz_attempts(&self, user_id: &str) -> anyhow::Result<Vec<QuizAttempt>>;
    async fn append_quiz_attempt(&self, attempt: &QuizAttempt) -> anyhow::Result<()>;

    // Progress cache
    async fn snapshot(&self, user_id: &str) -> anyhow::Result<Option<ProgressSnapshot>>;
    async fn save_snapshot(&self, snapshot: &ProgressSnapshot) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current time, injected so schedules are reproducible.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that returns a settable instant.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::days(2));
        assert_eq!(clock.now(), start + Duration::days(2));
    }
}

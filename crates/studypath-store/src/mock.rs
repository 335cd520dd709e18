//! Fault-injecting store for testing the engine's failure paths.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use studypath_core::model::{
    ActivityRecord, ContentKind, ListeningItem, ProgressSnapshot, QuizAttempt, ReadingItem,
    ReviewRecord, VocabularyItem, WritingPrompt, WritingSubmission,
};
use studypath_core::traits::RecordStore;

use crate::error::StoreError;

/// Wraps another store and fails selected writes on demand.
///
/// Reads always pass through. Every write is counted, including the ones
/// that were made to fail.
pub struct FailingStore {
    inner: Arc<dyn RecordStore>,
    fail_snapshots: AtomicBool,
    fail_records: AtomicBool,
    write_count: AtomicU32,
    snapshot_count: AtomicU32,
}

impl FailingStore {
    pub fn new(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            fail_snapshots: AtomicBool::new(false),
            fail_records: AtomicBool::new(false),
            write_count: AtomicU32::new(0),
            snapshot_count: AtomicU32::new(0),
        }
    }

    /// Make snapshot saves fail.
    pub fn fail_snapshots(&self, fail: bool) {
        self.fail_snapshots.store(fail, Ordering::SeqCst);
    }

    /// Make learning record writes fail.
    pub fn fail_records(&self, fail: bool) {
        self.fail_records.store(fail, Ordering::SeqCst);
    }

    /// Learning record writes attempted so far.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Snapshot saves attempted so far.
    pub fn snapshot_count(&self) -> u32 {
        self.snapshot_count.load(Ordering::SeqCst)
    }

    fn check_record_write(&self, what: &str) -> anyhow::Result<()> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_records.load(Ordering::SeqCst) {
            return Err(StoreError::Injected(format!("{what} write refused")).into());
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn vocabulary_item(&self, id: u64) -> anyhow::Result<Option<VocabularyItem>> {
        self.inner.vocabulary_item(id).await
    }

    async fn vocabulary_items(&self) -> anyhow::Result<Vec<VocabularyItem>> {
        self.inner.vocabulary_items().await
    }

    async fn listening_item(&self, id: u64) -> anyhow::Result<Option<ListeningItem>> {
        self.inner.listening_item(id).await
    }

    async fn reading_item(&self, id: u64) -> anyhow::Result<Option<ReadingItem>> {
        self.inner.reading_item(id).await
    }

    async fn writing_prompt(&self, id: u64) -> anyhow::Result<Option<WritingPrompt>> {
        self.inner.writing_prompt(id).await
    }

    async fn review_record(
        &self,
        user_id: &str,
        word_id: u64,
    ) -> anyhow::Result<Option<ReviewRecord>> {
        self.inner.review_record(user_id, word_id).await
    }

    async fn review_records(&self, user_id: &str) -> anyhow::Result<Vec<ReviewRecord>> {
        self.inner.review_records(user_id).await
    }

    async fn save_review_record(&self, record: &ReviewRecord) -> anyhow::Result<()> {
        self.check_record_write("review")?;
        self.inner.save_review_record(record).await
    }

    async fn activity_records(
        &self,
        user_id: &str,
        kind: ContentKind,
    ) -> anyhow::Result<Vec<ActivityRecord>> {
        self.inner.activity_records(user_id, kind).await
    }

    async fn save_activity_record(
        &self,
        kind: ContentKind,
        record: &ActivityRecord,
    ) -> anyhow::Result<()> {
        self.check_record_write("activity")?;
        self.inner.save_activity_record(kind, record).await
    }

    async fn writing_submissions(&self, user_id: &str) -> anyhow::Result<Vec<WritingSubmission>> {
        self.inner.writing_submissions(user_id).await
    }

    async fn append_writing_submission(
        &self,
        submission: &WritingSubmission,
    ) -> anyhow::Result<()> {
        self.check_record_write("writing")?;
        self.inner.append_writing_submission(submission).await
    }

    async fn quiz_attempts(&self, user_id: &str) -> anyhow::Result<Vec<QuizAttempt>> {
        self.inner.quiz_attempts(user_id).await
    }

    async fn append_quiz_attempt(&self, attempt: &QuizAttempt) -> anyhow::Result<()> {
        self.check_record_write("quiz")?;
        self.inner.append_quiz_attempt(attempt).await
    }

    async fn snapshot(&self, user_id: &str) -> anyhow::Result<Option<ProgressSnapshot>> {
        self.inner.snapshot(user_id).await
    }

    async fn save_snapshot(&self, snapshot: &ProgressSnapshot) -> anyhow::Result<()> {
        self.snapshot_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_snapshots.load(Ordering::SeqCst) {
            return Err(StoreError::Injected("snapshot write refused".into()).into());
        }
        self.inner.save_snapshot(snapshot).await
    }
}

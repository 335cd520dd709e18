//! In-memory record store.
//!
//! Catalog content is indexed by id once at construction; learner records
//! live in a single [`LearnerData`] behind a mutex. The JSON file store
//! reuses both and only adds persistence.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use studypath_core::model::{
    ActivityRecord, Catalog, ContentKind, ListeningItem, ProgressSnapshot, QuizAttempt,
    ReadingItem, ReviewRecord, VocabularyItem, WritingPrompt, WritingSubmission,
};
use studypath_core::traits::RecordStore;

/// Catalog content keyed by id. Later duplicates replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    vocabulary: BTreeMap<u64, VocabularyItem>,
    listening: BTreeMap<u64, ListeningItem>,
    reading: BTreeMap<u64, ReadingItem>,
    writing: BTreeMap<u64, WritingPrompt>,
}

impl From<Catalog> for CatalogIndex {
    fn from(catalog: Catalog) -> Self {
        Self {
            vocabulary: catalog.vocabulary.into_iter().map(|v| (v.id, v)).collect(),
            listening: catalog.listening.into_iter().map(|l| (l.id, l)).collect(),
            reading: catalog.reading.into_iter().map(|r| (r.id, r)).collect(),
            writing: catalog.writing.into_iter().map(|w| (w.id, w)).collect(),
        }
    }
}

/// Every learner record, for all users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnerData {
    #[serde(default)]
    pub reviews: Vec<ReviewRecord>,
    #[serde(default)]
    pub listening: Vec<ActivityRecord>,
    #[serde(default)]
    pub reading: Vec<ActivityRecord>,
    #[serde(default)]
    pub writing: Vec<WritingSubmission>,
    #[serde(default)]
    pub quizzes: Vec<QuizAttempt>,
    #[serde(default)]
    pub snapshots: Vec<ProgressSnapshot>,
}

impl LearnerData {
    fn attempts(&self, kind: ContentKind) -> anyhow::Result<&Vec<ActivityRecord>> {
        match kind {
            ContentKind::Listening => Ok(&self.listening),
            ContentKind::Reading => Ok(&self.reading),
            other => anyhow::bail!("{other} has no activity records"),
        }
    }

    fn attempts_mut(&mut self, kind: ContentKind) -> anyhow::Result<&mut Vec<ActivityRecord>> {
        match kind {
            ContentKind::Listening => Ok(&mut self.listening),
            ContentKind::Reading => Ok(&mut self.reading),
            other => anyhow::bail!("{other} has no activity records"),
        }
    }

    pub fn upsert_review(&mut self, record: &ReviewRecord) {
        upsert(
            &mut self.reviews,
            |r| r.user_id == record.user_id && r.word_id == record.word_id,
            record,
        );
    }

    pub fn upsert_activity(
        &mut self,
        kind: ContentKind,
        record: &ActivityRecord,
    ) -> anyhow::Result<()> {
        upsert(
            self.attempts_mut(kind)?,
            |r| r.user_id == record.user_id && r.item_id == record.item_id,
            record,
        );
        Ok(())
    }

    pub fn upsert_snapshot(&mut self, snapshot: &ProgressSnapshot) {
        upsert(
            &mut self.snapshots,
            |s| s.user_id == snapshot.user_id,
            snapshot,
        );
    }
}

fn upsert<T: Clone>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool, row: &T) {
    match rows.iter_mut().find(|r| matches(r)) {
        Some(existing) => *existing = row.clone(),
        None => rows.push(row.clone()),
    }
}

fn for_user<T: Clone>(rows: &[T], user_id: &str, owner: impl Fn(&T) -> &str) -> Vec<T> {
    rows.iter().filter(|r| owner(r) == user_id).cloned().collect()
}

/// A record store that lives entirely in memory.
pub struct MemoryStore {
    catalog: CatalogIndex,
    data: Mutex<LearnerData>,
}

impl MemoryStore {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_data(catalog, LearnerData::default())
    }

    /// Start from previously saved learner data.
    pub fn with_data(catalog: Catalog, data: LearnerData) -> Self {
        Self {
            catalog: CatalogIndex::from(catalog),
            data: Mutex::new(data),
        }
    }

    /// A copy of every learner record.
    pub fn data(&self) -> LearnerData {
        self.lock().clone()
    }

    /// Replace every learner record at once.
    pub fn replace_data(&self, data: LearnerData) {
        *self.lock() = data;
    }

    fn lock(&self) -> MutexGuard<'_, LearnerData> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn vocabulary_item(&self, id: u64) -> anyhow::Result<Option<VocabularyItem>> {
        Ok(self.catalog.vocabulary.get(&id).cloned())
    }

    async fn vocabulary_items(&self) -> anyhow::Result<Vec<VocabularyItem>> {
        Ok(self.catalog.vocabulary.values().cloned().collect())
    }

    async fn listening_item(&self, id: u64) -> anyhow::Result<Option<ListeningItem>> {
        Ok(self.catalog.listening.get(&id).cloned())
    }

    async fn reading_item(&self, id: u64) -> anyhow::Result<Option<ReadingItem>> {
        Ok(self.catalog.reading.get(&id).cloned())
    }

    async fn writing_prompt(&self, id: u64) -> anyhow::Result<Option<WritingPrompt>> {
        Ok(self.catalog.writing.get(&id).cloned())
    }

    async fn review_record(
        &self,
        user_id: &str,
        word_id: u64,
    ) -> anyhow::Result<Option<ReviewRecord>> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .find(|r| r.user_id == user_id && r.word_id == word_id)
            .cloned())
    }

    async fn review_records(&self, user_id: &str) -> anyhow::Result<Vec<ReviewRecord>> {
        Ok(for_user(&self.lock().reviews, user_id, |r| r.user_id.as_str()))
    }

    async fn save_review_record(&self, record: &ReviewRecord) -> anyhow::Result<()> {
        self.lock().upsert_review(record);
        Ok(())
    }

    async fn activity_records(
        &self,
        user_id: &str,
        kind: ContentKind,
    ) -> anyhow::Result<Vec<ActivityRecord>> {
        let data = self.lock();
        Ok(for_user(data.attempts(kind)?, user_id, |r| r.user_id.as_str()))
    }

    async fn save_activity_record(
        &self,
        kind: ContentKind,
        record: &ActivityRecord,
    ) -> anyhow::Result<()> {
        self.lock().upsert_activity(kind, record)
    }

    async fn writing_submissions(&self, user_id: &str) -> anyhow::Result<Vec<WritingSubmission>> {
        Ok(for_user(&self.lock().writing, user_id, |s| s.user_id.as_str()))
    }

    async fn append_writing_submission(
        &self,
        submission: &WritingSubmission,
    ) -> anyhow::Result<()> {
        self.lock().writing.push(submission.clone());
        Ok(())
    }

    async fn quiz_attempts(&self, user_id: &str) -> anyhow::Result<Vec<QuizAttempt>> {
        Ok(for_user(&self.lock().quizzes, user_id, |q| q.user_id.as_str()))
    }

    async fn append_quiz_attempt(&self, attempt: &QuizAttempt) -> anyhow::Result<()> {
        self.lock().quizzes.push(attempt.clone());
        Ok(())
    }

    async fn snapshot(&self, user_id: &str) -> anyhow::Result<Option<ProgressSnapshot>> {
        Ok(self
            .lock()
            .snapshots
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn save_snapshot(&self, snapshot: &ProgressSnapshot) -> anyhow::Result<()> {
        self.lock().upsert_snapshot(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn catalog() -> Catalog {
        Catalog {
            id: "test".into(),
            name: "Test".into(),
            vocabulary: vec![
                VocabularyItem {
                    id: 2,
                    word: "benefit".into(),
                    phonetic: None,
                    definition: "an advantage".into(),
                    example: None,
                    category: None,
                    difficulty: 1,
                },
                VocabularyItem {
                    id: 1,
                    word: "abandon".into(),
                    phonetic: None,
                    definition: "to leave behind".into(),
                    example: None,
                    category: None,
                    difficulty: 2,
                },
            ],
            ..Default::default()
        }
    }

    fn review(user_id: &str, word_id: u64, review_count: u32) -> ReviewRecord {
        let now = Utc::now();
        ReviewRecord {
            user_id: user_id.into(),
            word_id,
            status: Default::default(),
            last_review: now,
            next_review: now + Duration::days(1),
            review_count,
        }
    }

    #[tokio::test]
    async fn catalog_lookups_are_ordered_by_id() {
        let store = MemoryStore::new(catalog());
        let ids: Vec<u64> = store
            .vocabulary_items()
            .await
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(store.vocabulary_item(3).await.unwrap().is_none());
        assert!(store.writing_prompt(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn review_records_upsert_per_user_and_word() {
        let store = MemoryStore::new(catalog());
        store.save_review_record(&review("a", 1, 1)).await.unwrap();
        store.save_review_record(&review("a", 1, 2)).await.unwrap();
        store.save_review_record(&review("b", 1, 1)).await.unwrap();

        let a = store.review_records("a").await.unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].review_count, 2);
        assert_eq!(store.review_records("b").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn activity_records_are_kept_per_kind() {
        let store = MemoryStore::new(catalog());
        let record = ActivityRecord {
            user_id: "a".into(),
            item_id: 1,
            completed: true,
            score: 80,
            last_attempt: Utc::now(),
        };
        store
            .save_activity_record(ContentKind::Reading, &record)
            .await
            .unwrap();

        assert_eq!(
            store
                .activity_records("a", ContentKind::Reading)
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(store
            .activity_records("a", ContentKind::Listening)
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .save_activity_record(ContentKind::Writing, &record)
            .await
            .is_err());
    }
}

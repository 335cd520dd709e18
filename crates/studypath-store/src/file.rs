//! JSON file record store.
//!
//! Catalog content comes from TOML catalogs and is never written back.
//! Learner data is held in memory and rewritten to a single JSON file on
//! every write, via a temporary file and a rename. A write is applied to a
//! copy first and only becomes visible once the file holds it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use studypath_core::model::{
    ActivityRecord, Catalog, ContentKind, ListeningItem, ProgressSnapshot, QuizAttempt,
    ReadingItem, ReviewRecord, VocabularyItem, WritingPrompt, WritingSubmission,
};
use studypath_core::traits::RecordStore;

use crate::error::StoreError;
use crate::memory::{LearnerData, MemoryStore};

/// A record store persisted to a JSON data file.
pub struct JsonFileStore {
    inner: MemoryStore,
    path: PathBuf,
    /// Serializes stage-persist-swap so the file always matches a prefix of
    /// the write history.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the data file at `path`, starting empty if it does not exist yet.
    pub async fn open(catalog: Catalog, path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                serde_json::from_str::<LearnerData>(&content).map_err(|source| {
                    StoreError::Corrupt {
                        path: path.clone(),
                        source,
                    }
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("data file {} not found, starting empty", path.display());
                LearnerData::default()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            inner: MemoryStore::with_data(catalog, data),
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the learner data, persist the copy, then
    /// make it current. Memory is untouched when persisting fails.
    async fn commit(
        &self,
        change: impl FnOnce(&mut LearnerData) -> anyhow::Result<()> + Send,
    ) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut staged = self.inner.data();
        change(&mut staged)?;
        self.persist(&staged).await?;
        self.inner.replace_data(staged);
        Ok(())
    }

    async fn persist(&self, data: &LearnerData) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_string_pretty(data).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
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
        self.commit(|data| {
            data.upsert_review(record);
            Ok(())
        })
        .await
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
        self.commit(|data| data.upsert_activity(kind, record)).await
    }

    async fn writing_submissions(&self, user_id: &str) -> anyhow::Result<Vec<WritingSubmission>> {
        self.inner.writing_submissions(user_id).await
    }

    async fn append_writing_submission(
        &self,
        submission: &WritingSubmission,
    ) -> anyhow::Result<()> {
        self.commit(|data| {
            data.writing.push(submission.clone());
            Ok(())
        })
        .await
    }

    async fn quiz_attempts(&self, user_id: &str) -> anyhow::Result<Vec<QuizAttempt>> {
        self.inner.quiz_attempts(user_id).await
    }

    async fn append_quiz_attempt(&self, attempt: &QuizAttempt) -> anyhow::Result<()> {
        self.commit(|data| {
            data.quizzes.push(attempt.clone());
            Ok(())
        })
        .await
    }

    async fn snapshot(&self, user_id: &str) -> anyhow::Result<Option<ProgressSnapshot>> {
        self.inner.snapshot(user_id).await
    }

    async fn save_snapshot(&self, snapshot: &ProgressSnapshot) -> anyhow::Result<()> {
        self.commit(|data| {
            data.upsert_snapshot(snapshot);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn attempt(user_id: &str, score: u32) -> QuizAttempt {
        QuizAttempt {
            id: Default::default(),
            user_id: user_id.into(),
            total_questions: 4,
            correct_answers: 3,
            score,
            taken_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(Catalog::default(), dir.path().join("data.json"))
            .await
            .unwrap();
        assert!(store.quiz_attempts("a").await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        let store = JsonFileStore::open(Catalog::default(), &path).await.unwrap();
        store.append_quiz_attempt(&attempt("a", 75)).await.unwrap();
        store.append_quiz_attempt(&attempt("b", 50)).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(Catalog::default(), &path).await.unwrap();
        let attempts = reopened.quiz_attempts("a").await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].score, 75);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn failed_persist_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let store = JsonFileStore::open(Catalog::default(), &path).await.unwrap();
        store.append_quiz_attempt(&attempt("a", 75)).await.unwrap();

        // A directory in the way of the temporary file makes the write fail.
        let tmp = path.with_extension("json.tmp");
        std::fs::create_dir(&tmp).unwrap();
        let err = store.append_quiz_attempt(&attempt("a", 50)).await.unwrap_err();
        assert!(err.to_string().contains("data.json"));
        assert_eq!(store.quiz_attempts("a").await.unwrap().len(), 1);

        std::fs::remove_dir(&tmp).unwrap();
        store.append_quiz_attempt(&attempt("a", 50)).await.unwrap();
        assert_eq!(store.quiz_attempts("a").await.unwrap().len(), 2);

        let reopened = JsonFileStore::open(Catalog::default(), &path).await.unwrap();
        let scores: Vec<u32> = reopened
            .quiz_attempts("a")
            .await
            .unwrap()
            .iter()
            .map(|a| a.score)
            .collect();
        assert_eq!(scores, vec![75, 50]);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::open(Catalog::default(), &path)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert!(err.to_string().contains("data.json"));
    }
}

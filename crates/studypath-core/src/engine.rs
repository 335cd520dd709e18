//! Central study engine orchestrator.
//!
//! Every external operation validates its input, looks up the referenced
//! catalog item, runs the pure computation and writes the outcome through the
//! injected [`RecordStore`]. Writes end with a best-effort refresh of the
//! learner's progress snapshot, serialized per user.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StudyError, StudyResult};
use crate::grader::{grade_writing, WritingSubscores};
use crate::model::{ActivityRecord, ContentKind, ProgressSnapshot, QuizAttempt, WritingSubmission};
use crate::planner::{learning_plan, LearningPlan};
use crate::predictor::{predict_score, ScorePrediction};
use crate::quiz::{
    build_quiz, grade_answer_sheet, grade_quiz_answer, percent, QuizAnswer, QuizOutcome,
    QuizQuestion, QuizRequest, SheetAnswer, SheetOutcome, DEFAULT_QUIZ_SIZE,
};
use crate::report::ProgressReport;
use crate::scheduler::{schedule_quiz_outcome, schedule_review, ReviewOutcome};
use crate::statistics::{skill_proficiency, weak_points, LearnerRecords, SkillProficiency, WeakPoint};
use crate::traits::{Clock, RecordStore};

/// Configuration for the study engine.
#[derive(Debug, Clone)]
pub struct StudyEngineConfig {
    /// Quiz length when the caller does not ask for one.
    pub quiz_size: usize,
    /// Seed for quiz shuffling. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for StudyEngineConfig {
    fn default() -> Self {
        Self {
            quiz_size: DEFAULT_QUIZ_SIZE,
            rng_seed: None,
        }
    }
}

/// Result of a graded writing submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingOutcome {
    pub submission_id: Uuid,
    pub score: u32,
    pub subscores: WritingSubscores,
    /// Feedback remarks, one per line.
    pub feedback: String,
    pub submission_time: DateTime<Utc>,
}

/// Skills, weak points, plan and prediction computed from one read of the
/// learner's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyAnalysis {
    pub skills: SkillProficiency,
    pub weak_points: Vec<WeakPoint>,
    pub plan: LearningPlan,
    pub prediction: ScorePrediction,
}

/// The central study engine.
pub struct StudyEngine {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    config: StudyEngineConfig,
    rng: Mutex<ChaCha8Rng>,
    user_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl StudyEngine {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, config: StudyEngineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            store,
            clock,
            config,
            rng: Mutex::new(rng),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Vocabulary
    // -----------------------------------------------------------------------

    /// Record whether the learner remembered a word and reschedule it.
    pub async fn submit_vocabulary_review(
        &self,
        user_id: &str,
        word_id: u64,
        remembered: bool,
    ) -> StudyResult<ReviewOutcome> {
        require_user(user_id)?;
        self.store
            .vocabulary_item(word_id)
            .await?
            .ok_or_else(|| StudyError::not_found(ContentKind::Vocabulary, word_id))?;

        let existing = self.store.review_record(user_id, word_id).await?;
        let outcome = schedule_review(existing.as_ref(), remembered, self.clock.now());
        self.store
            .save_review_record(&outcome.clone().into_record(user_id, word_id))
            .await?;

        tracing::info!(
            user = user_id,
            word_id,
            remembered,
            status = %outcome.status,
            review_count = outcome.review_count,
            "vocabulary review recorded"
        );
        self.refresh_after_write(user_id).await;
        Ok(outcome)
    }

    /// Build a multiple-choice vocabulary quiz. `count` defaults to the
    /// configured quiz size.
    pub async fn vocabulary_quiz(
        &self,
        user_id: &str,
        count: Option<usize>,
        difficulty: Option<u8>,
    ) -> StudyResult<Vec<QuizQuestion>> {
        require_user(user_id)?;
        let count = count.unwrap_or(self.config.quiz_size);
        if count == 0 {
            return Err(StudyError::Validation("quiz size must be positive".into()));
        }

        let (items, records) = futures::try_join!(
            self.store.vocabulary_items(),
            self.store.review_records(user_id)
        )?;

        let request = QuizRequest { count, difficulty };
        let questions = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            build_quiz(&items, &records, request, &mut *rng)
        };
        tracing::debug!(user = user_id, questions = questions.len(), "built vocabulary quiz");
        Ok(questions)
    }

    /// Grade quiz answers, reschedule every graded word and log the attempt.
    pub async fn submit_vocabulary_quiz(
        &self,
        user_id: &str,
        answers: &[QuizAnswer],
    ) -> StudyResult<QuizOutcome> {
        require_user(user_id)?;
        if answers.is_empty() {
            return Err(StudyError::Validation("no quiz answers submitted".into()));
        }

        let now = self.clock.now();
        let mut results = Vec::with_capacity(answers.len());
        for answer in answers {
            if answer.selected_option.is_empty() {
                continue;
            }
            let Some(item) = self.store.vocabulary_item(answer.word_id).await? else {
                tracing::debug!(word_id = answer.word_id, "skipping answer for unknown word");
                continue;
            };
            let result = grade_quiz_answer(&item, answer);

            let existing = self.store.review_record(user_id, item.id).await?;
            let outcome = schedule_quiz_outcome(existing.as_ref(), result.is_correct, now);
            self.store
                .save_review_record(&outcome.into_record(user_id, item.id))
                .await?;
            results.push(result);
        }

        let correct = results.iter().filter(|r| r.is_correct).count();
        let outcome = QuizOutcome {
            total_questions: answers.len() as u32,
            correct_answers: correct as u32,
            score: percent(correct, answers.len()),
            results,
        };
        self.store
            .append_quiz_attempt(&QuizAttempt {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                total_questions: outcome.total_questions,
                correct_answers: outcome.correct_answers,
                score: outcome.score,
                taken_at: now,
            })
            .await?;

        tracing::info!(
            user = user_id,
            score = outcome.score,
            correct = outcome.correct_answers,
            total = outcome.total_questions,
            "vocabulary quiz graded"
        );
        self.refresh_after_write(user_id).await;
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Listening, reading, writing
    // -----------------------------------------------------------------------

    pub async fn submit_listening_answers(
        &self,
        user_id: &str,
        listening_id: u64,
        answers: &[SheetAnswer],
    ) -> StudyResult<SheetOutcome> {
        require_user(user_id)?;
        let item = self
            .store
            .listening_item(listening_id)
            .await?
            .ok_or_else(|| StudyError::not_found(ContentKind::Listening, listening_id))?;
        let outcome = grade_answer_sheet(&item.questions, answers);
        self.record_attempt(user_id, ContentKind::Listening, listening_id, &outcome)
            .await?;
        Ok(outcome)
    }

    pub async fn submit_reading_answers(
        &self,
        user_id: &str,
        reading_id: u64,
        answers: &[SheetAnswer],
    ) -> StudyResult<SheetOutcome> {
        require_user(user_id)?;
        let item = self
            .store
            .reading_item(reading_id)
            .await?
            .ok_or_else(|| StudyError::not_found(ContentKind::Reading, reading_id))?;
        let outcome = grade_answer_sheet(&item.questions, answers);
        self.record_attempt(user_id, ContentKind::Reading, reading_id, &outcome)
            .await?;
        Ok(outcome)
    }

    async fn record_attempt(
        &self,
        user_id: &str,
        kind: ContentKind,
        item_id: u64,
        outcome: &SheetOutcome,
    ) -> StudyResult<()> {
        let record = ActivityRecord {
            user_id: user_id.to_string(),
            item_id,
            completed: true,
            score: outcome.score,
            last_attempt: self.clock.now(),
        };
        self.store.save_activity_record(kind, &record).await?;
        tracing::info!(
            user = user_id,
            item_id,
            kind = %kind,
            score = outcome.score,
            "answer sheet graded"
        );
        self.refresh_after_write(user_id).await;
        Ok(())
    }

    /// Grade a writing answer and append it to the learner's history.
    pub async fn submit_writing_answer(
        &self,
        user_id: &str,
        writing_id: u64,
        answer_text: &str,
    ) -> StudyResult<WritingOutcome> {
        require_user(user_id)?;
        if answer_text.trim().is_empty() {
            return Err(StudyError::Validation("answer text is empty".into()));
        }
        let prompt = self
            .store
            .writing_prompt(writing_id)
            .await?
            .ok_or_else(|| StudyError::not_found(ContentKind::Writing, writing_id))?;

        let grade = grade_writing(answer_text, &prompt);
        let submission = WritingSubmission {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            writing_id,
            answer_text: answer_text.to_string(),
            score: grade.score,
            feedback: grade.feedback,
            submission_time: self.clock.now(),
        };
        self.store.append_writing_submission(&submission).await?;

        tracing::info!(user = user_id, writing_id, score = grade.score, "writing graded");
        self.refresh_after_write(user_id).await;

        Ok(WritingOutcome {
            submission_id: submission.id,
            score: submission.score,
            subscores: grade.subscores,
            feedback: submission.feedback.join("\n"),
            submission_time: submission.submission_time,
        })
    }

    // -----------------------------------------------------------------------
    // Analytics
    // -----------------------------------------------------------------------

    pub async fn skills(&self, user_id: &str) -> StudyResult<SkillProficiency> {
        require_user(user_id)?;
        let records = self.load_records(user_id).await?;
        Ok(skill_proficiency(&records.activity()))
    }

    pub async fn weak_points(&self, user_id: &str) -> StudyResult<Vec<WeakPoint>> {
        let skills = self.skills(user_id).await?;
        Ok(weak_points(&skills.current))
    }

    pub async fn learning_path(&self, user_id: &str) -> StudyResult<LearningPlan> {
        let points = self.weak_points(user_id).await?;
        Ok(learning_plan(&points))
    }

    pub async fn predicted_score(&self, user_id: &str) -> StudyResult<ScorePrediction> {
        let skills = self.skills(user_id).await?;
        Ok(predict_score(&skills.current))
    }

    /// Skills, weak points, plan and prediction from a single read.
    pub async fn analysis(&self, user_id: &str) -> StudyResult<StudyAnalysis> {
        require_user(user_id)?;
        let records = self.load_records(user_id).await?;
        Ok(analyse(&records))
    }

    /// Full progress report for export and comparison.
    pub async fn report(&self, user_id: &str) -> StudyResult<ProgressReport> {
        require_user(user_id)?;
        let records = self.load_records(user_id).await?;
        let now = self.clock.now();
        let analysis = analyse(&records);
        Ok(ProgressReport {
            id: Uuid::new_v4(),
            created_at: now,
            user: user_id.to_string(),
            skills: analysis.skills,
            weak_points: analysis.weak_points,
            plan: analysis.plan,
            prediction: analysis.prediction,
            snapshot: records.snapshot(user_id, now),
        })
    }

    // -----------------------------------------------------------------------
    // Progress snapshot
    // -----------------------------------------------------------------------

    /// The learner's snapshot, recomputed from records.
    ///
    /// The cached copy is returned as is when it still matches the records.
    /// A missing or stale cache is rewritten; failing to rewrite it is logged
    /// and the fresh snapshot is returned anyway.
    pub async fn progress(&self, user_id: &str) -> StudyResult<ProgressSnapshot> {
        require_user(user_id)?;
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let records = self.load_records(user_id).await?;
        let fresh = records.snapshot(user_id, self.clock.now());
        let cached = self.store.snapshot(user_id).await?;
        if let Some(cached) = cached.filter(|c| same_progress(c, &fresh)) {
            return Ok(cached);
        }

        if let Err(e) = self.store.save_snapshot(&fresh).await {
            tracing::warn!(user = user_id, "stale progress snapshot not rewritten: {e:#}");
        }
        Ok(fresh)
    }

    /// Recompute the snapshot from records and store it.
    pub async fn refresh_progress(&self, user_id: &str) -> StudyResult<ProgressSnapshot> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let records = self.load_records(user_id).await?;
        let snapshot = records.snapshot(user_id, self.clock.now());
        self.store.save_snapshot(&snapshot).await?;
        tracing::debug!(user = user_id, "progress snapshot refreshed");
        Ok(snapshot)
    }

    async fn refresh_after_write(&self, user_id: &str) {
        if let Err(e) = self.refresh_progress(user_id).await {
            tracing::warn!(user = user_id, "progress snapshot refresh failed: {e:#}");
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.user_locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(user_id.to_string()).or_default())
    }

    async fn load_records(&self, user_id: &str) -> StudyResult<LearnerRecords> {
        let (reviews, listening, reading, writing, quizzes) = futures::try_join!(
            self.store.review_records(user_id),
            self.store.activity_records(user_id, ContentKind::Listening),
            self.store.activity_records(user_id, ContentKind::Reading),
            self.store.writing_submissions(user_id),
            self.store.quiz_attempts(user_id),
        )?;
        Ok(LearnerRecords {
            reviews,
            listening,
            reading,
            writing,
            quizzes,
        })
    }
}

fn analyse(records: &LearnerRecords) -> StudyAnalysis {
    let skills = skill_proficiency(&records.activity());
    let weak_points = weak_points(&skills.current);
    let plan = learning_plan(&weak_points);
    let prediction = predict_score(&skills.current);
    tracing::debug!(
        predicted = prediction.predicted_score,
        confidence = prediction.confidence,
        weak = weak_points.len(),
        "analysed learner records"
    );
    StudyAnalysis {
        skills,
        weak_points,
        plan,
        prediction,
    }
}

/// Equal per-domain progress, ignoring when each snapshot was taken.
fn same_progress(a: &ProgressSnapshot, b: &ProgressSnapshot) -> bool {
    a.vocabulary == b.vocabulary
        && a.listening == b.listening
        && a.reading == b.reading
        && a.writing == b.writing
}

fn require_user(user_id: &str) -> StudyResult<()> {
    if user_id.trim().is_empty() {
        return Err(StudyError::Validation("user id is empty".into()));
    }
    Ok(())
}

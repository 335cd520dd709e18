//! Core data model types for studypath.
//!
//! Catalog content (vocabulary, listening, reading, writing) is immutable
//! reference data. Per-user records are what the learner produces; every
//! derived artifact is recomputed from them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

/// A study domain. Declaration order is the tie-break order used when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Vocabulary,
    Listening,
    Reading,
    Writing,
    /// Synthetic domain derived from reading and writing; it has no records.
    Translation,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Vocabulary,
        Domain::Listening,
        Domain::Reading,
        Domain::Writing,
        Domain::Translation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Vocabulary => "vocabulary",
            Domain::Listening => "listening",
            Domain::Reading => "reading",
            Domain::Writing => "writing",
            Domain::Translation => "translation",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vocabulary" | "vocab" => Ok(Domain::Vocabulary),
            "listening" => Ok(Domain::Listening),
            "reading" => Ok(Domain::Reading),
            "writing" => Ok(Domain::Writing),
            "translation" => Ok(Domain::Translation),
            other => Err(format!("unknown domain: {other}")),
        }
    }
}

/// Which catalog table an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Vocabulary,
    Listening,
    Reading,
    Writing,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Vocabulary => write!(f, "vocabulary item"),
            ContentKind::Listening => write!(f, "listening item"),
            ContentKind::Reading => write!(f, "reading item"),
            ContentKind::Writing => write!(f, "writing prompt"),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog content
// ---------------------------------------------------------------------------

/// A vocabulary word with its reference definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: u64,
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Difficulty tier, 1 is easiest.
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
}

/// One multiple-choice question attached to a listening or reading item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// The correct option, compared case-insensitively.
    pub answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// A listening passage and its questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListeningItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub audio_url: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default = "default_listening_kind")]
    pub kind: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A reading passage and its questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingItem {
    pub id: u64,
    pub title: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default = "default_reading_kind")]
    pub kind: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Writing task format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingKind {
    #[default]
    Essay,
    Chart,
    Letter,
}

impl fmt::Display for WritingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritingKind::Essay => write!(f, "essay"),
            WritingKind::Chart => write!(f, "chart"),
            WritingKind::Letter => write!(f, "letter"),
        }
    }
}

impl FromStr for WritingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "essay" => Ok(WritingKind::Essay),
            "chart" => Ok(WritingKind::Chart),
            "letter" => Ok(WritingKind::Letter),
            other => Err(format!("unknown writing kind: {other}")),
        }
    }
}

/// A writing prompt. The topic text drives relevance scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingPrompt {
    pub id: u64,
    pub title: String,
    pub topic: String,
    #[serde(default)]
    pub kind: WritingKind,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
}

/// All reference content a learner can study.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyItem>,
    #[serde(default)]
    pub listening: Vec<ListeningItem>,
    #[serde(default)]
    pub reading: Vec<ReadingItem>,
    #[serde(default)]
    pub writing: Vec<WritingPrompt>,
}

impl Catalog {
    /// Append another catalog's content to this one.
    pub fn merge(&mut self, other: Catalog) {
        self.vocabulary.extend(other.vocabulary);
        self.listening.extend(other.listening);
        self.reading.extend(other.reading);
        self.writing.extend(other.writing);
    }

    pub fn item_count(&self) -> usize {
        self.vocabulary.len() + self.listening.len() + self.reading.len() + self.writing.len()
    }
}

fn default_difficulty() -> u8 {
    1
}

fn default_listening_kind() -> String {
    "short".to_string()
}

fn default_reading_kind() -> String {
    "careful".to_string()
}

// ---------------------------------------------------------------------------
// Learner records
// ---------------------------------------------------------------------------

/// Mastery status of one vocabulary item for one learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    New,
    Learning,
    Mastered,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::New => write!(f, "new"),
            ReviewStatus::Learning => write!(f, "learning"),
            ReviewStatus::Mastered => write!(f, "mastered"),
        }
    }
}

/// Spaced-repetition state of one word for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub user_id: String,
    pub word_id: u64,
    pub status: ReviewStatus,
    pub last_review: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
    pub review_count: u32,
}

/// Latest listening or reading attempt of one learner on one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub user_id: String,
    pub item_id: u64,
    pub completed: bool,
    /// 0–100.
    pub score: u32,
    pub last_attempt: DateTime<Utc>,
}

/// One graded writing submission. History is retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingSubmission {
    pub id: Uuid,
    pub user_id: String,
    pub writing_id: u64,
    pub answer_text: String,
    pub score: u32,
    pub feedback: Vec<String>,
    pub submission_time: DateTime<Utc>,
}

/// One graded vocabulary quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub user_id: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score: u32,
    pub taken_at: DateTime<Utc>,
}

/// Count and rounded average score for one domain in the progress cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainProgress {
    pub count: u32,
    pub score: u32,
}

/// Per-user progress cache. Always recomputable from the learner records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub user_id: String,
    pub vocabulary: DomainProgress,
    pub listening: DomainProgress,
    pub reading: DomainProgress,
    pub writing: DomainProgress,
    pub last_update: DateTime<Utc>,
}

//! Skill aggregation and weak-point detection.
//!
//! Raw per-domain history is reduced to a [`DomainActivity`] (row count,
//! completed count, average score), then to a 0–100 proficiency per domain.
//! Translation has no records of its own and is derived from reading and
//! writing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    ActivityRecord, Domain, DomainProgress, ProgressSnapshot, QuizAttempt, ReviewRecord,
    ReviewStatus, WritingSubmission,
};

/// Proficiency below which a domain counts as a weak point.
pub const MASTERY_THRESHOLD: u32 = 60;

/// Highest target proficiency ever suggested.
pub const TARGET_CEILING: u32 = 90;

/// Share of the proficiency that comes from the completion rate.
const COMPLETION_WEIGHT: f64 = 0.4;
const SCORE_WEIGHT: f64 = 0.6;

/// Row counts and average score for one domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainActivity {
    pub total: u32,
    pub completed: u32,
    /// Mean of the score-like field over rows where it is positive.
    pub average_score: f64,
}

impl DomainActivity {
    /// `round(0.4 × completion rate + 0.6 × average score)`, 0 with no rows.
    pub fn proficiency(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let completion_rate = f64::from(self.completed) / f64::from(self.total) * 100.0;
        (completion_rate * COMPLETION_WEIGHT + self.average_score * SCORE_WEIGHT).round() as u32
    }

    /// Vocabulary: mastered words count as completed and the review count
    /// stands in for a score.
    pub fn from_reviews(records: &[ReviewRecord]) -> Self {
        Self {
            total: records.len() as u32,
            completed: records
                .iter()
                .filter(|r| r.status == ReviewStatus::Mastered)
                .count() as u32,
            average_score: positive_mean(records.iter().map(|r| f64::from(r.review_count))),
        }
    }

    /// Listening or reading attempts.
    pub fn from_attempts(records: &[ActivityRecord]) -> Self {
        Self {
            total: records.len() as u32,
            completed: records.iter().filter(|r| r.completed).count() as u32,
            average_score: positive_mean(records.iter().map(|r| f64::from(r.score))),
        }
    }

    /// Writing: any submission with a positive score counts as completed.
    pub fn from_submissions(submissions: &[WritingSubmission]) -> Self {
        Self {
            total: submissions.len() as u32,
            completed: submissions.iter().filter(|s| s.score > 0).count() as u32,
            average_score: positive_mean(submissions.iter().map(|s| f64::from(s.score))),
        }
    }
}

fn positive_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .filter(|v| *v > 0.0)
        .fold((0.0, 0u32), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / f64::from(n)
    }
}

/// Activity for the four recorded domains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub vocabulary: DomainActivity,
    pub listening: DomainActivity,
    pub reading: DomainActivity,
    pub writing: DomainActivity,
}

impl ActivitySummary {
    pub fn from_records(
        reviews: &[ReviewRecord],
        listening: &[ActivityRecord],
        reading: &[ActivityRecord],
        writing: &[WritingSubmission],
    ) -> Self {
        Self {
            vocabulary: DomainActivity::from_reviews(reviews),
            listening: DomainActivity::from_attempts(listening),
            reading: DomainActivity::from_attempts(reading),
            writing: DomainActivity::from_submissions(writing),
        }
    }
}

/// One 0–100 value per domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillScores {
    pub vocabulary: u32,
    pub listening: u32,
    pub reading: u32,
    pub writing: u32,
    pub translation: u32,
}

impl SkillScores {
    pub fn get(&self, domain: Domain) -> u32 {
        match domain {
            Domain::Vocabulary => self.vocabulary,
            Domain::Listening => self.listening,
            Domain::Reading => self.reading,
            Domain::Writing => self.writing,
            Domain::Translation => self.translation,
        }
    }

    /// `(domain, value)` pairs in domain order.
    pub fn iter(&self) -> impl Iterator<Item = (Domain, u32)> + '_ {
        Domain::ALL.into_iter().map(|d| (d, self.get(d)))
    }

    pub fn all_zero(&self) -> bool {
        self.iter().all(|(_, v)| v == 0)
    }

    fn map(&self, f: impl Fn(Domain, u32) -> u32) -> Self {
        Self {
            vocabulary: f(Domain::Vocabulary, self.vocabulary),
            listening: f(Domain::Listening, self.listening),
            reading: f(Domain::Reading, self.reading),
            writing: f(Domain::Writing, self.writing),
            translation: f(Domain::Translation, self.translation),
        }
    }
}

/// Current and target proficiency per domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillProficiency {
    pub current: SkillScores,
    pub target: SkillScores,
}

/// Points added to the current proficiency to form the target.
pub fn target_offset(domain: Domain) -> u32 {
    match domain {
        Domain::Vocabulary => 10,
        Domain::Listening => 15,
        Domain::Reading => 5,
        Domain::Writing => 20,
        Domain::Translation => 10,
    }
}

/// Reduce an activity summary to current and target proficiencies.
pub fn skill_proficiency(summary: &ActivitySummary) -> SkillProficiency {
    let reading = summary.reading.proficiency();
    let writing = summary.writing.proficiency();
    let current = SkillScores {
        vocabulary: summary.vocabulary.proficiency(),
        listening: summary.listening.proficiency(),
        reading,
        writing,
        translation: (f64::from(reading + writing) / 2.0).round() as u32,
    };
    let target = current.map(|d, v| (v + target_offset(d)).min(TARGET_CEILING));
    SkillProficiency { current, target }
}

/// Population standard deviation. Returns 0 for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

// ---------------------------------------------------------------------------
// Progress snapshot
// ---------------------------------------------------------------------------

/// Every record a learner owns, as read from the store.
#[derive(Debug, Clone, Default)]
pub struct LearnerRecords {
    pub reviews: Vec<ReviewRecord>,
    pub listening: Vec<ActivityRecord>,
    pub reading: Vec<ActivityRecord>,
    pub writing: Vec<WritingSubmission>,
    pub quizzes: Vec<QuizAttempt>,
}

impl LearnerRecords {
    pub fn activity(&self) -> ActivitySummary {
        ActivitySummary::from_records(&self.reviews, &self.listening, &self.reading, &self.writing)
    }

    /// Recompute the progress cache from scratch.
    pub fn snapshot(&self, user_id: &str, now: DateTime<Utc>) -> ProgressSnapshot {
        ProgressSnapshot {
            user_id: user_id.to_string(),
            vocabulary: DomainProgress {
                count: self.reviews.len() as u32,
                score: rounded_mean(self.quizzes.iter().map(|q| q.score)),
            },
            listening: completed_progress(&self.listening),
            reading: completed_progress(&self.reading),
            writing: DomainProgress {
                count: self.writing.len() as u32,
                score: rounded_mean(self.writing.iter().map(|s| s.score)),
            },
            last_update: now,
        }
    }
}

fn completed_progress(records: &[ActivityRecord]) -> DomainProgress {
    let completed: Vec<u32> = records.iter().filter(|r| r.completed).map(|r| r.score).collect();
    DomainProgress {
        count: completed.len() as u32,
        score: rounded_mean(completed.into_iter()),
    }
}

fn rounded_mean(values: impl Iterator<Item = u32>) -> u32 {
    let (sum, n) = values.fold((0u64, 0u64), |(sum, n), v| (sum + u64::from(v), n + 1));
    if n == 0 {
        0
    } else {
        (sum as f64 / n as f64).round() as u32
    }
}

// ---------------------------------------------------------------------------
// Weak points
// ---------------------------------------------------------------------------

/// A domain below the mastery threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeakPoint {
    pub domain: Domain,
    pub score: u32,
    /// `MASTERY_THRESHOLD - score`, always positive.
    pub priority: u32,
}

/// Domains below the threshold, largest deficit first, ties in domain order.
pub fn weak_points(current: &SkillScores) -> Vec<WeakPoint> {
    let mut points: Vec<WeakPoint> = current
        .iter()
        .filter(|(_, score)| *score < MASTERY_THRESHOLD)
        .map(|(domain, score)| WeakPoint {
            domain,
            score,
            priority: MASTERY_THRESHOLD - score,
        })
        .collect();
    // Stable sort keeps domain order among equal priorities.
    points.sort_by(|a, b| b.priority.cmp(&a.priority));
    points
}

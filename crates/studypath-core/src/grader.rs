//! Heuristic writing grader.
//!
//! Five independent sub-scores (length, complexity, relevance, structure,
//! accuracy), each worth at most 25 points, are summed and clamped to 100.
//! Grading is a pure function of the answer text and the prompt.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::WritingPrompt;

/// Cap for each sub-score.
pub const SUBSCORE_MAX: u32 = 25;

/// Linking phrases rewarded by the complexity sub-score (case-sensitive).
static COMPLEXITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"not only.*but also",
        r"either.*or",
        r"neither.*nor",
        r"as well as",
        r"such as",
        r"for example",
        r"however",
        r"therefore",
        r"in addition",
        r"on the other hand",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Common mistakes; every occurrence costs two accuracy points.
static MISTAKE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bi am\b",
        r"(?i)\byou is\b",
        r"(?i)\bthey is\b",
        r"(?i)\bhe are\b",
        r"(?i)\bshe are\b",
        r"(?i)\bwe is\b",
        r"(?i)\bit are\b",
        r"(?i)\bcan not\b",
        r"(?i)\bdo not\b",
        r"(?i)\bhave not\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static INTRODUCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(with|the|nowadays|recently|as|when|if)").unwrap());

// Matched against the start of the text, same as the introduction.
static CONCLUSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(in conclusion|to sum up|in summary|all in all|therefore)").unwrap()
});

/// Per-criterion points for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingSubscores {
    pub length: u32,
    pub complexity: u32,
    pub relevance: u32,
    pub structure: u32,
    pub accuracy: u32,
}

impl WritingSubscores {
    /// Sum of all criteria, clamped to 100.
    pub fn total(&self) -> u32 {
        (self.length + self.complexity + self.relevance + self.structure + self.accuracy).min(100)
    }
}

/// Score and ordered feedback for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingGrade {
    pub score: u32,
    pub subscores: WritingSubscores,
    pub feedback: Vec<String>,
}

/// Raw text measurements shared by scoring and feedback.
#[derive(Debug, Clone, Copy)]
struct TextAnalysis {
    word_count: usize,
    char_count: usize,
    complexity_matches: u32,
    topic_keywords: usize,
    matched_keywords: usize,
    has_introduction: bool,
    has_conclusion: bool,
    mistakes: u32,
}

impl TextAnalysis {
    fn of(answer: &str, prompt: &WritingPrompt) -> Self {
        let trimmed = answer.trim();
        let lowered = answer.to_lowercase();

        let topic = prompt.topic.to_lowercase();
        let keywords: Vec<&str> = topic
            .split_whitespace()
            .filter(|w| w.chars().count() > 3)
            .collect();
        let matched_keywords = keywords.iter().filter(|k| lowered.contains(*k)).count();

        Self {
            word_count: trimmed.split_whitespace().count(),
            char_count: answer.chars().count(),
            complexity_matches: COMPLEXITY_PATTERNS
                .iter()
                .filter(|p| p.is_match(answer))
                .count() as u32,
            topic_keywords: keywords.len(),
            matched_keywords,
            has_introduction: INTRODUCTION.is_match(trimmed),
            has_conclusion: CONCLUSION.is_match(trimmed),
            mistakes: MISTAKE_PATTERNS
                .iter()
                .map(|p| p.find_iter(answer).count() as u32)
                .sum(),
        }
    }

    fn subscores(&self) -> WritingSubscores {
        let length = match self.word_count {
            120..=180 => 25,
            100..=119 | 181..=200 => 20,
            _ => 10,
        };

        let mut structure = 0;
        if self.has_introduction {
            structure += 8;
        }
        if self.char_count > 100 {
            structure += 8;
        }
        if self.has_conclusion {
            structure += 9;
        }

        WritingSubscores {
            length,
            complexity: (self.complexity_matches * 2).min(SUBSCORE_MAX),
            relevance: (self.matched_keywords as u32 * 5).min(SUBSCORE_MAX),
            structure,
            accuracy: SUBSCORE_MAX.saturating_sub(self.mistakes.saturating_mul(2)),
        }
    }

    /// Share of topic keywords found in the answer. `None` when the topic has
    /// no keyword long enough to count.
    fn keyword_ratio(&self) -> Option<f64> {
        (self.topic_keywords > 0).then(|| self.matched_keywords as f64 / self.topic_keywords as f64)
    }
}

/// Grade a writing submission against its prompt.
pub fn grade_writing(answer: &str, prompt: &WritingPrompt) -> WritingGrade {
    let analysis = TextAnalysis::of(answer, prompt);
    let subscores = analysis.subscores();
    let score = subscores.total();
    let feedback = feedback_for(&analysis, score);

    tracing::debug!(
        writing_id = prompt.id,
        score,
        words = analysis.word_count,
        "graded writing submission"
    );

    WritingGrade {
        score,
        subscores,
        feedback,
    }
}

fn feedback_for(analysis: &TextAnalysis, score: u32) -> Vec<String> {
    let mut feedback = Vec::with_capacity(7);

    feedback.push(
        match score {
            90.. => "Excellent: the essay is well developed, clearly organised and accurately expressed.",
            80..=89 => "Good: the essay shows solid content and a sound command of the language.",
            70..=79 => "Fair: the essay meets the basic requirements but leaves room to improve.",
            60..=69 => "Pass: the essay only just meets the requirements; more practice is needed.",
            _ => "Needs improvement: the essay falls short of the requirements; keep practising.",
        }
        .to_string(),
    );

    feedback.push(
        if analysis.word_count < 120 {
            "Length: too short; develop your points with more supporting detail."
        } else if analysis.word_count > 180 {
            "Length: too long; tighten the content to keep it focused."
        } else {
            "Length: the essay length is appropriate."
        }
        .to_string(),
    );

    if !analysis.has_introduction {
        feedback.push(
            "Structure: open with a clear introduction that leads into the topic.".to_string(),
        );
    }
    if !analysis.has_conclusion {
        feedback.push(
            "Structure: finish with a conclusion that sums up your main points.".to_string(),
        );
    }

    feedback.push(
        if analysis.complexity_matches < 3 {
            "Language: use more linking words and complex sentence patterns for variety."
        } else {
            "Language: good range of linking words and sentence patterns."
        }
        .to_string(),
    );

    // An empty keyword list never triggers the relevance suggestion.
    let off_topic = analysis.keyword_ratio().is_some_and(|r| r < 0.5);
    feedback.push(
        if off_topic {
            "Content: stay closer to the prompt so that every paragraph addresses the topic."
        } else {
            "Content: the essay addresses the prompt well."
        }
        .to_string(),
    );

    feedback.push(
        "Next steps: read model essays to collect useful expressions, practise under timed \
         conditions, and proofread for grammar and spelling."
            .to_string(),
    );

    feedback
}

//! Exam score prediction from current proficiencies.

use serde::{Deserialize, Serialize};

use crate::statistics::{population_std_dev, SkillScores};

/// Full marks of the exam.
pub const SCALE_POINTS: f64 = 710.0;

/// Section weights of the exam's 710-point scale.
pub const LISTENING_POINTS: f64 = 249.0;
pub const READING_POINTS: f64 = 249.0;
pub const WRITING_POINTS: f64 = 106.5;
pub const TRANSLATION_POINTS: f64 = 106.5;

const BASE_CONFIDENCE: i32 = 70;
const NO_DATA_CONFIDENCE: u32 = 30;
const CONFIDENCE_STEP: i32 = 15;

/// Per-section predicted points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub listening: u32,
    pub reading: u32,
    pub writing: u32,
    pub translation: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.listening + self.reading + self.writing + self.translation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePrediction {
    pub predicted_score: u32,
    pub breakdown: ScoreBreakdown,
    /// 0–100.
    pub confidence: u32,
    /// `0.25 v + 0.35 l + 0.35 r + 0.15 w + 0.15 t`. The weights sum to 1.25,
    /// so this can exceed 100. Informational only; it does not feed
    /// `predicted_score`.
    pub weighted_composite: f64,
    /// `weighted_composite` mapped onto the 710-point scale, up to 888.
    pub composite_score: u32,
}

pub fn predict_score(current: &SkillScores) -> ScorePrediction {
    let breakdown = ScoreBreakdown {
        listening: section_points(current.listening, LISTENING_POINTS),
        reading: section_points(current.reading, READING_POINTS),
        writing: section_points(current.writing, WRITING_POINTS),
        translation: section_points(current.translation, TRANSLATION_POINTS),
    };

    let composite = weighted_composite(current);
    ScorePrediction {
        predicted_score: breakdown.total(),
        breakdown,
        confidence: confidence(current),
        weighted_composite: composite,
        composite_score: (composite / 100.0 * SCALE_POINTS).round() as u32,
    }
}

fn section_points(proficiency: u32, weight: f64) -> u32 {
    (f64::from(proficiency) / 100.0 * weight).round() as u32
}

/// 30 without data; otherwise 70, adjusted by the spread across domains.
pub fn confidence(current: &SkillScores) -> u32 {
    if current.all_zero() {
        return NO_DATA_CONFIDENCE;
    }
    let values: Vec<f64> = current.iter().map(|(_, v)| f64::from(v)).collect();
    let spread = population_std_dev(&values);

    let mut confidence = BASE_CONFIDENCE;
    if spread < 10.0 {
        confidence += CONFIDENCE_STEP;
    } else if spread > 30.0 {
        confidence -= CONFIDENCE_STEP;
    }
    confidence.clamp(0, 100) as u32
}

pub fn weighted_composite(current: &SkillScores) -> f64 {
    f64::from(current.vocabulary) * 0.25
        + f64::from(current.listening) * 0.35
        + f64::from(current.reading) * 0.35
        + f64::from(current.writing) * 0.15
        + f64::from(current.translation) * 0.15
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(v: u32, l: u32, r: u32, w: u32, t: u32) -> SkillScores {
        SkillScores {
            vocabulary: v,
            listening: l,
            reading: r,
            writing: w,
            translation: t,
        }
    }

    #[test]
    fn no_activity_predicts_zero_with_low_confidence() {
        let prediction = predict_score(&SkillScores::default());
        assert_eq!(prediction.predicted_score, 0);
        assert_eq!(prediction.breakdown, ScoreBreakdown::default());
        assert_eq!(prediction.confidence, 30);
    }

    #[test]
    fn perfect_scores_reach_the_scale_ceiling() {
        let prediction = predict_score(&scores(100, 100, 100, 100, 100));
        // 249 + 249 + round(106.5) + round(106.5) = 249 + 249 + 107 + 107
        assert_eq!(prediction.predicted_score, 712);
        assert_eq!(prediction.confidence, 85);
        assert!((prediction.weighted_composite - 125.0).abs() < 1e-9);
        assert_eq!(prediction.composite_score, 888);
    }

    #[test]
    fn composite_score_uses_the_exam_scale() {
        // 0.35 * 100 + 0.35 * 100 = 70 -> 70% of 710
        let prediction = predict_score(&scores(0, 100, 100, 0, 0));
        assert!((prediction.weighted_composite - 70.0).abs() < 1e-9);
        assert_eq!(prediction.composite_score, 497);
        assert_eq!(prediction.predicted_score, 498);
    }

    #[test]
    fn breakdown_rounds_each_section() {
        let prediction = predict_score(&scores(0, 0, 88, 0, 44));
        assert_eq!(prediction.breakdown.reading, 219);
        assert_eq!(prediction.breakdown.translation, 47);
        assert_eq!(prediction.predicted_score, 266);
    }

    #[test]
    fn wide_spread_lowers_confidence() {
        // values 0, 0, 88, 0, 44 -> std dev ~ 34.9
        assert_eq!(confidence(&scores(0, 0, 88, 0, 44)), 55);
        // moderate spread leaves the base untouched
        assert_eq!(confidence(&scores(40, 60, 50, 30, 40)), 70);
    }
}

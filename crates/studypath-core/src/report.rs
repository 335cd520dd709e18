//! Progress report types with JSON persistence and regression detection.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Domain, ProgressSnapshot};
use crate::planner::LearningPlan;
use crate::predictor::ScorePrediction;
use crate::statistics::{SkillProficiency, WeakPoint};

/// A learner's full progress at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// The learner the report describes.
    pub user: String,
    pub skills: SkillProficiency,
    pub weak_points: Vec<WeakPoint>,
    pub plan: LearningPlan,
    pub prediction: ScorePrediction,
    pub snapshot: ProgressSnapshot,
}

impl ProgressReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ProgressReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline. A domain whose current
    /// proficiency moved by more than `threshold` points is a regression or
    /// an improvement.
    pub fn compare(&self, baseline: &ProgressReport, threshold: f64) -> RegressionReport {
        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;

        for domain in Domain::ALL {
            let before = baseline.skills.current.get(domain);
            let after = self.skills.current.get(domain);
            let change = DomainChange {
                domain,
                baseline_score: before,
                current_score: after,
                delta: i64::from(after) - i64::from(before),
            };
            if (change.delta as f64) < -threshold {
                regressions.push(change);
            } else if (change.delta as f64) > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        RegressionReport {
            regressions,
            improvements,
            unchanged,
            baseline_predicted: baseline.prediction.predicted_score,
            current_predicted: self.prediction.predicted_score,
        }
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        let _ = writeln!(md, "# Progress report for {}\n", self.user);
        let _ = writeln!(
            md,
            "Generated {}\n",
            self.created_at.format("%Y-%m-%d %H:%M UTC")
        );

        md.push_str("## Skills\n\n");
        md.push_str("| Domain | Current | Target |\n");
        md.push_str("|--------|---------|--------|\n");
        for (domain, current) in self.skills.current.iter() {
            let _ = writeln!(
                md,
                "| {} | {} | {} |",
                domain,
                current,
                self.skills.target.get(domain)
            );
        }
        md.push('\n');

        md.push_str("## Weak points\n\n");
        if self.weak_points.is_empty() {
            md.push_str("None. Keep developing evenly.\n\n");
        } else {
            for w in &self.weak_points {
                let _ = writeln!(md, "- **{}**: {} (priority {})", w.domain, w.score, w.priority);
            }
            md.push('\n');
        }

        md.push_str("## Today\n\n");
        for a in &self.plan.today {
            let _ = writeln!(md, "- {} ({} min): {}", a.activity, a.duration, a.description);
        }
        md.push('\n');

        md.push_str("## Predicted score\n\n");
        let p = &self.prediction;
        let _ = writeln!(
            md,
            "**{}** (confidence {}%): listening {}, reading {}, writing {}, translation {}",
            p.predicted_score,
            p.confidence,
            p.breakdown.listening,
            p.breakdown.reading,
            p.breakdown.writing,
            p.breakdown.translation
        );

        md
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Domains whose proficiency went down.
    pub regressions: Vec<DomainChange>,
    /// Domains whose proficiency went up.
    pub improvements: Vec<DomainChange>,
    /// Domains with no significant change.
    pub unchanged: usize,
    pub baseline_predicted: u32,
    pub current_predicted: u32,
}

/// Proficiency movement for one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainChange {
    pub domain: Domain,
    pub baseline_score: u32,
    pub current_score: u32,
    pub delta: i64,
}

impl RegressionReport {
    /// Format the regression report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));
        md.push_str(&format!(
            "**Predicted score:** {} -> {}\n\n",
            self.baseline_predicted, self.current_predicted
        ));

        if !self.regressions.is_empty() {
            md.push_str("### Regressions\n\n");
            md.push_str("| Domain | Baseline | Current | Delta |\n");
            md.push_str("|--------|----------|---------|-------|\n");
            for r in &self.regressions {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    r.domain, r.baseline_score, r.current_score, r.delta
                ));
            }
            md.push('\n');
        }

        if !self.improvements.is_empty() {
            md.push_str("### Improvements\n\n");
            md.push_str("| Domain | Baseline | Current | Delta |\n");
            md.push_str("|--------|----------|---------|-------|\n");
            for i in &self.improvements {
                md.push_str(&format!(
                    "| {} | {} | {} | +{} |\n",
                    i.domain, i.baseline_score, i.current_score, i.delta
                ));
            }
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DomainProgress;
    use crate::planner::learning_plan;
    use crate::predictor::predict_score;
    use crate::statistics::{weak_points, SkillScores};

    fn make_report(current: SkillScores) -> ProgressReport {
        let weak = weak_points(&current);
        ProgressReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            user: "u1".into(),
            skills: SkillProficiency {
                current,
                target: current,
            },
            plan: learning_plan(&weak),
            weak_points: weak,
            prediction: predict_score(&current),
            snapshot: ProgressSnapshot {
                user_id: "u1".into(),
                vocabulary: DomainProgress::default(),
                listening: DomainProgress::default(),
                reading: DomainProgress::default(),
                writing: DomainProgress::default(),
                last_update: Utc::now(),
            },
        }
    }

    fn scores(v: u32, l: u32, r: u32, w: u32) -> SkillScores {
        SkillScores {
            vocabulary: v,
            listening: l,
            reading: r,
            writing: w,
            translation: (r + w) / 2,
        }
    }

    #[test]
    fn compare_identical_reports() {
        let baseline = make_report(scores(50, 60, 70, 40));
        let current = make_report(scores(50, 60, 70, 40));

        let report = current.compare(&baseline, 2.0);
        assert!(report.regressions.is_empty());
        assert!(report.improvements.is_empty());
        assert_eq!(report.unchanged, 5);
    }

    #[test]
    fn compare_with_regression_and_improvement() {
        let baseline = make_report(scores(50, 60, 70, 40));
        let current = make_report(scores(50, 45, 71, 60));

        let report = current.compare(&baseline, 2.0);
        assert_eq!(report.regressions.len(), 1);
        assert_eq!(report.regressions[0].domain, Domain::Listening);
        assert_eq!(report.regressions[0].delta, -15);
        // writing +20 and translation +10; reading +1 is within the threshold
        assert_eq!(report.improvements.len(), 2);
        assert!(report.has_regressions());
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(scores(10, 20, 30, 40));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = ProgressReport::load_json(&path).unwrap();

        assert_eq!(loaded.user, "u1");
        assert_eq!(loaded.skills, report.skills);
        assert_eq!(loaded.plan, report.plan);
    }

    #[test]
    fn markdown_output() {
        let baseline = make_report(scores(50, 60, 70, 40));
        let current = make_report(scores(50, 30, 70, 40));

        let md = current.compare(&baseline, 2.0).to_markdown();
        assert!(md.contains("Regressions"));
        assert!(md.contains("listening"));

        let md = current.to_markdown();
        assert!(md.contains("# Progress report for u1"));
        assert!(md.contains("| reading | 70 | 70 |"));
    }
}

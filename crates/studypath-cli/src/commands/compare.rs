//! The `studypath compare` command.

use std::path::PathBuf;

use anyhow::Result;

use studypath_core::report::ProgressReport;
use studypath_store::config::load_config_from;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: Option<f64>,
    fail_on_regression: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let threshold = match threshold {
        Some(t) => t,
        None => load_config_from(config_path.as_deref())?.regression_threshold,
    };
    anyhow::ensure!(threshold >= 0.0, "threshold must not be negative");

    let baseline = ProgressReport::load_json(&baseline_path)?;
    let current = ProgressReport::load_json(&current_path)?;
    if baseline.user != current.user {
        eprintln!(
            "Warning: comparing reports for different learners ({} vs {})",
            baseline.user, current.user
        );
    }

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );
            println!(
                "Predicted score: {} -> {}",
                report.baseline_predicted, report.current_predicted
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &report.regressions {
                    println!(
                        "  {} {} -> {} ({:+})",
                        r.domain, r.baseline_score, r.current_score, r.delta
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} {} -> {} ({:+})",
                        i.domain, i.baseline_score, i.current_score, i.delta
                    );
                }
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}

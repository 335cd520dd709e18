//! HTML progress dashboard.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use studypath_core::planner::Priority;
use studypath_core::report::ProgressReport;
use studypath_core::statistics::{SkillProficiency, MASTERY_THRESHOLD};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML dashboard from a progress report.
pub fn generate_html(report: &ProgressReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(
        html,
        "<title>studypath progress: {}</title>",
        html_escape(&report.user)
    );
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>studypath progress</h1>\n");
    let _ = writeln!(
        html,
        "<p class=\"meta\">Learner: <strong>{}</strong> | predicted score <strong>{}</strong> ({}% confidence) | {}</p>",
        html_escape(&report.user),
        report.prediction.predicted_score,
        report.prediction.confidence,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    html.push_str("</header>\n");

    // Skills
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Skills</h2>\n");
    html.push_str(&generate_bar_chart(&report.skills));
    html.push_str("<table class=\"summary\" id=\"skills\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Domain</th><th onclick=\"sortTable(1)\">Current</th><th onclick=\"sortTable(2)\">Target</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (domain, current) in report.skills.current.iter() {
        let class = if current >= MASTERY_THRESHOLD {
            "pass"
        } else {
            "fail"
        };
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>",
            domain,
            class,
            current,
            report.skills.target.get(domain)
        );
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Weak points and plan
    html.push_str("<section class=\"plan\">\n");
    html.push_str("<h2>Weak points</h2>\n");
    if report.weak_points.is_empty() {
        html.push_str("<p>No domain is below the mastery threshold.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for w in &report.weak_points {
            let _ = writeln!(
                html,
                "<li><strong>{}</strong>: {} (priority {})</li>",
                w.domain, w.score, w.priority
            );
        }
        html.push_str("</ul>\n");
    }

    html.push_str("<h2>Today</h2>\n<ul>\n");
    for a in &report.plan.today {
        let _ = writeln!(
            html,
            "<li>{} ({} min): {}</li>",
            html_escape(&a.activity),
            a.duration,
            html_escape(&a.description)
        );
    }
    html.push_str("</ul>\n");

    html.push_str("<h2>This week</h2>\n");
    html.push_str("<table class=\"week\">\n");
    html.push_str("<thead><tr><th>Day</th><th>Focus</th><th>Activities</th></tr></thead>\n<tbody>\n");
    for day in &report.plan.this_week {
        let activities: Vec<String> = day
            .activities
            .iter()
            .map(|a| {
                let marker = match a.priority {
                    Priority::High => " class=\"high\"",
                    _ => "",
                };
                format!(
                    "<span{}>{} {}m</span>",
                    marker,
                    html_escape(&a.name),
                    a.duration
                )
            })
            .collect();
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            day.day,
            html_escape(&day.focus.to_string()),
            activities.join(", ")
        );
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Prediction
    let b = &report.prediction.breakdown;
    html.push_str("<section class=\"prediction\">\n");
    html.push_str("<h2>Predicted score</h2>\n");
    let _ = writeln!(
        html,
        "<p>Listening {} | Reading {} | Writing {} | Translation {} | <strong>Total {}</strong></p>",
        b.listening, b.reading, b.writing, b.translation, report.prediction.predicted_score
    );
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML dashboard to a file.
pub fn write_html_report(report: &ProgressReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Current proficiency bars with a tick at the target.
fn generate_bar_chart(skills: &SkillProficiency) -> String {
    let bar_height = 26usize;
    let padding = 8usize;
    let label_width = 110usize;
    let max_width = 400usize;
    let rows = skills.current.iter().count();
    let total_height = rows * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (domain, current)) in skills.current.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = current.min(100) as usize * max_width / 100;
        let target_x = label_width + skills.target.get(domain).min(100) as usize * max_width / 100;

        let color = if current >= 80 {
            "#22c55e"
        } else if current >= MASTERY_THRESHOLD {
            "#eab308"
        } else {
            "#ef4444"
        };

        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>",
            label_width - 10,
            y + bar_height / 2,
            domain
        );
        let _ = writeln!(
            svg,
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>",
            label_width, y, width, bar_height, color
        );
        let _ = writeln!(
            svg,
            "  <line x1=\"{0}\" y1=\"{1}\" x2=\"{0}\" y2=\"{2}\" stroke=\"currentColor\" stroke-width=\"2\"/>",
            target_x,
            y,
            y + bar_height
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}</text>",
            label_width + width.max(target_x - label_width) + 8,
            y + bar_height / 2,
            current
        );
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.high { font-weight: bold; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('skills');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = Number(va), nb = Number(vb);
    const cmp = isNaN(na) || isNaN(nb) ? va.localeCompare(vb) : na - nb;
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

//! The `studypath report` command.

use std::path::PathBuf;

use anyhow::Result;

use studypath_report::html::write_html_report;

use crate::commands::Session;
use crate::StoreArgs;

pub async fn execute(format: String, output: PathBuf, store: StoreArgs) -> Result<()> {
    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "markdown"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    if let Some(unknown) = formats
        .iter()
        .find(|f| !matches!(**f, "json" | "html" | "markdown" | "md"))
    {
        anyhow::bail!("unknown report format '{unknown}'");
    }

    let session = Session::open(&store).await?;
    let report = session.engine.report(&session.user).await?;

    std::fs::create_dir_all(&output)?;
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("progress-{timestamp}.json"));
                report.save_json(&path)?;
                println!("Report saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("progress-{timestamp}.html"));
                write_html_report(&report, &path)?;
                println!("HTML report: {}", path.display());
            }
            _ => {
                let path = output.join(format!("progress-{timestamp}.md"));
                std::fs::write(&path, report.to_markdown())?;
                println!("Markdown report: {}", path.display());
            }
        }
    }

    Ok(())
}

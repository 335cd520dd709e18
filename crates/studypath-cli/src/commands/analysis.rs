//! The `studypath skills`, `plan`, `predict` and `progress` commands.

use anyhow::Result;
use comfy_table::{Cell, Table};

use studypath_core::model::{Domain, DomainProgress};
use studypath_core::statistics::MASTERY_THRESHOLD;

use crate::commands::{print_json, wants_json, Session};
use crate::StoreArgs;

pub async fn skills(format: String, store: StoreArgs) -> Result<()> {
    let json = wants_json(&format)?;
    let session = Session::open(&store).await?;
    let skills = session.engine.skills(&session.user).await?;

    if json {
        return print_json(&skills);
    }

    let mut table = Table::new();
    table.set_header(vec!["Domain", "Current", "Target", "Status"]);
    for (domain, current) in skills.current.iter() {
        let status = if current >= MASTERY_THRESHOLD {
            "ok"
        } else {
            "weak"
        };
        table.add_row(vec![
            Cell::new(domain),
            Cell::new(current),
            Cell::new(skills.target.get(domain)),
            Cell::new(status),
        ]);
    }
    println!("Skills for {}", session.user);
    println!("{table}");
    Ok(())
}

pub async fn plan(format: String, store: StoreArgs) -> Result<()> {
    let json = wants_json(&format)?;
    let session = Session::open(&store).await?;
    let analysis = session.engine.analysis(&session.user).await?;

    if json {
        return print_json(&analysis.plan);
    }

    if analysis.weak_points.is_empty() {
        println!("No weak points.");
    } else {
        println!("Weak points:");
        for w in &analysis.weak_points {
            println!("  {} at {} (priority {})", w.domain, w.score, w.priority);
        }
    }

    println!("\nToday:");
    for a in &analysis.plan.today {
        println!("  {} ({} min): {}", a.activity, a.duration, a.description);
    }

    let mut table = Table::new();
    table.set_header(vec!["Day", "Focus", "Activities"]);
    for day in &analysis.plan.this_week {
        let activities: Vec<String> = day
            .activities
            .iter()
            .map(|a| format!("{} ({}m, {})", a.name, a.duration, a.priority))
            .collect();
        table.add_row(vec![
            Cell::new(&day.day),
            Cell::new(day.focus),
            Cell::new(activities.join("\n")),
        ]);
    }
    println!("\nThis week:\n{table}");

    println!("\nFocus areas:");
    for area in &analysis.plan.focus_areas {
        println!("  {}: {}", area.domain, area.suggestion);
    }
    Ok(())
}

pub async fn predict(format: String, store: StoreArgs) -> Result<()> {
    let json = wants_json(&format)?;
    let session = Session::open(&store).await?;
    let prediction = session.engine.predicted_score(&session.user).await?;

    if json {
        return print_json(&prediction);
    }

    let b = &prediction.breakdown;
    let mut table = Table::new();
    table.set_header(vec!["Section", "Points"]);
    table.add_row(vec![Cell::new(Domain::Listening), Cell::new(b.listening)]);
    table.add_row(vec![Cell::new(Domain::Reading), Cell::new(b.reading)]);
    table.add_row(vec![Cell::new(Domain::Writing), Cell::new(b.writing)]);
    table.add_row(vec![Cell::new(Domain::Translation), Cell::new(b.translation)]);
    println!("{table}");
    println!(
        "Predicted score: {} (confidence {}%)",
        prediction.predicted_score, prediction.confidence
    );
    Ok(())
}

pub async fn progress(refresh: bool, format: String, store: StoreArgs) -> Result<()> {
    let json = wants_json(&format)?;
    let session = Session::open(&store).await?;
    let snapshot = if refresh {
        session.engine.refresh_progress(&session.user).await?
    } else {
        session.engine.progress(&session.user).await?
    };

    if json {
        return print_json(&snapshot);
    }

    let rows: [(Domain, DomainProgress); 4] = [
        (Domain::Vocabulary, snapshot.vocabulary),
        (Domain::Listening, snapshot.listening),
        (Domain::Reading, snapshot.reading),
        (Domain::Writing, snapshot.writing),
    ];
    let mut table = Table::new();
    table.set_header(vec!["Domain", "Count", "Average score"]);
    for (domain, progress) in rows {
        table.add_row(vec![
            Cell::new(domain),
            Cell::new(progress.count),
            Cell::new(progress.score),
        ]);
    }
    println!("Progress for {}", session.user);
    println!("{table}");
    println!(
        "Last update: {}",
        snapshot.last_update.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

//! The `studypath write` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::commands::{print_json, wants_json, Session};
use crate::StoreArgs;

pub async fn execute(
    writing_id: u64,
    text: Option<String>,
    file: Option<PathBuf>,
    format: String,
    store: StoreArgs,
) -> Result<()> {
    let json = wants_json(&format)?;
    let answer = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read answer: {}", path.display()))?,
        (None, None) => anyhow::bail!("provide the answer with --text or --file"),
    };

    let session = Session::open(&store).await?;
    let outcome = session
        .engine
        .submit_writing_answer(&session.user, writing_id, &answer)
        .await?;

    if json {
        return print_json(&outcome);
    }

    let s = &outcome.subscores;
    println!("Score: {}/100", outcome.score);
    println!(
        "  length {} | complexity {} | relevance {} | structure {} | accuracy {}",
        s.length, s.complexity, s.relevance, s.structure, s.accuracy
    );
    println!();
    for line in outcome.feedback.lines() {
        println!("{line}");
    }
    Ok(())
}

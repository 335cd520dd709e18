//! The `studypath quiz` and `studypath quiz-submit` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use studypath_core::quiz::QuizAnswer;

use crate::commands::{print_json, wants_json, Session};
use crate::StoreArgs;

pub async fn execute(
    count: Option<usize>,
    difficulty: Option<u8>,
    format: String,
    store: StoreArgs,
) -> Result<()> {
    let json = wants_json(&format)?;
    let session = Session::open(&store).await?;
    let questions = session
        .engine
        .vocabulary_quiz(&session.user, count, difficulty)
        .await?;

    if json {
        return print_json(&questions);
    }
    if questions.is_empty() {
        println!("No vocabulary matches the request.");
        return Ok(());
    }

    for (i, q) in questions.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, q.word_id, q.question);
        for (letter, option) in ('A'..).zip(&q.options) {
            println!("   {letter}) {option}");
        }
    }
    println!("\nSubmit with: studypath quiz-submit --answers <file.json>");
    Ok(())
}

pub async fn submit(answers_path: PathBuf, format: String, store: StoreArgs) -> Result<()> {
    let json = wants_json(&format)?;
    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers: {}", answers_path.display()))?;
    let answers: Vec<QuizAnswer> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", answers_path.display()))?;

    let session = Session::open(&store).await?;
    let outcome = session
        .engine
        .submit_vocabulary_quiz(&session.user, &answers)
        .await?;

    if json {
        return print_json(&outcome);
    }

    let mut table = Table::new();
    table.set_header(vec!["Word", "Selected", "Correct answer", "Result"]);
    for r in &outcome.results {
        table.add_row(vec![
            Cell::new(&r.word),
            Cell::new(&r.selected_answer),
            Cell::new(&r.correct_answer),
            Cell::new(if r.is_correct { "OK" } else { "WRONG" }),
        ]);
    }
    println!("{table}");
    println!(
        "Score: {}% ({}/{} correct)",
        outcome.score, outcome.correct_answers, outcome.total_questions
    );
    Ok(())
}

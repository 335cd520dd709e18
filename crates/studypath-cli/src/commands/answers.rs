//! The `studypath listening` and `studypath reading` commands.

use anyhow::Result;
use comfy_table::{Cell, Table};

use studypath_core::quiz::SheetAnswer;

use crate::commands::{print_json, wants_json, Session};
use crate::StoreArgs;

#[derive(Debug, Clone, Copy)]
pub enum Section {
    Listening,
    Reading,
}

/// Parse `"1=A, 2=C"` into answer sheet entries.
pub fn parse_answers(s: &str) -> Result<Vec<SheetAnswer>> {
    s.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (id, answer) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("invalid answer '{pair}': expected question=answer"))?;
            let question_id = id
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("invalid question id: '{}'", id.trim()))?;
            Ok(SheetAnswer {
                question_id,
                selected_answer: answer.trim().to_string(),
            })
        })
        .collect()
}

pub async fn execute(
    section: Section,
    item_id: u64,
    answers: String,
    format: String,
    store: StoreArgs,
) -> Result<()> {
    let json = wants_json(&format)?;
    let answers = parse_answers(&answers)?;

    let session = Session::open(&store).await?;
    let outcome = match section {
        Section::Listening => {
            session
                .engine
                .submit_listening_answers(&session.user, item_id, &answers)
                .await?
        }
        Section::Reading => {
            session
                .engine
                .submit_reading_answers(&session.user, item_id, &answers)
                .await?
        }
    };

    if json {
        return print_json(&outcome);
    }

    let mut table = Table::new();
    table.set_header(vec!["Question", "Selected", "Correct answer", "Result"]);
    for r in &outcome.results {
        table.add_row(vec![
            Cell::new(r.question_id),
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

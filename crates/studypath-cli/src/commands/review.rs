//! The `studypath review` command.

use anyhow::Result;

use crate::commands::Session;
use crate::StoreArgs;

pub async fn execute(word_id: u64, remembered: bool, store: StoreArgs) -> Result<()> {
    let session = Session::open(&store).await?;
    let outcome = session
        .engine
        .submit_vocabulary_review(&session.user, word_id, remembered)
        .await?;

    println!(
        "Word {word_id}: {} (review {}), next review in {} day(s) on {}",
        outcome.status,
        outcome.review_count,
        outcome.interval_days,
        outcome.next_review.format("%Y-%m-%d")
    );
    Ok(())
}

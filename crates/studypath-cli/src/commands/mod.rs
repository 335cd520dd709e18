//! Subcommand implementations.

use std::sync::Arc;

use anyhow::Result;

use studypath_core::engine::{StudyEngine, StudyEngineConfig};
use studypath_core::SystemClock;
use studypath_store::config::load_config_from;
use studypath_store::{create_store, StudypathConfig};

use crate::StoreArgs;

pub mod analysis;
pub mod answers;
pub mod compare;
pub mod init;
pub mod quiz;
pub mod report;
pub mod review;
pub mod validate;
pub mod write;

/// An engine opened against the configured store, and the learner to act for.
pub struct Session {
    pub engine: StudyEngine,
    pub user: String,
}

impl Session {
    pub async fn open(args: &StoreArgs) -> Result<Self> {
        let config = resolve_config(args)?;
        let store = create_store(&config).await?;
        tracing::debug!("using {} store at {}", store.name(), config.data_file.display());

        let engine = StudyEngine::new(
            store,
            Arc::new(SystemClock),
            StudyEngineConfig {
                quiz_size: config.quiz_size,
                rng_seed: None,
            },
        );
        Ok(Self {
            engine,
            user: config.default_user,
        })
    }
}

fn resolve_config(args: &StoreArgs) -> Result<StudypathConfig> {
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(catalog) = &args.catalog {
        config.catalog = Some(catalog.clone());
    }
    if let Some(data) = &args.data {
        config.data_file = data.clone();
    }
    if let Some(user) = &args.user {
        config.default_user = user.clone();
    }
    Ok(config)
}

/// Whether `format` asks for JSON. Anything else prints text.
pub fn wants_json(format: &str) -> Result<bool> {
    match format {
        "json" => Ok(true),
        "text" => Ok(false),
        other => anyhow::bail!("unknown format '{other}' (expected text or json)"),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

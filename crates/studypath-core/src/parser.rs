//! TOML catalog parser.
//!
//! Loads study catalogs from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    Catalog, ListeningItem, Question, ReadingItem, VocabularyItem, WritingKind, WritingPrompt,
};

/// Intermediate TOML structure for parsing catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    catalog: TomlCatalogHeader,
    #[serde(default)]
    vocabulary: Vec<VocabularyItem>,
    #[serde(default)]
    listening: Vec<TomlListening>,
    #[serde(default)]
    reading: Vec<TomlReading>,
    #[serde(default)]
    writing: Vec<TomlWriting>,
}

#[derive(Debug, Deserialize)]
struct TomlCatalogHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

fn default_difficulty() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
struct TomlListening {
    id: u64,
    title: String,
    #[serde(default)]
    audio_url: String,
    #[serde(default = "default_difficulty")]
    difficulty: u8,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct TomlReading {
    id: u64,
    title: String,
    #[serde(default = "default_difficulty")]
    difficulty: u8,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct TomlWriting {
    id: u64,
    title: String,
    #[serde(default)]
    topic: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default = "default_difficulty")]
    difficulty: u8,
}

/// Parse a single TOML file into a `Catalog`.
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse a TOML string into a `Catalog` (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let writing = parsed
        .writing
        .into_iter()
        .map(|w| {
            let kind = w
                .kind
                .map(|k| k.parse::<WritingKind>().map_err(|e| anyhow::anyhow!("{}", e)))
                .transpose()?
                .unwrap_or_default();
            Ok(WritingPrompt {
                id: w.id,
                title: w.title,
                topic: w.topic,
                kind,
                difficulty: w.difficulty,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let listening = parsed
        .listening
        .into_iter()
        .map(|l| ListeningItem {
            id: l.id,
            title: l.title,
            audio_url: l.audio_url,
            difficulty: l.difficulty,
            kind: l.kind.unwrap_or_else(|| "short".to_string()),
            questions: l.questions,
        })
        .collect();

    let reading = parsed
        .reading
        .into_iter()
        .map(|r| ReadingItem {
            id: r.id,
            title: r.title,
            difficulty: r.difficulty,
            kind: r.kind.unwrap_or_else(|| "careful".to_string()),
            questions: r.questions,
        })
        .collect();

    Ok(Catalog {
        id: parsed.catalog.id,
        name: parsed.catalog.name,
        description: parsed.catalog.description,
        vocabulary: parsed.vocabulary,
        listening,
        reading,
        writing,
    })
}

/// Recursively load all `.toml` catalog files from a directory.
pub fn load_catalog_directory(dir: &Path) -> Result<Vec<Catalog>> {
    let mut catalogs = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            catalogs.extend(load_catalog_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_catalog(&path) {
                Ok(catalog) => catalogs.push(catalog),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(catalogs)
}

/// Load a catalog from a file, or merge every catalog found under a
/// directory.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.is_dir() {
        return parse_catalog(path);
    }
    let mut catalogs = load_catalog_directory(path)?.into_iter();
    let mut merged = catalogs
        .next()
        .with_context(|| format!("no catalog files found in {}", path.display()))?;
    for catalog in catalogs {
        merged.merge(catalog);
    }
    Ok(merged)
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item, as `"<section> <id>"` (if applicable).
    pub item: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn new(section: &str, id: u64, message: impl Into<String>) -> Self {
        Self {
            item: Some(format!("{section} {id}")),
            message: message.into(),
        }
    }
}

/// Validate a catalog for common issues.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    duplicate_ids(
        "vocabulary",
        catalog.vocabulary.iter().map(|v| v.id),
        &mut warnings,
    );
    duplicate_ids(
        "listening",
        catalog.listening.iter().map(|l| l.id),
        &mut warnings,
    );
    duplicate_ids("reading", catalog.reading.iter().map(|r| r.id), &mut warnings);
    duplicate_ids("writing", catalog.writing.iter().map(|w| w.id), &mut warnings);

    for item in &catalog.listening {
        check_questions("listening", item.id, &item.questions, &mut warnings);
    }
    for item in &catalog.reading {
        check_questions("reading", item.id, &item.questions, &mut warnings);
    }

    for prompt in &catalog.writing {
        if prompt.topic.trim().is_empty() {
            warnings.push(ValidationWarning::new(
                "writing",
                prompt.id,
                "topic is empty; relevance cannot be scored",
            ));
        }
    }

    for word in &catalog.vocabulary {
        if word.definition.trim().is_empty() {
            warnings.push(ValidationWarning::new(
                "vocabulary",
                word.id,
                "definition is empty",
            ));
        }
    }

    warnings
}

fn duplicate_ids(
    section: &str,
    ids: impl Iterator<Item = u64>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            warnings.push(ValidationWarning::new(
                section,
                id,
                format!("duplicate {section} ID: {id}"),
            ));
        }
    }
}

fn check_questions(
    section: &str,
    id: u64,
    questions: &[Question],
    warnings: &mut Vec<ValidationWarning>,
) {
    if questions.is_empty() {
        warnings.push(ValidationWarning::new(
            section,
            id,
            "has no questions and will always score 0",
        ));
    }
    for q in questions {
        let listed = q
            .options
            .iter()
            .any(|o| o.to_lowercase() == q.answer.to_lowercase());
        if !q.options.is_empty() && !listed {
            warnings.push(ValidationWarning::new(
                section,
                id,
                format!("question {}: answer '{}' is not among its options", q.id, q.answer),
            ));
        }
    }
}

//! The `studypath init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("studypath.toml").exists() {
        println!("studypath.toml already exists, skipping.");
    } else {
        std::fs::write("studypath.toml", SAMPLE_CONFIG)?;
        println!("Created studypath.toml");
    }

    std::fs::create_dir_all("catalogs")?;
    let example_path = std::path::Path::new("catalogs/example.toml");
    if example_path.exists() {
        println!("catalogs/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_CATALOG)?;
        println!("Created catalogs/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: studypath validate --catalog catalogs/example.toml");
    println!("  2. Run: studypath quiz");
    println!("  3. Run: studypath review 1");
    println!("  4. Run: studypath plan");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studypath configuration

catalog = "catalogs"
data_file = "studypath-data.json"
default_user = "learner"
quiz_size = 10

# Proficiency points a domain may drop before `studypath compare` flags it.
regression_threshold = 5.0
"#;

const EXAMPLE_CATALOG: &str = r#"[catalog]
id = "example"
name = "Example Catalog"
description = "A small catalog to get started"

[[vocabulary]]
id = 1
word = "abandon"
phonetic = "/əˈbændən/"
definition = "to leave somebody or something behind for good"
difficulty = 2

[[vocabulary]]
id = 2
word = "benefit"
definition = "an advantage that something gives you"
difficulty = 1

[[vocabulary]]
id = 3
word = "curious"
definition = "eager to know or learn something"
difficulty = 1

[[vocabulary]]
id = 4
word = "decline"
definition = "to become smaller, fewer or weaker"
difficulty = 2

[[listening]]
id = 1
title = "Library opening hours"
audio_url = "audio/library.mp3"
kind = "news"

[[listening.questions]]
id = 1
prompt = "When does the library close on Fridays?"
options = ["6 pm", "8 pm", "10 pm", "midnight"]
answer = "8 pm"

[[reading]]
id = 1
title = "The rise of urban gardens"
kind = "careful"

[[reading.questions]]
id = 1
prompt = "What is the main benefit of urban gardens mentioned in the passage?"
options = ["Cheaper rent", "Fresh local food", "Faster transport", "Quieter streets"]
answer = "Fresh local food"

[[writing]]
id = 1
title = "Online learning"
topic = "online learning shapes modern education"
kind = "essay"
"#;

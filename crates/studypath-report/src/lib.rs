//! studypath-report — Rendering of progress reports.
//!
//! JSON and markdown output live on [`studypath_core::report::ProgressReport`];
//! this crate adds the self-contained HTML dashboard.

pub mod html;

pub use html::{generate_html, write_html_report};

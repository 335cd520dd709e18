//! studypath-core — Review scheduling, writing grading, and skill analytics.
//!
//! This crate defines the data model, the record store trait, and the pure
//! computations (scheduler, grader, aggregator, planner, predictor) that the
//! rest of studypath builds on.

pub mod engine;
pub mod error;
pub mod grader;
pub mod model;
pub mod parser;
pub mod planner;
pub mod predictor;
pub mod quiz;
pub mod report;
pub mod scheduler;
pub mod statistics;
pub mod traits;

pub use engine::StudyEngine;
pub use error::StudyError;
pub use traits::{Clock, RecordStore, SystemClock};

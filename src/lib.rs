//! Derive velocity, displacement and summary insights from logged
//! accelerometer readings, and chart them.
//!
//! The pipeline is `source` (CSV in) → `recurrence` (derived columns) →
//! `insights` (reductions) → `output` (CSV out) → `charts` (SVG out), tied
//! together by [`pipeline::process`].

pub mod a1_notation;
pub mod charts;
pub mod config;
pub mod error;
pub mod insights;
pub mod logger;
pub mod output;
pub mod physics;
pub mod pipeline;
pub mod recurrence;
pub mod source;
pub mod types;

pub use config::{ProcessingConfig, VariableStore};
pub use error::{AccelError, Result};
pub use pipeline::{process, ProcessReport};
pub use types::{DerivedRow, Insights, Reading};

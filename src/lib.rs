//! Batch certificate generation.
//!
//! Fills a slide-deck template once per participant record and writes the
//! result to an output folder, either as the deck itself or converted to
//! PDF by an external renderer. The heavy lifting lives in three
//! collaborator crates:
//!
//! - `certmill-source`: participant records (CSV today)
//! - `certmill-deck`: the presentation package and its text runs
//! - `certmill-convert`: external PDF conversion
//!
//! This crate ties them together: sanitized deterministic file names,
//! per-record placeholder maps, failure containment and the final report.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod sanitize;

pub use config::{GeneratorConfig, OutputFormat};
pub use error::{BatchError, RecordError};
pub use pipeline::{run_batch, run_batch_with};
pub use render::{fill_placeholders, render_template, PlaceholderMap, ID_TOKEN, NAME_TOKEN};
pub use report::{BatchResult, RecordFailure};
pub use sanitize::{certificate_file_name, sanitize_component};

// Collaborator crates, re-exported for callers and tests.
pub use certmill_convert as convert;
pub use certmill_deck as deck;
pub use certmill_source as source;

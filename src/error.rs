// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

use certmill_convert::ConvertError;
use certmill_deck::DeckError;
use certmill_source::SourceError;

/// Errors that stop the batch before or instead of processing records.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("could not create output folder '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure of a single record. Caught at the per-record boundary, counted,
/// and never allowed to abort the batch.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("required field '{0}' is missing or empty")]
    MissingField(&'static str),

    #[error("template could not be used: {0}")]
    Template(#[from] DeckError),

    #[error("could not save '{path}': {source}")]
    Save { path: PathBuf, source: DeckError },

    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),
}

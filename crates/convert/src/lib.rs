//! Converter trait for turning finished documents into other formats.
//!
//! The generation pipeline always produces `.pptx`. Anything beyond that
//! (today, PDF) is delegated to a `Converter` implementation so the
//! pipeline never needs to know how the conversion happens.

use std::fmt::Debug;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

mod libreoffice;

pub use libreoffice::{LibreOfficeConverter, DEFAULT_TIMEOUT};

/// Error type for conversion operations.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("no PDF renderer found; install LibreOffice or put 'soffice' on the PATH")]
    RendererNotFound,

    #[error("conversion timed out after {0:?}")]
    Timeout(Duration),

    #[error("converter exited with {status}; stderr: {stderr}")]
    Failed {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    #[error("converter reported success but produced no output; stderr: {stderr}")]
    MissingOutput { stdout: String, stderr: String },

    #[error("I/O error during conversion: {0}")]
    Io(#[from] std::io::Error),
}

/// A trait for converting a saved document file into another format.
///
/// # Implementations
///
/// - `LibreOfficeConverter`: drives a headless LibreOffice install
///
/// # Example
///
/// ```ignore
/// let converter = LibreOfficeConverter::new();
/// converter.convert(Path::new("cert.pptx"), Path::new("cert.pdf"))?;
/// ```
pub trait Converter: Send + Sync + Debug {
    /// Convert `input` and write the result to `output`.
    ///
    /// `output`'s parent directory must already exist. An existing file at
    /// `output` is replaced. The result is staged away from `output` and
    /// only moved into place once the renderer has succeeded, so a failed
    /// conversion leaves a previous file as it was. No intermediate files
    /// remain anywhere else.
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// File extension of the produced format, without the dot.
    fn extension(&self) -> &'static str;

    /// Returns a human-readable name for this converter (for logging/debugging).
    fn name(&self) -> &'static str;
}

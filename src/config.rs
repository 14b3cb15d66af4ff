//! Batch settings and their built-in defaults.
//!
//! There is deliberately no configuration file or flag parsing in this
//! version; the defaults below mirror the folder layout the tool is shipped
//! with, and callers that need different paths build a [`GeneratorConfig`]
//! by hand.

use std::path::PathBuf;
use std::time::Duration;

/// Template location, relative to the working directory.
pub const DEFAULT_TEMPLATE: &str = "base/certificado_template.pptx";
/// Participant list location.
pub const DEFAULT_SOURCE: &str = "base/dados_participantes.csv";
/// Where generated certificates land.
pub const DEFAULT_OUTPUT_DIR: &str = "certificados_gerados";

/// What a batch run writes into the output folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Save the filled deck directly.
    Pptx,
    /// Convert each filled deck with an external renderer.
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pptx => "pptx",
            OutputFormat::Pdf => "pdf",
        }
    }
}

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub template: PathBuf,
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// Upper bound for a single external conversion.
    pub conversion_timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from(DEFAULT_TEMPLATE),
            source: PathBuf::from(DEFAULT_SOURCE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: OutputFormat::Pptx,
            conversion_timeout: certmill_convert::DEFAULT_TIMEOUT,
        }
    }
}

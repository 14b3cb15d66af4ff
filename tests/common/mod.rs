pub mod fixtures;

use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

use certmill::deck::Presentation;
use certmill::{GeneratorConfig, OutputFormat};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Builds a self-contained batch folder: template deck, participant CSV and
/// an output directory, all inside one temp dir.
pub fn batch_workspace(
    template_runs: &[&str],
    csv: &str,
) -> Result<(TempDir, GeneratorConfig), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let template = dir.path().join("certificado_template.pptx");
    fixtures::write_template(&template, template_runs)?;
    let source = dir.path().join("dados_participantes.csv");
    fs::write(&source, csv)?;

    let config = GeneratorConfig {
        template,
        source,
        output_dir: dir.path().join("certificados_gerados"),
        format: OutputFormat::Pptx,
        conversion_timeout: Duration::from_secs(5),
    };
    Ok((dir, config))
}

/// File names currently in the output folder, sorted.
pub fn output_files(config: &GeneratorConfig) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(&config.output_dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Every run text in the deck at `path`, slides in order.
pub fn deck_runs(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let deck = Presentation::open(path)?;
    let mut runs = Vec::new();
    for slide in deck.slides() {
        runs.extend(slide.text_runs());
    }
    Ok(runs)
}

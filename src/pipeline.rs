//! Sequential batch orchestration.
//!
//! One record at a time: extract fields, reload the template, substitute,
//! save, optionally convert. The template is reloaded from disk for every
//! record so no substituted value can leak into the next certificate.
//!
//! A failing record is logged, counted and skipped; only an unreadable
//! participant list (or an output folder that cannot be created) stops the
//! run.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use log::{info, warn};

use certmill_convert::{ConvertError, Converter, LibreOfficeConverter};
use certmill_source::{CsvRecordSource, Record, RecordSource};

use crate::config::{GeneratorConfig, OutputFormat};
use crate::error::{BatchError, RecordError};
use crate::render::{render_template, PlaceholderMap, ID_TOKEN, NAME_TOKEN};
use crate::report::{BatchResult, RecordFailure};
use crate::sanitize::certificate_file_name;

/// Runs a whole batch with the default converter.
pub fn run_batch(config: &GeneratorConfig) -> Result<BatchResult, BatchError> {
    let converter = LibreOfficeConverter::with_timeout(config.conversion_timeout);
    run_batch_with(config, &converter)
}

/// Runs a whole batch, delegating the conversion path to `converter`.
pub fn run_batch_with(
    config: &GeneratorConfig,
    converter: &dyn Converter,
) -> Result<BatchResult, BatchError> {
    let started = Instant::now();

    fs::create_dir_all(&config.output_dir).map_err(|source| BatchError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    info!(
        "[SOURCE] loading participant list from {}",
        config.source.display()
    );
    let mut source = CsvRecordSource::from_path(&config.source)?;
    println!("\nTotal de registros encontrados: {}", source.len());

    let mut result = process_records(&mut source, config, converter);
    result.elapsed = started.elapsed();
    info!(
        "[BATCH] finished in {:.2?}: {} ok, {} failed",
        result.elapsed,
        result.succeeded,
        result.failed()
    );
    Ok(result)
}

/// Drives generation for every record. Per-record errors are converted into
/// failure entries; this function itself never fails.
pub(crate) fn process_records(
    source: &mut dyn RecordSource,
    config: &GeneratorConfig,
    converter: &dyn Converter,
) -> BatchResult {
    let mut result = BatchResult::default();
    let total = match source.size_hint() {
        Some(n) => n.to_string(),
        None => "?".to_string(),
    };

    let mut position = 0usize;
    while let Some(record) = source.next() {
        position += 1;
        match process_record(&record, config, converter) {
            Ok(path) => {
                println!("→ Certificado gerado com sucesso!");
                info!("[BATCH] record {position}/{total} ok: {}", path.display());
                result.record_success();
            }
            Err(error) => {
                println!("ERRO ao processar linha {position}: {error}");
                warn!("[BATCH] record {position}/{total} failed: {error}");
                result.record_failure(RecordFailure {
                    row: position,
                    participant: participant_label(&record),
                    reason: error.to_string(),
                });
            }
        }
    }
    result
}

fn process_record(
    record: &Record,
    config: &GeneratorConfig,
    converter: &dyn Converter,
) -> Result<PathBuf, RecordError> {
    let name = required_field(record, "nome")?;
    let id = required_field(record, "numero")?;

    println!("\nProcessando: {name} (Certificado {id})");

    let map = PlaceholderMap::new()
        .with(NAME_TOKEN, name)
        .with(ID_TOKEN, id);
    let deck = render_template(&config.template, &map)?;

    match config.format {
        OutputFormat::Pptx => {
            let path = config
                .output_dir
                .join(certificate_file_name(id, name, OutputFormat::Pptx.extension()));
            println!("Tentando salvar em: {}", path.display());
            deck.save(&path).map_err(|source| RecordError::Save {
                path: path.clone(),
                source,
            })?;
            Ok(path)
        }
        OutputFormat::Pdf => {
            // The intermediate deck lives in its own staging directory; the
            // output folder only ever sees finished PDFs.
            let staging = tempfile::tempdir().map_err(ConvertError::Io)?;
            let staged = staging
                .path()
                .join(certificate_file_name(id, name, OutputFormat::Pptx.extension()));
            deck.save(&staged).map_err(|source| RecordError::Save {
                path: staged.clone(),
                source,
            })?;

            let path = config
                .output_dir
                .join(certificate_file_name(id, name, converter.extension()));
            println!("Tentando salvar em: {}", path.display());
            converter.convert(&staged, &path)?;
            Ok(path)
        }
    }
}

/// Extracts a mandatory field, trimmed. Whitespace-only counts as missing.
fn required_field<'r>(record: &'r Record, name: &'static str) -> Result<&'r str, RecordError> {
    let trimmed = record.field(name).map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(RecordError::MissingField(name));
    }
    Ok(trimmed)
}

/// Best identifier available for the failure report.
fn participant_label(record: &Record) -> String {
    for field in ["nome", "numero"] {
        if let Some(value) = record.field(field) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    "(sem identificação)".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use certmill_source::VecRecordSource;
    use std::time::Duration;

    fn record(row: usize, nome: &str, numero: &str) -> Record {
        Record::new(
            row,
            vec![
                ("nome".to_string(), nome.to_string()),
                ("numero".to_string(), numero.to_string()),
            ],
        )
    }

    #[test]
    fn test_required_field_trims_and_rejects_blank() {
        let r = record(1, "  Ana  ", "   ");
        assert_eq!(required_field(&r, "nome").unwrap(), "Ana");
        assert!(matches!(
            required_field(&r, "numero"),
            Err(RecordError::MissingField("numero"))
        ));
        assert!(matches!(
            required_field(&r, "turma"),
            Err(RecordError::MissingField("turma"))
        ));
    }

    #[test]
    fn test_participant_label_prefers_name_then_number() {
        assert_eq!(participant_label(&record(1, "Ana", "7")), "Ana");
        assert_eq!(participant_label(&record(1, "  ", "7")), "7");
        assert_eq!(participant_label(&record(1, " ", " ")), "(sem identificação)");
    }

    #[test]
    fn test_missing_template_fails_records_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            template: dir.path().join("absent.pptx"),
            source: dir.path().join("unused.csv"),
            output_dir: dir.path().join("out"),
            format: OutputFormat::Pptx,
            conversion_timeout: Duration::from_secs(1),
        };
        fs::create_dir_all(&config.output_dir).unwrap();
        let converter =
            LibreOfficeConverter::with_binary("/nonexistent/soffice", Duration::from_secs(1));

        let mut source = VecRecordSource::new(vec![record(1, "Ana", "1"), record(2, "Bia", "2")]);
        let result = process_records(&mut source, &config, &converter);

        assert_eq!(result.processed, 2);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.failed(), 2);
        assert_eq!(result.failures[0].row, 1);
        assert_eq!(result.failures[0].participant, "Ana");
        assert_eq!(result.failures[1].row, 2);
    }

    #[test]
    fn test_unreadable_source_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            template: dir.path().join("t.pptx"),
            source: dir.path().join("absent.csv"),
            output_dir: dir.path().join("out"),
            format: OutputFormat::Pptx,
            conversion_timeout: Duration::from_secs(1),
        };

        let result = run_batch(&config);
        assert!(matches!(result, Err(BatchError::Source(_))));
    }
}

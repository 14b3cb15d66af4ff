//! Batch outcome accounting and the end-of-run report.

use std::path::Path;
use std::time::Duration;

/// One failed record, keyed by its 1-based position in the source.
#[derive(Debug)]
pub struct RecordFailure {
    pub row: usize,
    /// Whatever identifies the participant best: name, number, or position.
    pub participant: String,
    pub reason: String,
}

/// Summary of a finished batch.
///
/// `processed == succeeded + failed()` holds as long as results are
/// recorded through [`record_success`](Self::record_success) and
/// [`record_failure`](Self::record_failure).
#[derive(Debug, Default)]
pub struct BatchResult {
    pub processed: usize,
    pub succeeded: usize,
    pub failures: Vec<RecordFailure>,
    pub elapsed: Duration,
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record_success(&mut self) {
        self.processed += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, failure: RecordFailure) {
        self.processed += 1;
        self.failures.push(failure);
    }
}

/// Formats the final report block printed after the last record.
pub fn render_summary(result: &BatchResult, output_dir: &Path) -> String {
    let ruler = "=".repeat(50);
    let mut out = String::new();
    out.push_str(&format!("\n{ruler}\n"));
    out.push_str("RELATÓRIO DE EXECUÇÃO\n");
    out.push_str(&format!(
        "Total de certificados processados: {}\n",
        result.processed
    ));
    out.push_str(&format!(
        "Certificados gerados com sucesso: {}\n",
        result.succeeded
    ));
    out.push_str(&format!("Erros encontrados: {}\n", result.failed()));
    if !result.failures.is_empty() {
        out.push_str("\nRegistros com falha:\n");
        for failure in &result.failures {
            out.push_str(&format!(
                "  - linha {}: {} ({})\n",
                failure.row, failure.participant, failure.reason
            ));
        }
    }
    out.push_str(&format!(
        "\nArquivos salvos em: {}\n",
        output_dir.display()
    ));
    out.push_str(&format!("Tempo total: {:.2?}\n", result.elapsed));
    out.push_str(&format!("{ruler}\n"));
    out
}

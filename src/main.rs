use std::process::ExitCode;

use env_logger::Env;
use log::{error, info};

use certmill::convert::LibreOfficeConverter;
use certmill::pipeline::run_batch_with;
use certmill::report::render_summary;
use certmill::{GeneratorConfig, OutputFormat};

/// Generates one certificate per participant, using the paths configured in
/// [`GeneratorConfig::default`].
fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = GeneratorConfig::default();
    let converter = LibreOfficeConverter::with_timeout(config.conversion_timeout);

    println!("Iniciando processo de geração de certificados...");
    println!("\nVerificando arquivos...");
    println!("Template existe? {}", config.template.is_file());
    println!("CSV existe? {}", config.source.is_file());
    if config.format == OutputFormat::Pdf {
        println!("Conversor PDF disponível? {}", converter.is_available());
        if let Some(binary) = converter.binary() {
            info!("[CONVERT] soffice: {}", binary.display());
        }
    }

    let code = match run_batch_with(&config, &converter) {
        Ok(result) => {
            let output_dir = std::path::absolute(&config.output_dir)
                .unwrap_or_else(|_| config.output_dir.clone());
            print!("{}", render_summary(&result, &output_dir));
            ExitCode::SUCCESS
        }
        Err(batch_error) => {
            error!("[BATCH] aborted: {batch_error}");
            eprintln!("\nERRO: {batch_error}");
            ExitCode::FAILURE
        }
    };

    hold_terminal();
    code
}

/// Keeps the window open when the tool is launched by double-click.
#[cfg(windows)]
fn hold_terminal() {
    println!("\nPressione ENTER para fechar esta janela...");
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}

#[cfg(not(windows))]
fn hold_terminal() {
    println!("\nO terminal fechará automaticamente em 30 segundos...");
    std::thread::sleep(std::time::Duration::from_secs(30));
}

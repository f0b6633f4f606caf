//! Bill-scan CLI: run the OCR pipeline against a receipt image and print the
//! extracted items plus the raw text as JSON for review before entry.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: homeboard <bill-image>");
        return ExitCode::from(2);
    };

    match run(&path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "tesseract")]
async fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    use homeboard_billscan::recognizer::tesseract_backend::TesseractRecognizer;
    use homeboard_billscan::{BillScanPipeline, EngineConfig};

    let engine = EngineConfig::from_env();
    tracing::info!(lang = %engine.lang, data_path = ?engine.data_path, "starting scan");

    let pipeline = BillScanPipeline::new(TesseractRecognizer::new(engine));
    let result = pipeline.scan_file(path).await?;

    let report = serde_json::json!({
        "scanned_at": chrono::Utc::now(),
        "source": path,
        "items": result.items,
        "raw_text": result.raw_text,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(not(feature = "tesseract"))]
async fn run(_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    Err("this build has no OCR engine; rebuild with `--features tesseract`, \
         or enter the items manually"
        .into())
}

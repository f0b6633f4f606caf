use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use homeboard_core::BillItem;

use crate::filter;
use crate::merge;
use crate::parse::LineParserCascade;
use crate::preprocess::{self, AdaptiveBinarizer, Binarizer, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::{OcrConfig, SegmentationMode};
use crate::validate;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The upload is not a decodable image. No partial result.
    #[error("unsupported image: {0}")]
    UnsupportedImage(String),
    /// The OCR engine is missing or misconfigured. Not retried here; callers
    /// should offer manual entry instead.
    #[error("OCR engine unavailable ({0}) — enter the items manually instead")]
    OcrUnavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PreprocessError> for ScanError {
    fn from(e: PreprocessError) -> Self {
        ScanError::UnsupportedImage(e.to_string())
    }
}

/// The result of one bill scan: the extracted items plus the merged raw text
/// for the caller's review screen.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub items: Vec<BillItem>,
    pub raw_text: String,
}

/// Bytes → normalized frame → multi-config OCR → merge → parse → validate →
/// dedup/cap. Stateless across invocations; each scan owns its buffers and
/// drops them on every exit path.
pub struct BillScanPipeline<R: OcrBackend> {
    recognizer: R,
    binarizer: Box<dyn Binarizer>,
    cascade: LineParserCascade,
}

impl<R: OcrBackend> BillScanPipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self::with_binarizer(recognizer, Box::new(AdaptiveBinarizer::default()))
    }

    /// Construct with an explicit binarization strategy, e.g.
    /// [`crate::preprocess::GlobalMeanBinarizer`] as the degraded fallback.
    pub fn with_binarizer(recognizer: R, binarizer: Box<dyn Binarizer>) -> Self {
        BillScanPipeline {
            recognizer,
            binarizer,
            cascade: LineParserCascade::default(),
        }
    }

    /// Scan an image file on disk.
    pub async fn scan_file(&self, path: &Path) -> Result<ScanResult, ScanError> {
        let bytes = tokio::fs::read(path).await?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        self.scan_bytes(&bytes, content_type_for_extension(&ext))
    }

    /// Scan raw upload bytes with their declared MIME type.
    pub fn scan_bytes(&self, data: &[u8], content_type: &str) -> Result<ScanResult, ScanError> {
        if !content_type.starts_with("image/") {
            return Err(ScanError::UnsupportedImage(format!(
                "expected an image upload, got {content_type}"
            )));
        }
        if data.is_empty() {
            return Err(ScanError::UnsupportedImage("empty file".to_string()));
        }

        let frame = preprocess::normalize_from_bytes(data, self.binarizer.as_ref())?;
        let png = preprocess::encode_png(&frame)?;
        // The pixel buffer is not needed during the slow OCR passes.
        drop(frame);

        let raw_text = self.recognize_all(&png)?;

        let candidates = self.cascade.parse_text(&raw_text);
        let validated: Vec<BillItem> = candidates
            .into_iter()
            .filter(validate::accepts)
            .map(BillItem::from)
            .collect();
        let items = filter::cap_outliers(filter::dedup(validated));

        Ok(ScanResult { items, raw_text })
    }

    /// Run every configured OCR pass and reconcile the candidates. A failing
    /// pass becomes an empty candidate; only a missing engine is fatal.
    fn recognize_all(&self, png: &[u8]) -> Result<String, ScanError> {
        let mut candidates = Vec::new();
        for config in OcrConfig::scan_sequence() {
            match self.recognizer.recognize(png, &config) {
                Ok(text) => {
                    debug!(mode = ?config.mode, bytes = text.len(), "ocr pass complete");
                    candidates.push(text);
                }
                Err(OcrError::EngineUnavailable(msg)) => {
                    return Err(ScanError::OcrUnavailable(msg));
                }
                Err(OcrError::RecognitionFailed(msg)) => {
                    warn!(mode = ?config.mode, error = %msg, "ocr pass failed, skipping");
                    candidates.push(String::new());
                }
            }
        }

        match merge::merge_candidates(&candidates) {
            Some(text) => Ok(text),
            None => {
                // Every pass came back blank. One unrestricted re-run so the
                // caller always receives a text document, even an empty one.
                let retry = OcrConfig::unrestricted(SegmentationMode::UniformBlock);
                match self.recognizer.recognize(png, &retry) {
                    Ok(text) => Ok(text),
                    Err(OcrError::EngineUnavailable(msg)) => Err(ScanError::OcrUnavailable(msg)),
                    Err(OcrError::RecognitionFailed(_)) => Ok(String::new()),
                }
            }
        }
    }
}

fn content_type_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

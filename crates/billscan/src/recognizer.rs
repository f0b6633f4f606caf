use std::collections::HashMap;
use thiserror::Error;

use crate::types::{OcrConfig, SegmentationMode};

#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine is missing or misconfigured. Fatal for the whole scan.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),
    /// One recognition attempt failed. The pipeline treats it as an empty
    /// candidate and moves on to the next configuration.
    #[error("recognition failed: {0}")]
    RecognitionFailed(String),
}

/// Abstraction over an OCR engine. Implementations take PNG bytes of a
/// normalized frame plus one configuration and return the recognized text.
/// The call may block for a while; it is the pipeline's only slow point.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_png: &[u8], config: &OcrConfig) -> Result<String, OcrError>;
}

/// Where the engine lives, resolved once at process start and handed to the
/// recognizer — never a lazily mutated global.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Tessdata directory; `None` lets the engine use its compiled-in default.
    pub data_path: Option<String>,
    pub lang: String,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        EngineConfig {
            data_path: std::env::var("TESSDATA_PREFIX").ok(),
            lang: "eng".to_string(),
        }
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns preset text per segmentation mode — lets the pipeline and merge
/// logic be exercised without a Tesseract install.
pub struct MockRecognizer {
    by_mode: HashMap<SegmentationMode, String>,
    fallback: String,
}

impl MockRecognizer {
    /// Same text for every configuration.
    pub fn uniform(text: impl Into<String>) -> Self {
        MockRecognizer { by_mode: HashMap::new(), fallback: text.into() }
    }

    /// Override the text returned for one mode.
    pub fn with_mode(mut self, mode: SegmentationMode, text: impl Into<String>) -> Self {
        self.by_mode.insert(mode, text.into());
        self
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_png: &[u8], config: &OcrConfig) -> Result<String, OcrError> {
        Ok(self
            .by_mode
            .get(&config.mode)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{EngineConfig, OcrBackend, OcrError};
    use crate::types::OcrConfig;
    use leptess::{LepTess, Variable};

    pub struct TesseractRecognizer {
        config: EngineConfig,
    }

    impl TesseractRecognizer {
        pub fn new(config: EngineConfig) -> Self {
            Self { config }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_png: &[u8], config: &OcrConfig) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.config.data_path.as_deref(), &self.config.lang)
                .map_err(|e| OcrError::EngineUnavailable(e.to_string()))?;
            lt.set_variable(Variable::TesseditPagesegMode, &config.mode.psm().to_string())
                .map_err(|e| OcrError::RecognitionFailed(e.to_string()))?;
            if let Some(whitelist) = &config.whitelist {
                lt.set_variable(Variable::TesseditCharWhitelist, whitelist)
                    .map_err(|e| OcrError::RecognitionFailed(e.to_string()))?;
            }
            lt.set_image_from_mem(image_png)
                .map_err(|e| OcrError::RecognitionFailed(e.to_string()))?;
            lt.get_utf8_text()
                .map_err(|e| OcrError::RecognitionFailed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OcrConfig;

    #[test]
    fn mock_returns_fallback_for_unmapped_modes() {
        let r = MockRecognizer::uniform("MILK 30.00");
        let cfg = OcrConfig::whitelisted(SegmentationMode::SparseText);
        assert_eq!(r.recognize(b"png", &cfg).unwrap(), "MILK 30.00");
    }

    #[test]
    fn mock_per_mode_override_wins() {
        let r = MockRecognizer::uniform("fallback")
            .with_mode(SegmentationMode::Automatic, "unrestricted pass");
        let auto = OcrConfig::unrestricted(SegmentationMode::Automatic);
        let block = OcrConfig::whitelisted(SegmentationMode::UniformBlock);
        assert_eq!(r.recognize(b"", &auto).unwrap(), "unrestricted pass");
        assert_eq!(r.recognize(b"", &block).unwrap(), "fallback");
    }

    #[test]
    fn engine_config_from_env_targets_english() {
        assert_eq!(EngineConfig::from_env().lang, "eng");
    }
}

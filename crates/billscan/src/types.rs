use serde::{Deserialize, Serialize};

/// Page layout hint handed to the OCR engine (PSM, in Tesseract terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMode {
    /// Single uniform block of text — suits single-column grocery receipts.
    UniformBlock,
    /// Sparse text — suits itemized lists with irregular spacing.
    SparseText,
    /// Sparse text with orientation and script detection, for skewed photos.
    SparseTextOsd,
    /// Single column of variable-size text.
    SingleColumn,
    /// Fully automatic segmentation, no orientation detection.
    Automatic,
}

impl SegmentationMode {
    pub fn psm(self) -> u32 {
        match self {
            SegmentationMode::UniformBlock => 6,
            SegmentationMode::SparseText => 11,
            SegmentationMode::SparseTextOsd => 12,
            SegmentationMode::SingleColumn => 4,
            SegmentationMode::Automatic => 3,
        }
    }
}

/// Characters worth recognizing on a retail receipt: digits, ASCII letters,
/// price punctuation and the rupee/dollar currency glyphs.
pub const RECEIPT_CHAR_WHITELIST: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz.,:;-$₹ /";

/// One OCR attempt: a segmentation mode plus an optional character whitelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub mode: SegmentationMode,
    pub whitelist: Option<String>,
}

impl OcrConfig {
    pub fn whitelisted(mode: SegmentationMode) -> Self {
        OcrConfig {
            mode,
            whitelist: Some(RECEIPT_CHAR_WHITELIST.to_string()),
        }
    }

    pub fn unrestricted(mode: SegmentationMode) -> Self {
        OcrConfig { mode, whitelist: None }
    }

    /// The fixed attempt sequence run against every bill image. The final
    /// unrestricted pass catches characters the whitelisted passes reject;
    /// receipts are adversarial inputs and the redundancy is deliberate.
    pub fn scan_sequence() -> Vec<OcrConfig> {
        vec![
            OcrConfig::whitelisted(SegmentationMode::UniformBlock),
            OcrConfig::whitelisted(SegmentationMode::SparseText),
            OcrConfig::whitelisted(SegmentationMode::SparseTextOsd),
            OcrConfig::whitelisted(SegmentationMode::SingleColumn),
            OcrConfig::unrestricted(SegmentationMode::Automatic),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psm_mapping_matches_tesseract_modes() {
        assert_eq!(SegmentationMode::UniformBlock.psm(), 6);
        assert_eq!(SegmentationMode::SparseText.psm(), 11);
        assert_eq!(SegmentationMode::SparseTextOsd.psm(), 12);
        assert_eq!(SegmentationMode::SingleColumn.psm(), 4);
        assert_eq!(SegmentationMode::Automatic.psm(), 3);
    }

    #[test]
    fn scan_sequence_is_five_configs_last_unrestricted() {
        let seq = OcrConfig::scan_sequence();
        assert_eq!(seq.len(), 5);
        assert!(seq[..4].iter().all(|c| c.whitelist.is_some()));
        assert_eq!(seq[4].mode, SegmentationMode::Automatic);
        assert!(seq[4].whitelist.is_none());
    }

    #[test]
    fn whitelist_covers_currency_glyphs() {
        assert!(RECEIPT_CHAR_WHITELIST.contains('₹'));
        assert!(RECEIPT_CHAR_WHITELIST.contains('$'));
    }
}

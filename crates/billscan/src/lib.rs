// Compiled-once regex cache, shared by the parse and validate modules.
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod filter;
pub mod merge;
pub mod parse;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;
pub mod validate;

pub use parse::{LineParserCascade, LineStrategy};
pub use pipeline::{BillScanPipeline, ScanError, ScanResult};
pub use preprocess::{AdaptiveBinarizer, Binarizer, GlobalMeanBinarizer, PreprocessError};
pub use recognizer::{EngineConfig, MockRecognizer, OcrBackend, OcrError};
pub use types::{OcrConfig, SegmentationMode, RECEIPT_CHAR_WHITELIST};

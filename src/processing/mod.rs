//! Document processing pipeline: classification, extraction, segmentation, and abstraction.

pub mod classify;
pub mod extract;
pub mod normalize;
pub mod segment;
mod service;
pub mod summarize;
pub mod table;
pub mod tabular;
pub mod types;

pub use classify::{ContentSniffer, MagicSniffer, NoSniffer, classify};
pub use service::{DocumentProcessor, ProcessingApi, UNSUPPORTED_FILE_TYPE, collect_documents};
pub use types::{Abstraction, FactualData, FileType, ProcessingResult, Structure};

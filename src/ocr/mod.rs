//! OCR Module
//!
//! Converts uploaded images into text.
//!
//! Supports multiple backends, tried in configured order:
//! - Tesseract (local CLI)
//! - Ollama vision models (local LLM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scrawl_server::ocr::OcrService;
//!
//! let service = OcrService::from_config(&config.ocr);
//! let result = service.recognize(&png_bytes).await?;
//! println!("{}", result.text);
//! ```

mod provider;
mod service;
mod types;

pub use provider::{OcrProviderTrait, OllamaProvider, TesseractProvider};
pub use service::OcrService;
pub use types::{OcrError, OcrProvider, OcrResult};

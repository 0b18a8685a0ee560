//! Upload intake
//!
//! Reads the multipart submission, validates every file before anything is
//! stored, then persists accepted files to blob storage with a metadata row.
//!
//! Flow:
//! 1. Collect `files` parts from the request
//! 2. Reject the whole batch if any file breaks a limit
//! 3. Store each file under `{user or ip}/{millis}-{name}` and record it
//! 4. Extract its text, by PDF text layer or OCR

pub mod dispatch;
pub mod intake;
pub mod types;

pub use dispatch::{extract_text, join_texts};
pub use intake::{read_files, validate_files, UploadIntake};
pub use types::*;

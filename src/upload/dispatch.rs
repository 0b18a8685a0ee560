//! Routes each stored file to the matching text extractor

use crate::error::Result;
use crate::pdf;
use crate::state::AppState;

use super::types::IncomingFile;

/// Extract text from one file
///
/// PDFs use their embedded text layer. Images go through the OCR service,
/// which enforces the configured timeout.
pub async fn extract_text(state: &AppState, file: &IncomingFile) -> Result<String> {
    if file.is_pdf() {
        let text = pdf::extract_text(state.pdf().clone(), file.data.clone()).await?;
        tracing::debug!(file = %file.file_name, chars = text.len(), "Extracted PDF text");
        return Ok(text);
    }

    let result = state.ocr().recognize(&file.data).await?;
    tracing::debug!(
        file = %file.file_name,
        provider = ?result.provider,
        confidence = result.confidence,
        "Recognized image text"
    );
    Ok(result.text)
}

/// Join per-file texts with a blank line between them
pub fn join_texts<I, S>(texts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    texts
        .into_iter()
        .map(|text| text.as_ref().trim().to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_texts() {
        assert_eq!(join_texts(["  first ", "second\n"]), "first\n\nsecond");
        assert_eq!(join_texts(["only"]), "only");
        assert_eq!(join_texts(["", "tail"]), "tail");
        assert_eq!(join_texts(Vec::<String>::new()), "");
    }
}

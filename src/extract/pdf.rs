//! PDF text extraction strategy.

use super::ExtractionError;

/// Extract the concatenated page text of a PDF document.
///
/// Glyph substitution and layout reconstruction are delegated to `pdf-extract`;
/// the output is normalized by trimming lines and collapsing blank runs so the
/// length gate downstream measures real content rather than whitespace.
pub(super) fn extract_text(file: &str, data: &[u8]) -> Result<String, ExtractionError> {
    let raw = pdf_extract::extract_text_from_mem(data).map_err(|error| {
        ExtractionError::Malformed {
            file: file.to_string(),
            reason: error.to_string(),
        }
    })?;

    Ok(normalize(&raw))
}

fn normalize(raw: &str) -> String {
    raw.replace('\0', "")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

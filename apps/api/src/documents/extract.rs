use crate::errors::AppError;

/// Extracts plain text from an in-memory PDF, concatenated in page order.
/// Layout and structure are not preserved.
///
/// Unparseable PDFs and PDFs with no extractable text are both validation
/// errors: nothing is persisted for them.
pub fn extract_pdf_text(data: &[u8]) -> Result<String, AppError> {
    let text = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| AppError::Validation(format!("Could not parse PDF: {e}")))?;

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not extract text from PDF".to_string(),
        ));
    }

    Ok(text)
}

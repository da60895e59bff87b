//! Interview question generation from job-description text.

use crate::errors::AppError;
use crate::interview::prompts::{QUESTION_PROMPT_TEMPLATE, QUESTION_SYSTEM};
use crate::llm_client::LlmClient;

/// Number of questions generated per interview session.
pub const QUESTION_COUNT: usize = 3;

const QUESTION_MAX_TOKENS: u32 = 300;

/// Prompts the LLM with the concatenated JD text and returns the raw
/// newline-separated question blob, exactly as it will be persisted in the
/// session's first assistant turn. LLM failure is fatal to the request.
pub async fn generate_questions(jd_text: &str, llm: &LlmClient) -> Result<String, AppError> {
    let prompt = QUESTION_PROMPT_TEMPLATE
        .replace("{question_count}", &QUESTION_COUNT.to_string())
        .replace("{jd_text}", jd_text);
    llm.call(&prompt, QUESTION_SYSTEM, QUESTION_MAX_TOKENS)
        .await
        .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))
}

/// Splits a stored question blob into an ordered question list: one question
/// per line, blank lines discarded.
pub fn split_questions(blob: &str) -> Vec<String> {
    blob.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_one_question_per_line() {
        let blob = "What is ownership in Rust?\nTell me about a conflict you resolved.\nHow would you design a rate limiter?";
        let questions = split_questions(blob);
        assert_eq!(questions.len(), QUESTION_COUNT);
        assert_eq!(questions[0], "What is ownership in Rust?");
        assert_eq!(questions[2], "How would you design a rate limiter?");
    }

    #[test]
    fn test_split_discards_blank_lines() {
        let blob = "\nFirst question?\n\n  \nSecond question?\n\n";
        let questions = split_questions(blob);
        assert_eq!(
            questions,
            vec!["First question?".to_string(), "Second question?".to_string()]
        );
    }

    #[test]
    fn test_split_trims_whitespace_and_carriage_returns() {
        let blob = "  First question?  \r\nSecond question?\r\n";
        let questions = split_questions(blob);
        assert_eq!(questions[0], "First question?");
        assert_eq!(questions[1], "Second question?");
    }

    #[test]
    fn test_split_empty_blob_yields_no_questions() {
        assert!(split_questions("").is_empty());
        assert!(split_questions("\n\n").is_empty());
    }
}

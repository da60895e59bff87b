// All LLM prompt constants for the Interview module.

/// System prompt for question generation.
pub const QUESTION_SYSTEM: &str =
    "You are an experienced interviewer preparing a mock interview. \
    You generate sharp, role-specific interview questions from a job description. \
    Respond with the questions only. \
    Do NOT include numbering, preamble, or commentary.";

/// Question generation prompt template.
/// Replace `{question_count}` and `{jd_text}` before sending.
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Based on the following job description, generate exactly {question_count} interview questions: a mix of technical and behavioral.

Return the questions as plain text with exactly one question per line, separated by newline characters. No blank lines, no numbering.

JOB DESCRIPTION:
"""
{jd_text}
""""#;

/// System prompt for answer evaluation.
pub const EVALUATION_SYSTEM: &str =
    "You are an expert technical interviewer evaluating a candidate's answer. \
    Be constructive and specific. \
    You MUST respond in the exact SCORE/FEEDBACK format you are given. \
    Do NOT include any text outside that format.";

/// Answer evaluation prompt template.
/// Replace: `{question}`, `{answer}`, `{context}`.
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"A candidate was asked the following question:
"""
{question}
"""

The candidate gave this answer:
"""
{answer}
"""

Here is the *only* context you have from their resume:
"""
{context}
"""

Evaluate the candidate's answer based only on their response and the provided resume context.

Your response MUST be in this exact format:
SCORE: [a score from 1-10]
FEEDBACK: [feedback in 100 words or less. Be constructive. Explain why you gave the score, referencing the resume context if possible.]"#;

/// Substituted for `{context}` when similarity retrieval returns nothing.
pub const NO_CONTEXT_PLACEHOLDER: &str = "No relevant resume context was found.";

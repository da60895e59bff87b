//! Similarity ranking over chunk embeddings. Pure functions, no I/O.
//!
//! The corpus here is a handful of resume chunks, so retrieval is a linear
//! scan with cosine similarity — no index.

/// How many chunks are retrieved as context for answer evaluation.
pub const CONTEXT_TOP_K: usize = 2;

/// Cosine similarity between two vectors.
///
/// Degenerate inputs (length mismatch, zero magnitude — e.g. the empty-vector
/// sentinel left by a failed embedding) return `f32::NEG_INFINITY` so they
/// sort strictly below every real similarity instead of dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return f32::NEG_INFINITY;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return f32::NEG_INFINITY;
    }

    dot / (mag_a * mag_b)
}

/// Returns the texts of the top-`k` candidates by descending cosine
/// similarity to `query`. Ties keep original input order (stable sort).
/// An empty candidate set yields an empty result.
pub fn top_k_texts(query: &[f32], candidates: &[(String, Vec<f32>)], k: usize) -> Vec<String> {
    let mut scored: Vec<(usize, f32)> = candidates
        .iter()
        .enumerate()
        .map(|(i, (_, vector))| (i, cosine_similarity(query, vector)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(k)
        .map(|(i, _)| candidates[i].0.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(pairs: &[(&str, &[f32])]) -> Vec<(String, Vec<f32>)> {
        pairs
            .iter()
            .map(|(text, v)| (text.to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn test_identical_vectors_score_one() {
        let v = [0.3, -0.5, 0.8];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6, "similarity was {sim}");
    }

    #[test]
    fn test_orthogonal_vectors_score_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 1e-6, "similarity was {sim}");
    }

    #[test]
    fn test_zero_vector_never_panics_and_sorts_last() {
        let sim = cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]);
        assert_eq!(sim, f32::NEG_INFINITY);

        let cands = candidates(&[
            ("failed", &[0.0, 0.0]),
            ("good", &[1.0, 0.0]),
        ]);
        let top = top_k_texts(&[1.0, 0.0], &cands, 2);
        assert_eq!(top, vec!["good".to_string(), "failed".to_string()]);
    }

    #[test]
    fn test_length_mismatch_is_lowest_similarity() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), f32::NEG_INFINITY);
        assert_eq!(cosine_similarity(&[], &[]), f32::NEG_INFINITY);
    }

    #[test]
    fn test_top_k_orders_by_descending_similarity() {
        let cands = candidates(&[
            ("far", &[-1.0, 0.0]),
            ("close", &[0.9, 0.1]),
            ("exact", &[1.0, 0.0]),
        ]);
        let top = top_k_texts(&[1.0, 0.0], &cands, 2);
        assert_eq!(top, vec!["exact".to_string(), "close".to_string()]);
    }

    #[test]
    fn test_top_k_query_matching_candidate_ranks_first() {
        let cands = candidates(&[
            ("other", &[0.2, 0.8]),
            ("same", &[0.6, 0.4]),
        ]);
        let top = top_k_texts(&[0.6, 0.4], &cands, 1);
        assert_eq!(top, vec!["same".to_string()]);
    }

    #[test]
    fn test_top_k_tie_breaks_by_input_order() {
        // Two identical candidates: the earlier one must come first.
        let cands = candidates(&[
            ("first", &[1.0, 0.0]),
            ("second", &[1.0, 0.0]),
        ]);
        let top = top_k_texts(&[1.0, 0.0], &cands, 2);
        assert_eq!(top, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_top_k_empty_candidates_yield_empty() {
        assert!(top_k_texts(&[1.0], &[], CONTEXT_TOP_K).is_empty());
    }

    #[test]
    fn test_top_k_larger_than_candidate_set() {
        let cands = candidates(&[("only", &[1.0])]);
        let top = top_k_texts(&[1.0], &cands, 5);
        assert_eq!(top.len(), 1);
    }
}

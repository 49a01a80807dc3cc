//! Score fusion — weighted similarity + keyword coverage, scaled to a percentage.

use serde::{Deserialize, Serialize};

use crate::ranking::error::EvaluationError;

pub const SIMILARITY_WEIGHT: f64 = 0.7;
pub const KEYWORD_WEIGHT: f64 = 0.3;
pub const SCORE_SCALE: f64 = 100.0;

/// One ranked resume. `score` is in `[0, 100]`; the components are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub document_index: usize,
    pub score: f64,
    pub similarity: f64,
    pub keyword_coverage: f64,
}

/// `(similarity * 0.7 + keyword * 0.3) * 100`
pub fn composite(similarity: f64, keyword_coverage: f64) -> f64 {
    ((similarity * SIMILARITY_WEIGHT + keyword_coverage * KEYWORD_WEIGHT) * SCORE_SCALE)
        .clamp(0.0, SCORE_SCALE)
}

/// Fuses per-document components and ranks them, best first.
///
/// Sorting is stable: equal scores keep ascending `document_index` order.
pub fn fuse(
    similarities: &[f64],
    keyword_scores: &[f64],
) -> Result<Vec<ScoreRecord>, EvaluationError> {
    if similarities.len() != keyword_scores.len() {
        return Err(EvaluationError::Scoring(format!(
            "{} similarity scores but {} keyword scores",
            similarities.len(),
            keyword_scores.len()
        )));
    }

    let mut records = similarities
        .iter()
        .zip(keyword_scores)
        .enumerate()
        .map(|(document_index, (&similarity, &keyword_coverage))| {
            if !similarity.is_finite() || !keyword_coverage.is_finite() {
                return Err(EvaluationError::Scoring(format!(
                    "non-finite score for document {document_index}"
                )));
            }
            Ok(ScoreRecord {
                document_index,
                score: composite(similarity, keyword_coverage),
                similarity,
                keyword_coverage,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    records.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(records)
}

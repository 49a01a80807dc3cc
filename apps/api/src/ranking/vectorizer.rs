//! TF-IDF vectorizer — fits a vocabulary over every resume plus the job description.
//!
//! The term space is refit for every run so that IDF weights reflect exactly the
//! document set being compared. Row layout: candidates first, reference last.
//!
//! Weighting:
//! - tf: raw term count in the document
//! - idf: `ln((1 + n) / (1 + df)) + 1` (smoothed, never zero)
//! - each row is L2-normalized; all-zero rows stay zero

use std::collections::{BTreeMap, BTreeSet};

use crate::ranking::error::{EvaluationError, InputProblem};
use crate::ranking::stop_words::is_stop_word;

const MIN_TOKEN_CHARS: usize = 2;

/// Sparse TF-IDF row: `(column, weight)` pairs sorted by column.
pub type SparseRow = Vec<(usize, f64)>;

/// Fitted vocabulary and TF-IDF document rows for one evaluation run.
#[derive(Debug, Clone)]
pub struct TermVectorSpace {
    vocabulary: Vec<String>,
    rows: Vec<SparseRow>,
}

impl TermVectorSpace {
    /// Terms in column order (lexicographic).
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    /// Number of candidate rows (every row except the trailing reference).
    pub fn candidate_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn candidates(&self) -> &[SparseRow] {
        &self.rows[..self.candidate_count()]
    }

    pub fn reference(&self) -> &SparseRow {
        &self.rows[self.candidate_count()]
    }
}

/// Splits on anything that is not alphanumeric or `_`, lowercases, drops
/// single-character tokens and stop words. No stemming.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Vectorizer;

impl Vectorizer {
    /// Fits the term space over `texts`, where the last entry is the reference.
    pub fn fit_transform<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<TermVectorSpace, EvaluationError> {
        let Some((reference, candidates)) = texts.split_last() else {
            return Err(EvaluationError::InputValidation(InputProblem::EmptyReference));
        };
        if reference.as_ref().trim().is_empty() {
            return Err(EvaluationError::InputValidation(InputProblem::EmptyReference));
        }
        // Whitespace-only candidates still count; they score 0 like any text without terms.
        if candidates.iter().all(|t| t.as_ref().is_empty()) {
            return Err(EvaluationError::InputValidation(InputProblem::NoCandidateText));
        }

        let counts: Vec<BTreeMap<String, usize>> = texts
            .iter()
            .map(|t| {
                let mut tf = BTreeMap::new();
                for token in tokenize(t.as_ref()) {
                    *tf.entry(token).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        let vocabulary: Vec<String> = counts
            .iter()
            .flat_map(|tf| tf.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if vocabulary.is_empty() {
            return Err(EvaluationError::Vectorization(
                "empty vocabulary; documents contain only stop words".to_string(),
            ));
        }

        let n = texts.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = counts.iter().filter(|tf| tf.contains_key(term)).count() as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = counts
            .iter()
            .map(|tf| {
                let mut row: SparseRow = tf
                    .iter()
                    .filter_map(|(term, &count)| {
                        let col = vocabulary.binary_search(term).ok()?;
                        Some((col, count as f64 * idf[col]))
                    })
                    .collect();
                l2_normalize(&mut row);
                row
            })
            .collect();

        Ok(TermVectorSpace {
            vocabulary,
            rows,
        })
    }
}

fn l2_normalize(row: &mut SparseRow) {
    let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in row.iter_mut() {
            *w /= norm;
        }
    }
}

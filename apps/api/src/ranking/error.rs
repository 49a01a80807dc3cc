use std::fmt;

use thiserror::Error;

/// Why a batch was rejected before vectorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputProblem {
    /// Reference text is empty or whitespace-only.
    EmptyReference,
    /// Every candidate text is empty after extraction.
    NoCandidateText,
}

impl fmt::Display for InputProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputProblem::EmptyReference => f.write_str("job description is empty"),
            InputProblem::NoCandidateText => {
                f.write_str("no resume produced any extractable text")
            }
        }
    }
}

/// Batch-fatal failures of a single evaluation run.
///
/// Per-document extraction failures are not part of this type: they are
/// downgraded to empty text by [`crate::ranking::extract::ExtractorRegistry::extract_or_empty`].
#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
    #[error("invalid input: {0}")]
    InputValidation(InputProblem),

    #[error("vectorization failed: {0}")]
    Vectorization(String),

    #[error("scoring failed: {0}")]
    Scoring(String),
}

impl EvaluationError {
    /// Short machine-readable code, surfaced in API diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            EvaluationError::InputValidation(InputProblem::EmptyReference) => "EMPTY_REFERENCE",
            EvaluationError::InputValidation(InputProblem::NoCandidateText) => "NO_CANDIDATE_TEXT",
            EvaluationError::Vectorization(_) => "VECTORIZATION_FAILED",
            EvaluationError::Scoring(_) => "SCORING_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_per_cause() {
        let errors = [
            EvaluationError::InputValidation(InputProblem::EmptyReference),
            EvaluationError::InputValidation(InputProblem::NoCandidateText),
            EvaluationError::Vectorization("empty vocabulary".to_string()),
            EvaluationError::Scoring("nan".to_string()),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_includes_reason() {
        let err = EvaluationError::InputValidation(InputProblem::EmptyReference);
        assert_eq!(err.to_string(), "invalid input: job description is empty");
    }
}

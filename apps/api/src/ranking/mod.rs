//! Resume ranking — scores resumes against a job description.
//!
//! Pipeline (single pass, no state between runs):
//! extract → TF-IDF fit over resumes + JD → cosine vs JD row → keyword coverage
//! → weighted fusion → stable descending sort.
//!
//! [`Evaluator::evaluate`] never fails: batch-fatal problems are logged and yield
//! an empty ranking. [`Evaluator::try_evaluate`] exposes the cause.

pub mod error;
pub mod extract;
pub mod fusion;
pub mod handlers;
pub mod keywords;
pub mod render;
pub mod similarity;
pub mod stop_words;
pub mod upload;
pub mod vectorizer;

use tracing::{info, warn};

use crate::ranking::error::EvaluationError;
use crate::ranking::extract::{DocumentSource, ExtractorRegistry};
use crate::ranking::fusion::ScoreRecord;
use crate::ranking::keywords::KeywordSet;
use crate::ranking::vectorizer::Vectorizer;

#[derive(Clone, Default)]
pub struct Evaluator {
    extractors: ExtractorRegistry,
    vectorizer: Vectorizer,
}

impl Evaluator {
    pub fn new(extractors: ExtractorRegistry) -> Self {
        Self {
            extractors,
            vectorizer: Vectorizer,
        }
    }

    pub fn extractors(&self) -> &ExtractorRegistry {
        &self.extractors
    }

    /// Ranks `documents` against `reference`. Returns an empty list when no
    /// ranking can be produced; the cause is logged.
    pub fn evaluate<D: DocumentSource>(
        &self,
        documents: &[D],
        reference: &str,
        keywords: &KeywordSet,
    ) -> Vec<ScoreRecord> {
        match self.try_evaluate(documents, reference, keywords) {
            Ok(ranked) => ranked,
            Err(e) => {
                warn!(code = e.code(), "Evaluation produced no scores: {e}");
                Vec::new()
            }
        }
    }

    pub fn try_evaluate<D: DocumentSource>(
        &self,
        documents: &[D],
        reference: &str,
        keywords: &KeywordSet,
    ) -> Result<Vec<ScoreRecord>, EvaluationError> {
        let texts = self.extract_texts(documents);
        self.score_texts(&texts, reference, keywords)
    }

    /// Extracts every document in order. Failed documents become empty strings.
    pub fn extract_texts<D: DocumentSource>(&self, documents: &[D]) -> Vec<String> {
        documents
            .iter()
            .enumerate()
            .map(|(index, doc)| self.extractors.extract_or_empty(index, doc))
            .collect()
    }

    /// Scores already-extracted texts. Index `i` of the result refers to `texts[i]`.
    pub fn score_texts<S: AsRef<str>>(
        &self,
        texts: &[S],
        reference: &str,
        keywords: &KeywordSet,
    ) -> Result<Vec<ScoreRecord>, EvaluationError> {
        let mut corpus: Vec<&str> = texts.iter().map(|t| t.as_ref()).collect();
        corpus.push(reference);

        let space = self.vectorizer.fit_transform(&corpus)?;
        let similarities = similarity::score(&space);
        let keyword_scores: Vec<f64> = texts
            .iter()
            .map(|t| keywords::coverage(t.as_ref(), keywords))
            .collect();

        let ranked = fusion::fuse(&similarities, &keyword_scores)?;

        info!(
            documents = texts.len(),
            vocabulary = space.vocabulary().len(),
            keywords = keywords.len(),
            top_score = ranked.first().map(|r| r.score).unwrap_or_default(),
            "Ranked resumes"
        );

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::error::InputProblem;
    use bytes::Bytes;

    const JD: &str = "seeking python developer with aws experience";

    fn docs(texts: &[&str]) -> Vec<Bytes> {
        texts.iter().map(|t| Bytes::from(t.to_string())).collect()
    }

    fn record(ranked: &[ScoreRecord], index: usize) -> ScoreRecord {
        *ranked.iter().find(|r| r.document_index == index).unwrap()
    }

    #[test]
    fn test_python_developer_outranks_cook() {
        let documents = docs(&[
            "I am a python developer skilled in aws and docker",
            "I cook great pasta",
        ]);
        let keywords = KeywordSet::new(["python", "aws"]);
        let ranked = Evaluator::default().evaluate(&documents, JD, &keywords);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].document_index, 0);
        let dev = record(&ranked, 0);
        let cook = record(&ranked, 1);
        assert!(dev.score > cook.score + 20.0, "dev {} cook {}", dev.score, cook.score);
        assert_eq!(cook.keyword_coverage, 0.0);
        assert!((dev.keyword_coverage - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_empty_reference_yields_empty_ranking() {
        let documents = docs(&["python developer"]);
        let keywords = KeywordSet::new(["python"]);
        let evaluator = Evaluator::default();
        assert!(evaluator.evaluate(&documents, "", &keywords).is_empty());
        assert!(evaluator.evaluate(&documents, "  \n ", &keywords).is_empty());
        assert_eq!(
            evaluator.try_evaluate(&documents, "", &keywords).unwrap_err(),
            EvaluationError::InputValidation(InputProblem::EmptyReference)
        );
    }

    #[test]
    fn test_all_empty_documents_yield_empty_ranking() {
        let documents = docs(&["", ""]);
        let evaluator = Evaluator::default();
        assert!(evaluator.evaluate(&documents, JD, &KeywordSet::default()).is_empty());
        assert_eq!(
            evaluator
                .try_evaluate(&documents, JD, &KeywordSet::default())
                .unwrap_err(),
            EvaluationError::InputValidation(InputProblem::NoCandidateText)
        );
    }

    #[test]
    fn test_stop_word_corpus_yields_empty_ranking() {
        let documents = docs(&["the and of", "a the with"]);
        let evaluator = Evaluator::default();
        let err = evaluator
            .try_evaluate(&documents, "with the", &KeywordSet::default())
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Vectorization(_)));
        assert!(evaluator
            .evaluate(&documents, "with the", &KeywordSet::default())
            .is_empty());
    }

    #[test]
    fn test_every_document_ranked_exactly_once() {
        let documents = docs(&[
            "python aws lambda",
            "",
            "java spring",
            "python developer",
            "aws certified architect",
        ]);
        let ranked = Evaluator::default().evaluate(&documents, JD, &KeywordSet::new(["aws"]));
        let mut indices: Vec<usize> = ranked.iter().map(|r| r.document_index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        for r in &ranked {
            assert!((0.0..=100.0).contains(&r.score), "out of bounds: {}", r.score);
        }
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_identical_documents_keep_index_order() {
        let documents = docs(&[
            "java spring",
            "python developer aws",
            "python developer aws",
            "python developer aws",
        ]);
        let ranked = Evaluator::default().evaluate(&documents, JD, &KeywordSet::new(["python"]));
        let order: Vec<usize> = ranked.iter().map(|r| r.document_index).collect();
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let documents = docs(&[
            "rust tokio axum services",
            "python aws developer",
            "aws python python",
        ]);
        let keywords = KeywordSet::new(["python", "rust"]);
        let evaluator = Evaluator::default();
        let first = evaluator.evaluate(&documents, JD, &keywords);
        let second = evaluator.evaluate(&documents, JD, &keywords);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_document_scores_zero_and_ranks_last() {
        let documents = docs(&["", "python developer", "pasta chef"]);
        let ranked = Evaluator::default().evaluate(&documents, JD, &KeywordSet::new(["python"]));
        let empty = record(&ranked, 0);
        assert_eq!(empty.score, 0.0);
        assert_eq!(empty.similarity, 0.0);
        assert_eq!(empty.keyword_coverage, 0.0);
        for r in &ranked {
            assert!(r.score >= empty.score);
        }
        // Ties at zero keep index order, so the empty document precedes "pasta chef".
        let tail: Vec<usize> = ranked[1..].iter().map(|r| r.document_index).collect();
        assert_eq!(tail, vec![0, 2]);
    }

    #[test]
    fn test_empty_keywords_reduce_to_scaled_similarity() {
        let documents = docs(&["python developer", "aws experience with docker"]);
        let ranked = Evaluator::default().evaluate(&documents, JD, &KeywordSet::default());
        for r in &ranked {
            assert_eq!(r.keyword_coverage, 0.0);
            assert!((r.score - r.similarity * 70.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unreadable_document_does_not_block_batch() {
        let documents = vec![
            Bytes::from_static(&[0xff, 0x00, 0xfe]),
            Bytes::from("python developer"),
        ];
        let ranked = Evaluator::default().evaluate(&documents, JD, &KeywordSet::default());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].document_index, 1);
        assert_eq!(record(&ranked, 0).score, 0.0);
    }

    #[test]
    fn test_whitespace_only_document_scores_zero() {
        let documents = docs(&["  \n\n  "]);
        let ranked = Evaluator::default()
            .try_evaluate(&documents, "seeking python developer", &KeywordSet::default())
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].document_index, 0);
        assert_eq!(ranked[0].score, 0.0);
    }

    #[test]
    fn test_text_resume_mentioning_pdf_header_is_scored_as_text() {
        let documents = docs(&["python developer; exported CV via %PDF-1.4 tool"]);
        let ranked = Evaluator::default()
            .try_evaluate(&documents, "seeking python developer", &KeywordSet::default())
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].score > 0.0, "score {}", ranked[0].score);
    }

    #[test]
    fn test_evaluator_without_extractors_has_no_text() {
        let evaluator = Evaluator::new(ExtractorRegistry::empty());
        let documents = docs(&["python developer"]);
        assert_eq!(
            evaluator
                .try_evaluate(&documents, JD, &KeywordSet::default())
                .unwrap_err(),
            EvaluationError::InputValidation(InputProblem::NoCandidateText)
        );
    }
}

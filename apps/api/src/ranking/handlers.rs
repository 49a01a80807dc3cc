//! Axum route handlers for the Ranking API.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::Html,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ranking::error::EvaluationError;
use crate::ranking::extract::DocumentSource;
use crate::ranking::fusion::ScoreRecord;
use crate::ranking::keywords::KeywordSet;
use crate::ranking::render::{render_index_page, render_results_page};
use crate::ranking::upload::read_evaluation_form;
use crate::ranking::Evaluator;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TextDocument {
    #[serde(default)]
    pub name: Option<String>,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateTextRequest {
    pub job_description: String,
    #[serde(default)]
    pub keywords: KeywordSet,
    pub documents: Vec<TextDocument>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedResume {
    /// Position of the resume in the submitted list.
    pub document_index: usize,
    pub file_name: Option<String>,
    /// Composite score, 0 – 100, rounded to 2 decimals.
    pub score: f64,
    pub similarity: f64,
    pub keyword_coverage: f64,
}

/// Why a ranking came back empty.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResponse {
    pub run_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub document_count: usize,
    pub results: Vec<RankedResume>,
    pub diagnostic: Option<Diagnostic>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
///
/// Upload form: job description, keywords, resume files.
pub async fn handle_index() -> Html<String> {
    Html(render_index_page())
}

/// POST /upload
///
/// Multipart form submission from the index page; renders an HTML ranking.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let response = evaluate_multipart(&state, multipart).await?;
    Ok(Html(render_results_page(&response)))
}

/// POST /api/v1/evaluate
///
/// Same form as `/upload`, JSON ranking in the response.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<EvaluationResponse>, AppError> {
    Ok(Json(evaluate_multipart(&state, multipart).await?))
}

/// POST /api/v1/evaluate/text
///
/// Ranks plain-text resumes sent as JSON. No files touch the disk.
pub async fn handle_evaluate_text(
    State(state): State<AppState>,
    Json(request): Json<EvaluateTextRequest>,
) -> Result<Json<EvaluationResponse>, AppError> {
    if request.job_description.trim().is_empty() || request.documents.is_empty() {
        return Err(AppError::Validation(
            "Missing documents or job description".to_string(),
        ));
    }
    if request.documents.len() > state.config.max_documents {
        return Err(AppError::Validation(format!(
            "At most {} resumes can be evaluated at once",
            state.config.max_documents
        )));
    }

    let (names, sources): (Vec<Option<String>>, Vec<Bytes>) = request
        .documents
        .into_iter()
        .map(|d| (d.name, Bytes::from(d.text)))
        .unzip();

    let response = run_evaluation(
        &state,
        sources,
        names,
        request.job_description,
        request.keywords,
    )
    .await?;
    Ok(Json(response))
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation driver
// ────────────────────────────────────────────────────────────────────────────

async fn evaluate_multipart(
    state: &AppState,
    multipart: Multipart,
) -> Result<EvaluationResponse, AppError> {
    let form = read_evaluation_form(
        multipart,
        &state.config.upload_dir,
        state.config.max_documents,
    )
    .await?;

    let names = form
        .resumes
        .iter()
        .map(|r| r.file_name().map(str::to_string))
        .collect();

    run_evaluation(state, form.resumes, names, form.job_description, form.keywords).await
}

/// Runs one evaluation under the configured timeout and shapes the response.
async fn run_evaluation<D>(
    state: &AppState,
    documents: Vec<D>,
    names: Vec<Option<String>>,
    job_description: String,
    keywords: KeywordSet,
) -> Result<EvaluationResponse, AppError>
where
    D: DocumentSource + 'static,
{
    let run_id = Uuid::new_v4();
    let document_count = documents.len();
    info!(%run_id, documents = document_count, keywords = keywords.len(), "Starting evaluation");

    let limit = state.config.evaluation_timeout;
    let outcome = tokio::time::timeout(
        limit,
        rank_documents(
            Arc::clone(&state.evaluator),
            documents,
            job_description,
            keywords,
        ),
    )
    .await
    .map_err(|_| AppError::Timeout(limit))?;

    Ok(build_response(run_id, document_count, &names, outcome))
}

/// Extracts every document on the blocking pool in parallel, then fits and
/// scores the whole batch in a single blocking task.
pub async fn rank_documents<D>(
    evaluator: Arc<Evaluator>,
    documents: Vec<D>,
    reference: String,
    keywords: KeywordSet,
) -> Result<Vec<ScoreRecord>, EvaluationError>
where
    D: DocumentSource + 'static,
{
    let tasks: Vec<_> = documents
        .into_iter()
        .enumerate()
        .map(|(index, document)| {
            let evaluator = Arc::clone(&evaluator);
            tokio::task::spawn_blocking(move || {
                evaluator.extractors().extract_or_empty(index, &document)
            })
        })
        .collect();

    // Awaiting in spawn order keeps texts aligned with document indices.
    let mut texts = Vec::with_capacity(tasks.len());
    for (index, task) in tasks.into_iter().enumerate() {
        let text = task.await.unwrap_or_else(|e| {
            warn!(document_index = index, "Extraction task failed: {e}");
            String::new()
        });
        texts.push(text);
    }

    tokio::task::spawn_blocking(move || evaluator.score_texts(&texts, &reference, &keywords))
        .await
        .unwrap_or_else(|e| Err(EvaluationError::Scoring(format!("scoring task failed: {e}"))))
}

fn build_response(
    run_id: Uuid,
    document_count: usize,
    names: &[Option<String>],
    outcome: Result<Vec<ScoreRecord>, EvaluationError>,
) -> EvaluationResponse {
    let (results, diagnostic) = match outcome {
        Ok(ranked) => {
            let results = ranked
                .into_iter()
                .map(|r| RankedResume {
                    document_index: r.document_index,
                    file_name: names.get(r.document_index).cloned().flatten(),
                    score: round_to(r.score, 2),
                    similarity: round_to(r.similarity, 4),
                    keyword_coverage: round_to(r.keyword_coverage, 4),
                })
                .collect();
            (results, None)
        }
        Err(e) => {
            warn!(%run_id, code = e.code(), "Evaluation produced no scores: {e}");
            (
                Vec::new(),
                Some(Diagnostic {
                    code: e.code(),
                    message: e.to_string(),
                }),
            )
        }
    };

    EvaluationResponse {
        run_id,
        evaluated_at: Utc::now(),
        document_count,
        results,
        diagnostic,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

use std::sync::Arc;

use crate::config::Config;
use crate::ranking::Evaluator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Scoring pipeline with the registered text extractors (PDF + plain text).
    pub evaluator: Arc<Evaluator>,
}

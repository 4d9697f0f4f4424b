use crate::pipeline::{AnalysisReport, Pipeline};
use crate::summary::RecordFilter;
use crate::types::SourceFile;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub files: Vec<UploadedFile>,
    #[serde(default)]
    pub filter: Option<RecordFilter>,
}

pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

async fn handle_analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let files = request
        .files
        .into_iter()
        .map(|file| SourceFile::new(file.name, file.content.into_bytes()))
        .collect();

    tracing::info!("[Analyzer] Analyzing upload batch");
    let batch = state.pipeline.clone().analyze_concurrent(files).await;
    let report = AnalysisReport::build(batch, request.filter.as_ref());

    match serde_json::to_value(&report) {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(err) => {
            tracing::error!("[Analyzer] Failed to serialize report: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
        }
    }
}

async fn handle_health() -> &'static str {
    "ok"
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    let state = Arc::new(AppState { pipeline });
    Router::new()
        .route("/analyze", post(handle_analyze))
        .fallback(handle_health)
        .with_state(state)
}

//! Route handlers for the proxy: batch generation plus diagnostics.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{ApiError, JsonBody};
use super::AppState;
use crate::batch::{BatchRequest, GenerationResult};
use crate::dimensions::{Dimensions, DEFAULT_BASE_SIZE};
use crate::ports::SlotSink;

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default = "default_side")]
    pub width: u32,
    #[serde(default = "default_side")]
    pub height: u32,
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_side() -> u32 {
    DEFAULT_BASE_SIZE
}

fn default_count() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct SlotFailure {
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SlotFailure>,
}

/// Logs each slot as it settles; the HTTP response itself waits for all.
struct LogSink;

impl SlotSink for LogSink {
    fn on_slot_resolved(&self, result: &GenerationResult) {
        match result {
            GenerationResult::Success { index, image } => {
                tracing::info!(index, bytes = image.data.len(), "slot resolved");
            }
            GenerationResult::Failure { index, message } => {
                tracing::info!(index, %message, "slot failed");
            }
        }
    }
}

pub async fn generate(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<GenerateBody>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let prompt = body.prompt.unwrap_or_default();
    if prompt.trim().is_empty() {
        return Err(ApiError::bad_request("Prompt is required"));
    }
    if body.width == 0 || body.height == 0 {
        return Err(ApiError::bad_request("Width and height must be positive"));
    }
    if body.count > state.max_count {
        return Err(ApiError::bad_request(format!(
            "Count must be at most {}",
            state.max_count
        )));
    }

    let request = BatchRequest {
        prompt,
        dimensions: Dimensions { width: body.width, height: body.height },
        count: body.count,
    };
    tracing::info!(count = request.count, dimensions = %request.dimensions, "generate");

    let results = state.batch.generate(&request, &LogSink).await?;

    let mut images = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            GenerationResult::Success { image, .. } => images.push(image.to_data_uri()),
            GenerationResult::Failure { index, message } => {
                failures.push(SlotFailure { index, message });
            }
        }
    }

    if images.is_empty() && !failures.is_empty() {
        return Err(ApiError::generation_failed(failures.swap_remove(0).message));
    }

    Ok(Json(GenerateResponse { images, failures }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn test_api(State(state): State<AppState>) -> Json<Value> {
    let model: &str = &state.model;
    Json(json!({
        "status": "ok",
        "model": model,
        "api_key_configured": true,
    }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

pub async fn not_found() -> ApiError {
    ApiError::not_found()
}

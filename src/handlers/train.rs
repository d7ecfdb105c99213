//! Training handler

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, AppResult};
use crate::detector::TrainingMetrics;

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub success: bool,
    pub message: &'static str,
    pub model_id: Uuid,
    pub metrics: TrainingMetrics,
}

/// Retrain on the default dataset, replacing the stored model
pub async fn train(State(state): State<AppState>) -> AppResult<Json<TrainResponse>> {
    let loader = state.loader.clone();
    let artifact = tokio::task::spawn_blocking(move || loader.retrain()).await??;

    Ok(Json(TrainResponse {
        success: true,
        message: "Model trained successfully",
        model_id: artifact.model_id,
        metrics: artifact.metrics,
    }))
}

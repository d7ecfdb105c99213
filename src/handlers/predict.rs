//! Prediction handler

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::{AppState, AppError, AppResult};
use crate::detector::{predictor, PredictionResult};
use crate::error::NO_ACCOUNT_DATA;

/// Classify one account: `{"account_data": {...}}`
///
/// The body is parsed by hand so that a missing or malformed body gets the
/// same 400 response as a body without `account_data`.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<PredictionResult>> {
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let account = match request.get("account_data") {
        None | Some(Value::Null) => {
            return Err(AppError::ValidationError(NO_ACCOUNT_DATA.to_string()));
        }
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(AppError::ValidationError(
                "account_data must be a JSON object".to_string(),
            ));
        }
    };

    let loader = state.loader.clone();
    let result = tokio::task::spawn_blocking(move || predictor::predict(&loader, &account)).await??;

    tracing::info!(
        "Account {} classified as {} (confidence {:.3})",
        result.account_id,
        if result.is_bot { "bot" } else { "human" },
        result.confidence
    );

    Ok(Json(result))
}

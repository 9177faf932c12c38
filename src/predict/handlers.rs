use axum::{extract::State, routing::post, Json, Router};
use tracing::{debug, instrument};

use crate::{
    error::AppError,
    extractors::ApiJson,
    predict::dto::{PredictRequest, PredictResponse},
    state::AppState,
};

pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}

#[instrument(skip(state, payload))]
pub async fn predict(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let prediction = state.predictor.predict(&payload.text);
    debug!(
        chars = payload.text.chars().count(),
        disease = %prediction.label,
        confidence = prediction.confidence,
        "prediction"
    );
    Ok(Json(PredictResponse {
        disease: prediction.label,
        confidence: prediction.confidence,
    }))
}

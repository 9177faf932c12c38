use serde::{Deserialize, Serialize};

/// Request body for `/predict`.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub disease: String,
    pub confidence: f64, // percent, 0..=100
}

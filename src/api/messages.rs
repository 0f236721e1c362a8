use serde::{Deserialize, Serialize};

/// Prediction request body sent to the predictor
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

/// Prediction response from the predictor
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: PredictionSet,
}

/// A single disease hypothesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub disease: String,

    /// Likelihood in [0.0, 1.0]
    pub confidence: f64,

    /// Matched symptom tokens (multi-word tokens joined with `_`)
    #[serde(default)]
    pub symptoms: Vec<String>,

    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Predictions in the order the service returned them
pub type PredictionSet = Vec<Prediction>;

/// Chat turn request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub text: String,
    pub context: ConversationContext,
}

/// Symptom terms recognized in the user's previous turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub medical_terms: Vec<String>,
}

/// Chat reply from the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,

    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Health check payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,

    #[serde(default)]
    pub message: String,
}

impl Prediction {
    /// Check the payload invariants the renderer relies on
    pub fn validate(&self) -> Result<(), String> {
        if self.disease.trim().is_empty() {
            return Err("prediction has an empty disease label".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "confidence {} for {} is outside [0, 1]",
                self.confidence, self.disease
            ));
        }
        Ok(())
    }
}

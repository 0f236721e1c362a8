//! Predictor service contract
//!
//! - `POST /api/predict` - symptom text to ranked predictions
//! - `POST /api/chat` - one chat turn with accumulated context
//! - `GET /api/health` - liveness

pub mod client;
pub mod error;
pub mod messages;

pub use client::{ChatService, HealthService, PredictionService, PredictorClient};
pub use error::ApiError;
pub use messages::{
    ChatReply, ChatRequest, ConversationContext, HealthStatus, PredictRequest, PredictResponse,
    Prediction, PredictionSet,
};

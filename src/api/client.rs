use super::error::ApiError;
use super::messages::{
    ChatReply, ChatRequest, HealthStatus, PredictRequest, PredictResponse, PredictionSet,
};
use crate::config::ApiConfig;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Turns a symptom description into ranked disease hypotheses
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, text: &str) -> Result<PredictionSet, ApiError>;
}

/// Answers one chat turn given the accumulated context
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;
}

/// Reports whether the predictor service is up
#[async_trait]
pub trait HealthService: Send + Sync {
    async fn health(&self) -> Result<HealthStatus, ApiError>;
}

/// HTTP client for the predictor service
pub struct PredictorClient {
    http: reqwest::Client,
    predict_url: String,
    chat_url: String,
    health_url: String,
}

impl PredictorClient {
    /// Build a client from the API configuration
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        let base = config.base_url.trim_end_matches('/');
        info!("Predictor client targeting {}", base);

        Ok(Self {
            http,
            predict_url: join_url(base, &config.predict_path),
            chat_url: join_url(base, &config.chat_path),
            health_url: join_url(base, &config.health_path),
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim_start_matches('/'))
}

#[async_trait]
impl PredictionService for PredictorClient {
    async fn predict(&self, text: &str) -> Result<PredictionSet, ApiError> {
        debug!("POST {} ({} chars)", self.predict_url, text.len());

        let response = self
            .http
            .post(&self.predict_url)
            .json(&PredictRequest {
                text: text.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Prediction request rejected with status {}", status);
            return Err(ApiError::PredictionRejected(status.as_u16()));
        }

        let body: PredictResponse = response.json().await?;
        for prediction in &body.predictions {
            prediction.validate().map_err(ApiError::InvalidPayload)?;
        }

        info!("Received {} predictions", body.predictions.len());
        Ok(body.predictions)
    }
}

#[async_trait]
impl ChatService for PredictorClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        debug!(
            "POST {} (context terms: {:?})",
            self.chat_url, request.context.medical_terms
        );

        let response = self.http.post(&self.chat_url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Chat request rejected with status {}", status);
            return Err(ApiError::ChatRejected(status.as_u16()));
        }

        let reply: ChatReply = response.json().await?;
        if reply.response.trim().is_empty() {
            return Err(ApiError::InvalidPayload(
                "chat reply has no response text".to_string(),
            ));
        }

        info!("Received chat reply with {} suggestions", reply.suggestions.len());
        Ok(reply)
    }
}

#[async_trait]
impl HealthService for PredictorClient {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.http.get(&self.health_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Unhealthy(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

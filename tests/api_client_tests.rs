// Tests for the HTTP client against a stub predictor service
//
// Each test binds an axum router on an ephemeral port and points a
// `PredictorClient` at it.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use sehat_intake::api::{ApiError, ChatService, HealthService, PredictionService};
use sehat_intake::config::ApiConfig;
use sehat_intake::conversation::{ConversationSession, TurnOutcome, FALLBACK_REPLY};
use sehat_intake::PredictorClient;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Request bodies seen by the stub
type Seen = Arc<Mutex<Vec<Value>>>;

fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        predict_path: "/api/predict".to_string(),
        chat_path: "/api/chat".to_string(),
        health_path: "/api/health".to_string(),
        timeout_secs: Some(5),
    }
}

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn predict_ok(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    seen.lock().unwrap().push(body);
    Json(json!({
        "predictions": [
            {"disease": "Flu", "confidence": 0.62, "symptoms": ["demam", "batuk"]},
            {"disease": "Asma", "confidence": 0.18, "symptoms": ["sesak_nafas"],
             "recommendations": ["Hindari pemicu alergi"]}
        ],
        "processed_text": {"medical_terms": ["demam", "batuk"]}
    }))
}

async fn chat_ok(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    seen.lock().unwrap().push(body);
    Json(json!({
        "response": "Untuk membantu diagnosis lebih akurat, mohon jawab beberapa pertanyaan:",
        "suggestions": ["Apakah ada gejala lain?", "Sudah berapa lama gejala ini berlangsung?"]
    }))
}

async fn server_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "model unavailable"})))
}

async fn health_ok() -> impl IntoResponse {
    Json(json!({"status": "healthy", "message": "API is running"}))
}

fn healthy_router(seen: Seen) -> Router {
    Router::new()
        .route("/api/predict", post(predict_ok))
        .route("/api/chat", post(chat_ok))
        .route("/api/health", get(health_ok))
        .with_state(seen)
}

fn failing_router() -> Router {
    Router::new()
        .route("/api/predict", post(server_error))
        .route("/api/chat", post(server_error))
        .route("/api/health", get(server_error))
}

#[tokio::test]
async fn test_predict_sends_text_and_parses_predictions() {
    let seen = Seen::default();
    let base = spawn_stub(healthy_router(Arc::clone(&seen))).await;
    let client = PredictorClient::new(&api_config(&base)).unwrap();

    let predictions = client.predict("saya demam dan batuk").await.unwrap();

    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0].disease, "Flu");
    assert!(predictions[0].recommendations.is_empty());
    assert_eq!(predictions[1].recommendations, vec!["Hindari pemicu alergi"]);
    assert_eq!(seen.lock().unwrap()[0], json!({"text": "saya demam dan batuk"}));
}

#[tokio::test]
async fn test_predict_non_2xx_maps_to_user_message() {
    let base = spawn_stub(failing_router()).await;
    let client = PredictorClient::new(&api_config(&base)).unwrap();

    let err = client.predict("demam").await.unwrap_err();

    assert!(matches!(err, ApiError::PredictionRejected(500)));
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Gagal mendapatkan prediksi");
}

#[tokio::test]
async fn test_predict_rejects_out_of_range_confidence() {
    let router = Router::new().route(
        "/api/predict",
        post(|| async { Json(json!({"predictions": [{"disease": "Flu", "confidence": 87.3}]})) }),
    );
    let base = spawn_stub(router).await;
    let client = PredictorClient::new(&api_config(&base)).unwrap();

    let err = client.predict("demam").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidPayload(_)));
}

#[tokio::test]
async fn test_chat_sends_text_and_context() {
    let seen = Seen::default();
    let base = spawn_stub(healthy_router(Arc::clone(&seen))).await;
    let client = PredictorClient::new(&api_config(&base)).unwrap();
    let mut chat = ConversationSession::new(client);

    chat.set_draft("Saya batuk dan sesak nafas");
    assert_eq!(chat.submit().await, TurnOutcome::Replied);

    assert_eq!(
        seen.lock().unwrap()[0],
        json!({
            "text": "Saya batuk dan sesak nafas",
            "context": {"medical_terms": ["batuk", "sesak_nafas"]}
        })
    );
    assert_eq!(chat.active_suggestions().len(), 2);
}

#[tokio::test]
async fn test_chat_server_error_degrades_to_fallback() {
    let base = spawn_stub(failing_router()).await;
    let client = PredictorClient::new(&api_config(&base)).unwrap();

    let request = sehat_intake::ChatRequest {
        text: "halo".to_string(),
        context: Default::default(),
    };
    assert!(matches!(
        client.chat(&request).await,
        Err(ApiError::ChatRejected(500))
    ));

    let mut chat = ConversationSession::new(client);
    chat.set_draft("halo");
    assert_eq!(chat.submit().await, TurnOutcome::FellBack);
    assert_eq!(chat.history()[1].text(), FALLBACK_REPLY);
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    // Bind then release a port so nothing is listening on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = PredictorClient::new(&api_config(&format!("http://{}", addr))).unwrap();

    let err = client.predict("demam").await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_health() {
    let base = spawn_stub(healthy_router(Seen::default())).await;
    let client = PredictorClient::new(&api_config(&base)).unwrap();

    let status = client.health().await.unwrap();
    assert_eq!(status.status, "healthy");

    let base = spawn_stub(failing_router()).await;
    let client = PredictorClient::new(&api_config(&base)).unwrap();
    assert!(matches!(client.health().await, Err(ApiError::Unhealthy(500))));
}

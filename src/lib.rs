pub mod api;
pub mod config;
pub mod conversation;
pub mod intake;
pub mod lifecycle;
pub mod render;
pub mod speech;

pub use api::{
    ApiError, ChatReply, ChatRequest, ChatService, ConversationContext, HealthService, Prediction,
    PredictionService, PredictionSet, PredictorClient,
};
pub use config::Config;
pub use conversation::{ConversationSession, Message, TurnOutcome, FALLBACK_REPLY};
pub use intake::{IntakeView, SymptomIntake};
pub use lifecycle::{LifecycleState, RequestController, Settlement, Ticket};
pub use render::{render_predictions, ResultView, DISCLAIMER};
pub use speech::{
    RecognitionSettings, ScriptedEngine, SpeechEngine, SpeechEvent, SpeechSession,
    UnsupportedEngine,
};

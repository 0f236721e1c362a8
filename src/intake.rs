//! Symptom intake flow
//!
//! One text field (typed or dictated) feeding one prediction request at a
//! time. A settled request leaves either a result or an error banner, never
//! both.

use crate::api::{ApiError, PredictionService, PredictionSet};
use crate::lifecycle::{LifecycleState, RequestController, Settlement, Ticket};
use crate::render::{render_predictions, ResultView};
use crate::speech::{SpeechEngine, SpeechEvent, SpeechSession};
use tracing::{info, warn};

/// Prediction request accepted by [`SymptomIntake::begin_submit`]
#[derive(Debug, Clone)]
pub struct PendingPrediction {
    pub ticket: Ticket,
    pub text: String,
}

/// Everything the intake screen displays
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeView {
    pub input: String,
    pub banner: Option<String>,
    pub result: ResultView,
    pub listening: bool,
    pub mic_enabled: bool,
    pub mic_notice: Option<String>,
}

pub struct SymptomIntake<S: PredictionService, E: SpeechEngine> {
    /// Session identifier for log correlation
    id: String,
    service: S,
    speech: SpeechSession<E>,
    input: String,
    request: RequestController<PredictionSet>,
}

impl<S: PredictionService, E: SpeechEngine> SymptomIntake<S, E> {
    pub fn new(service: S, speech: SpeechSession<E>) -> Self {
        let id = format!("intake-{}", uuid::Uuid::new_v4());
        info!("Creating symptom intake: {}", id);

        Self {
            id,
            service,
            speech,
            input: String::new(),
            request: RequestController::new(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn state(&self) -> &LifecycleState<PredictionSet> {
        self.request.state()
    }

    pub fn is_loading(&self) -> bool {
        self.request.is_pending()
    }

    /// Latest predictions, if the last request succeeded
    pub fn predictions(&self) -> Option<&PredictionSet> {
        match self.request.state() {
            LifecycleState::Success(set) => Some(set),
            _ => None,
        }
    }

    /// Banner text, if the last request failed
    pub fn error(&self) -> Option<&str> {
        match self.request.state() {
            LifecycleState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn speech(&self) -> &SpeechSession<E> {
        &self.speech
    }

    pub fn speech_mut(&mut self) -> &mut SpeechSession<E> {
        &mut self.speech
    }

    /// Accept the current field value for prediction
    ///
    /// Blank input, or a request already in flight, leaves everything as is.
    /// Otherwise the field is cleared right away.
    pub fn begin_submit(&mut self) -> Option<PendingPrediction> {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        let ticket = self.request.begin()?;
        self.input.clear();
        info!("[{}] Requesting prediction {}", self.id, ticket.generation());

        Some(PendingPrediction { ticket, text })
    }

    /// Apply the settled prediction call for `ticket`
    pub fn complete_submit(
        &mut self,
        ticket: Ticket,
        result: Result<PredictionSet, ApiError>,
    ) -> Settlement {
        if let Err(e) = &result {
            warn!("[{}] Prediction failed: {}", self.id, e);
        }

        let settlement = self.request.settle(ticket, result);
        if settlement == Settlement::Stale {
            info!("[{}] Ignoring stale prediction {}", self.id, ticket.generation());
        }
        settlement
    }

    /// Submit the current field value and wait for the prediction
    ///
    /// Returns `None` when the submission was skipped.
    pub async fn handle_submit(&mut self) -> Option<Settlement> {
        let pending = self.begin_submit()?;
        let result = self.service.predict(&pending.text).await;
        Some(self.complete_submit(pending.ticket, result))
    }

    /// Hide the error banner
    pub fn dismiss_error(&mut self) {
        if self.error().is_some() {
            self.request.acknowledge();
        }
    }

    /// Toggle the microphone; returns whether capture is now active
    pub async fn toggle_capture(&mut self) -> bool {
        self.speech.toggle().await
    }

    /// Wait for the next capture event, mirroring transcripts into the field
    pub async fn pump_speech(&mut self) -> Option<SpeechEvent> {
        let event = self.speech.next_event().await?;
        if let SpeechEvent::Transcript(_) = &event {
            self.input = self.speech.transcript().to_string();
        }
        Some(event)
    }

    /// Leave the screen: stop capture and drop any in-flight result
    pub async fn leave(&mut self) {
        info!("[{}] Leaving intake", self.id);
        self.speech.stop().await;
        self.request.invalidate();
    }

    pub fn view(&mut self) -> IntakeView {
        let mic_enabled = self.speech.is_supported();

        IntakeView {
            input: self.input.clone(),
            banner: self.error().map(str::to_string),
            result: render_predictions(self.predictions(), self.is_loading()),
            listening: self.speech.is_active(),
            mic_enabled,
            mic_notice: self.speech.notice().map(str::to_string),
        }
    }
}

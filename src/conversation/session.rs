use super::context::extract_context;
use super::message::Message;
use crate::api::{ApiError, ChatReply, ChatRequest, ChatService};
use crate::lifecycle::{LifecycleState, RequestController, Settlement, Ticket};
use crate::render::{render_message, MessageView};
use tracing::{debug, info, warn};

/// Assistant reply used when a chat call fails
pub const FALLBACK_REPLY: &str = "Maaf, terjadi kesalahan. Silakan coba lagi.";

/// A chat turn that has been committed to history and awaits its reply
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub ticket: Ticket,
    pub request: ChatRequest,
}

/// What a completed turn added to the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing to send, or a turn was already pending
    Skipped,
    /// The assistant's reply was appended
    Replied,
    /// The call failed and the fallback reply was appended
    FellBack,
    /// The reply arrived after the conversation moved on
    Discarded,
}

/// Multi-turn chat state machine
pub struct ConversationSession<C: ChatService> {
    /// Session identifier for log correlation
    id: String,
    service: C,
    history: Vec<Message>,
    draft: String,
    pending: RequestController<ChatReply>,
}

impl<C: ChatService> ConversationSession<C> {
    pub fn new(service: C) -> Self {
        let id = format!("chat-{}", uuid::Uuid::new_v4());
        info!("Creating conversation session: {}", id);

        Self {
            id,
            service,
            history: Vec::new(),
            draft: String::new(),
            pending: RequestController::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn service(&self) -> &C {
        &self.service
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// History projected for display
    pub fn transcript(&self) -> Vec<MessageView> {
        self.history.iter().map(render_message).collect()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn state(&self) -> &LifecycleState<ChatReply> {
        self.pending.state()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Replace the uncommitted input
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Copy a suggestion chip into the draft without sending it
    pub fn select_suggestion(&mut self, suggestion: &str) {
        debug!("[{}] Suggestion selected: {}", self.id, suggestion);
        self.draft = suggestion.to_string();
    }

    /// Chips of the latest message, when that message is an assistant reply
    pub fn active_suggestions(&self) -> &[String] {
        match self.history.last() {
            Some(message) if !message.is_user() => message.suggestions(),
            _ => &[],
        }
    }

    /// Commit the draft as a user message and prepare the outbound call
    ///
    /// Returns `None` (and changes nothing) when the draft is blank or a
    /// turn is already pending.
    pub fn begin_turn(&mut self) -> Option<PendingTurn> {
        if self.pending.is_pending() {
            debug!("[{}] Turn rejected: reply still pending", self.id);
            return None;
        }

        let message = Message::user(&self.draft)?;
        let ticket = self.pending.begin()?;

        let text = message.text().to_string();
        self.history.push(message);
        self.draft.clear();

        let context = extract_context(&self.history);
        info!(
            "[{}] Sending turn {} (context: {:?})",
            self.id,
            ticket.generation(),
            context.medical_terms
        );

        Some(PendingTurn {
            ticket,
            request: ChatRequest { text, context },
        })
    }

    /// Apply the settled chat call for `ticket`
    pub fn complete_turn(
        &mut self,
        ticket: Ticket,
        result: Result<ChatReply, ApiError>,
    ) -> TurnOutcome {
        if let Err(e) = &result {
            warn!("[{}] Chat call failed: {}", self.id, e);
        }

        if self.pending.settle(ticket, result) == Settlement::Stale {
            info!("[{}] Discarding stale reply for turn {}", self.id, ticket.generation());
            return TurnOutcome::Discarded;
        }

        // The reply is absorbed into history, so the lifecycle goes back to Idle
        match self.pending.acknowledge() {
            Some(LifecycleState::Success(reply)) => {
                match Message::assistant(&reply.response, reply.suggestions) {
                    Some(message) => {
                        self.history.push(message);
                        TurnOutcome::Replied
                    }
                    None => self.fall_back(),
                }
            }
            _ => self.fall_back(),
        }
    }

    fn fall_back(&mut self) -> TurnOutcome {
        if let Some(message) = Message::assistant(FALLBACK_REPLY, Vec::new()) {
            self.history.push(message);
        }
        TurnOutcome::FellBack
    }

    /// Send the draft and wait for the reply
    pub async fn submit(&mut self) -> TurnOutcome {
        let Some(turn) = self.begin_turn() else {
            return TurnOutcome::Skipped;
        };

        let result = self.service.chat(&turn.request).await;
        self.complete_turn(turn.ticket, result)
    }

    /// Start a fresh conversation; any reply still in flight is discarded
    pub fn reset(&mut self) {
        info!("[{}] Conversation reset ({} messages dropped)", self.id, self.history.len());
        self.history.clear();
        self.draft.clear();
        self.pending.invalidate();
    }
}

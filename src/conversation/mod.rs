//! Chat conversation management
//!
//! This module provides the `ConversationSession` abstraction that manages:
//! - Ordered message history
//! - One in-flight turn at a time
//! - Symptom context extraction before each call
//! - Suggestion chips and the fallback reply on failure

mod context;
mod message;
mod session;

pub use context::{extract_context, SYMPTOM_VOCABULARY};
pub use message::Message;
pub use session::{ConversationSession, PendingTurn, TurnOutcome, FALLBACK_REPLY};

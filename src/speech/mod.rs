//! Speech capture
//!
//! This module provides the `SpeechSession` abstraction that manages:
//! - Capability probing (once per session)
//! - Start/stop of a continuous, interim-result capture
//! - Transcript replacement from engine updates
//! - Recoverable capture failures

mod engine;
mod scripted;
mod session;

pub use engine::{
    CaptureFailure, RecognitionSettings, SpeechEngine, SpeechStreams, TranscriptUpdate,
    UnsupportedEngine,
};
pub use scripted::{ScriptStep, ScriptedEngine};
pub use session::{SpeechEvent, SpeechSession, UNSUPPORTED_NOTICE};

use anyhow::Result;
use tokio::sync::mpsc;

/// A transcript update from the recognizer
///
/// `transcript` is the full joined text of the capture so far, already
/// corrected by the engine; it replaces whatever was received before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptUpdate {
    pub transcript: String,
    /// Whether the engine considers this result final
    pub is_final: bool,
}

/// A recognition failure reported mid-capture (e.g. "no-speech", "not-allowed")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFailure {
    pub reason: String,
}

/// Recognition parameters handed to the engine on start
#[derive(Debug, Clone)]
pub struct RecognitionSettings {
    pub locale: String,
    /// Keep listening across pauses
    pub continuous: bool,
    /// Deliver partial results while the user is still speaking
    pub interim_results: bool,
}

impl RecognitionSettings {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            continuous: true,
            interim_results: true,
        }
    }
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self::new("id-ID")
    }
}

/// Event channels for one capture
///
/// The capture is over once both senders are dropped.
pub struct SpeechStreams {
    pub transcripts: mpsc::Receiver<TranscriptUpdate>,
    pub failures: mpsc::Receiver<CaptureFailure>,
}

/// Speech recognition backend trait
///
/// Implementations:
/// - Scripted: replays a transcript script (CLI demos and tests)
/// - Unsupported: host without recognition
#[async_trait::async_trait]
pub trait SpeechEngine: Send {
    /// Whether the host exposes speech recognition at all
    fn is_available(&self) -> bool;

    /// Begin a capture
    async fn start(&mut self, settings: &RecognitionSettings) -> Result<SpeechStreams>;

    /// Halt the current capture
    async fn stop(&mut self) -> Result<()>;

    /// Get engine name for logging
    fn name(&self) -> &str;
}

#[async_trait::async_trait]
impl<T: SpeechEngine + ?Sized> SpeechEngine for Box<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    async fn start(&mut self, settings: &RecognitionSettings) -> Result<SpeechStreams> {
        (**self).start(settings).await
    }

    async fn stop(&mut self) -> Result<()> {
        (**self).stop().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Engine for hosts without speech recognition
#[derive(Debug, Default)]
pub struct UnsupportedEngine;

#[async_trait::async_trait]
impl SpeechEngine for UnsupportedEngine {
    fn is_available(&self) -> bool {
        false
    }

    async fn start(&mut self, _settings: &RecognitionSettings) -> Result<SpeechStreams> {
        anyhow::bail!("Speech recognition is not available on this host")
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "unsupported"
    }
}

use super::engine::{
    CaptureFailure, RecognitionSettings, SpeechEngine, SpeechStreams, TranscriptUpdate,
};
use tracing::{info, warn};

/// Notice shown when the host has no speech recognition
pub const UNSUPPORTED_NOTICE: &str = "Pengenalan suara tidak didukung di perangkat ini.";

/// Something observed on the capture channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Transcript replaced with the engine's latest text
    Transcript(TranscriptUpdate),
    /// Engine reported a failure; capture is now inactive
    Failed(CaptureFailure),
    /// Engine closed both channels; capture is now inactive
    Ended,
}

/// A single continuous speech capture driving one text field
pub struct SpeechSession<E: SpeechEngine> {
    engine: E,
    settings: RecognitionSettings,
    /// Capability probe result, computed on first use
    supported: Option<bool>,
    active: bool,
    accumulated_transcript: String,
    /// Last recoverable capture problem, cleared on the next start
    notice: Option<String>,
    streams: Option<SpeechStreams>,
}

impl<E: SpeechEngine> SpeechSession<E> {
    pub fn new(engine: E, settings: RecognitionSettings) -> Self {
        Self {
            engine,
            settings,
            supported: None,
            active: false,
            accumulated_transcript: String::new(),
            notice: None,
            streams: None,
        }
    }

    /// Whether the host exposes speech recognition (probed once)
    pub fn is_supported(&mut self) -> bool {
        if let Some(supported) = self.supported {
            return supported;
        }

        let supported = self.engine.is_available();
        if !supported {
            info!("Speech recognition unavailable ({})", self.engine.name());
        }
        self.supported = Some(supported);
        supported
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn transcript(&self) -> &str {
        &self.accumulated_transcript
    }

    /// Recoverable capture notice, or the static notice when unsupported
    pub fn notice(&self) -> Option<&str> {
        match self.supported {
            Some(false) => Some(UNSUPPORTED_NOTICE),
            _ => self.notice.as_deref(),
        }
    }

    /// Start capturing; no-op when unsupported or already active
    ///
    /// Returns whether a new capture began.
    pub async fn start(&mut self) -> bool {
        if !self.is_supported() || self.active {
            return false;
        }

        match self.engine.start(&self.settings).await {
            Ok(streams) => {
                info!(
                    "Speech capture started ({}, locale={})",
                    self.engine.name(),
                    self.settings.locale
                );
                self.streams = Some(streams);
                self.accumulated_transcript.clear();
                self.notice = None;
                self.active = true;
                true
            }
            Err(e) => {
                warn!("Failed to start speech capture: {:#}", e);
                self.notice = Some(format!("Gagal memulai perekaman suara: {}", e));
                false
            }
        }
    }

    /// Stop capturing; no-op when inactive
    pub async fn stop(&mut self) {
        if !self.active {
            return;
        }

        self.active = false;
        self.streams = None;
        if let Err(e) = self.engine.stop().await {
            warn!("Failed to stop speech engine: {:#}", e);
        }

        info!("Speech capture stopped");
    }

    /// Start when inactive, stop when active; returns the new active flag
    pub async fn toggle(&mut self) -> bool {
        if self.active {
            self.stop().await;
        } else {
            self.start().await;
        }
        self.active
    }

    /// Apply a transcript update from the engine
    pub fn apply_transcript(&mut self, update: &TranscriptUpdate) {
        if !self.active {
            return;
        }
        self.accumulated_transcript.clone_from(&update.transcript);
    }

    /// Apply an engine failure: capture becomes inactive but can be restarted
    pub fn apply_failure(&mut self, failure: &CaptureFailure) {
        warn!("Speech capture error: {}", failure.reason);
        self.active = false;
        self.streams = None;
        self.notice = Some(format!("Kesalahan pengenalan suara: {}", failure.reason));
    }

    /// Wait for the next capture event and apply it
    ///
    /// Returns `None` when no capture is running.
    pub async fn next_event(&mut self) -> Option<SpeechEvent> {
        let streams = self.streams.as_mut()?;

        // Transcripts sent before a failure must be applied before it
        let event = tokio::select! {
            biased;
            Some(update) = streams.transcripts.recv() => SpeechEvent::Transcript(update),
            Some(failure) = streams.failures.recv() => SpeechEvent::Failed(failure),
            else => SpeechEvent::Ended,
        };

        match &event {
            SpeechEvent::Transcript(update) => self.apply_transcript(update),
            SpeechEvent::Failed(failure) => {
                self.apply_failure(failure);
                if let Err(e) = self.engine.stop().await {
                    warn!("Failed to stop speech engine after error: {:#}", e);
                }
            }
            SpeechEvent::Ended => {
                info!("Speech capture ended");
                self.stop().await;
            }
        }

        Some(event)
    }
}

use super::engine::{
    CaptureFailure, RecognitionSettings, SpeechEngine, SpeechStreams, TranscriptUpdate,
};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// One step of a transcript script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Partial(String),
    Final(String),
    Error(String),
}

/// Speech engine that replays a prepared transcript
///
/// Script format, one step per line:
///
/// ```text
/// # comment
/// partial saya sa
/// final saya sakit kepala
/// error no-speech
/// ```
pub struct ScriptedEngine {
    steps: Vec<ScriptStep>,
    step_delay: Duration,
    task: Option<JoinHandle<()>>,
}

impl ScriptedEngine {
    pub fn new(steps: Vec<ScriptStep>, step_delay: Duration) -> Self {
        Self {
            steps,
            step_delay,
            task: None,
        }
    }

    /// Parse a script from text
    pub fn parse(script: &str) -> Result<Vec<ScriptStep>> {
        script
            .lines()
            .enumerate()
            .filter(|(_, line)| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
            .map(|(index, line)| {
                let line = line.trim();
                let (kind, text) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
                let text = text.trim().to_string();

                match kind {
                    "partial" => Ok(ScriptStep::Partial(text)),
                    "final" => Ok(ScriptStep::Final(text)),
                    "error" => Ok(ScriptStep::Error(text)),
                    other => anyhow::bail!("line {}: unknown step kind '{}'", index + 1, other),
                }
            })
            .collect()
    }

    /// Load a script file
    pub fn from_file(path: impl AsRef<Path>, step_delay: Duration) -> Result<Self> {
        let path = path.as_ref();
        let script = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript script: {}", path.display()))?;
        let steps = Self::parse(&script)
            .with_context(|| format!("Invalid transcript script: {}", path.display()))?;

        info!("Loaded {} transcript steps from {}", steps.len(), path.display());

        Ok(Self::new(steps, step_delay))
    }
}

#[async_trait::async_trait]
impl SpeechEngine for ScriptedEngine {
    fn is_available(&self) -> bool {
        true
    }

    async fn start(&mut self, settings: &RecognitionSettings) -> Result<SpeechStreams> {
        if self.task.as_ref().is_some_and(|task| !task.is_finished()) {
            anyhow::bail!("Scripted capture already running");
        }

        debug!(
            "Replaying {} steps (locale={}, interim={})",
            self.steps.len(),
            settings.locale,
            settings.interim_results
        );

        let (transcript_tx, transcripts) = mpsc::channel(32);
        let (failure_tx, failures) = mpsc::channel(8);
        let steps = self.steps.clone();
        let step_delay = self.step_delay;
        let interim_results = settings.interim_results;

        let task = tokio::spawn(async move {
            for step in steps {
                if !step_delay.is_zero() {
                    tokio::time::sleep(step_delay).await;
                }

                let delivered = match step {
                    ScriptStep::Partial(_) if !interim_results => true,
                    ScriptStep::Partial(transcript) => transcript_tx
                        .send(TranscriptUpdate {
                            transcript,
                            is_final: false,
                        })
                        .await
                        .is_ok(),
                    ScriptStep::Final(transcript) => transcript_tx
                        .send(TranscriptUpdate {
                            transcript,
                            is_final: true,
                        })
                        .await
                        .is_ok(),
                    ScriptStep::Error(reason) => {
                        // A recognizer error ends the capture
                        let _ = failure_tx.send(CaptureFailure { reason }).await;
                        break;
                    }
                };

                if !delivered {
                    break;
                }
            }
            debug!("Transcript script finished");
        });

        self.task = Some(task);

        Ok(SpeechStreams {
            transcripts,
            failures,
        })
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = "\
# morning symptoms
partial saya sa
final saya sakit kepala

error no-speech
";
        let steps = ScriptedEngine::parse(script).unwrap();

        assert_eq!(
            steps,
            vec![
                ScriptStep::Partial("saya sa".to_string()),
                ScriptStep::Final("saya sakit kepala".to_string()),
                ScriptStep::Error("no-speech".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_step() {
        let err = ScriptedEngine::parse("partial ok\nshout hello").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn test_replay_delivers_in_order() {
        let steps = vec![
            ScriptStep::Partial("saya".to_string()),
            ScriptStep::Final("saya demam".to_string()),
        ];
        let mut engine = ScriptedEngine::new(steps, Duration::ZERO);

        let mut streams = engine.start(&RecognitionSettings::default()).await.unwrap();

        let first = streams.transcripts.recv().await.unwrap();
        assert_eq!(first.transcript, "saya");
        assert!(!first.is_final);

        let second = streams.transcripts.recv().await.unwrap();
        assert_eq!(second.transcript, "saya demam");
        assert!(second.is_final);

        assert!(streams.transcripts.recv().await.is_none());
        assert!(streams.failures.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let steps = vec![ScriptStep::Partial("saya".to_string())];
        let mut engine = ScriptedEngine::new(steps, Duration::from_secs(60));
        let _streams = engine.start(&RecognitionSettings::default()).await.unwrap();

        assert!(engine.start(&RecognitionSettings::default()).await.is_err());

        engine.stop().await.unwrap();
        assert!(engine.start(&RecognitionSettings::default()).await.is_ok());
    }
}

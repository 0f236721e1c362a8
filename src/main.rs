use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sehat_intake::api::HealthService;
use sehat_intake::intake::IntakeView;
use sehat_intake::render::render_predictions;
use sehat_intake::speech::{SpeechEngine, SpeechEvent};
use sehat_intake::{
    Config, ConversationSession, PredictionService, PredictorClient, RecognitionSettings,
    ScriptedEngine, SpeechSession, SymptomIntake, TurnOutcome, UnsupportedEngine,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sehat-intake", version, about = "Symptom intake and health assistant client")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(long, global = true, default_value = "config/sehat-intake")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Predict diseases for one symptom description
    Predict {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Interactive symptom intake
    Intake {
        /// Transcript script replayed when the microphone is toggled
        #[arg(long)]
        speech_script: Option<PathBuf>,
    },
    /// Interactive chat with the health assistant
    Chat {
        /// Transcript script replayed when the microphone is toggled
        #[arg(long)]
        speech_script: Option<PathBuf>,
    },
    /// Check that the predictor service is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sehat_intake=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Predictor service: {}", cfg.api.base_url);

    let client = PredictorClient::new(&cfg.api).context("Failed to build HTTP client")?;

    match cli.command {
        Command::Predict { text } => predict_once(&client, &text.join(" ")).await,
        Command::Intake { speech_script } => {
            let speech = speech_session(&cfg, speech_script)?;
            run_intake(SymptomIntake::new(client, speech)).await
        }
        Command::Chat { speech_script } => {
            let speech = speech_session(&cfg, speech_script)?;
            run_chat(ConversationSession::new(client), speech).await
        }
        Command::Health => {
            let status = client.health().await.context("Health check failed")?;
            println!("{}: {}", status.status, status.message);
            Ok(())
        }
    }
}

fn speech_session(
    cfg: &Config,
    script: Option<PathBuf>,
) -> Result<SpeechSession<Box<dyn SpeechEngine>>> {
    let engine: Box<dyn SpeechEngine> = match script {
        Some(path) => Box::new(ScriptedEngine::from_file(
            path,
            Duration::from_millis(cfg.speech.script_step_ms),
        )?),
        None => Box::new(UnsupportedEngine),
    };

    Ok(SpeechSession::new(
        engine,
        RecognitionSettings::new(cfg.speech.locale.clone()),
    ))
}

async fn predict_once(client: &PredictorClient, text: &str) -> Result<()> {
    let predictions = client.predict(text).await?;
    println!("{}", render_predictions(Some(&predictions), false));
    Ok(())
}

fn print_intake(view: &IntakeView) {
    if let Some(banner) = &view.banner {
        println!("Error: {}", banner);
    }
    let result = view.result.to_string();
    if !result.is_empty() {
        println!("{}", result);
    }
}

/// Echo one capture event; returns whether the capture is still running
fn echo_capture(event: &SpeechEvent, transcript: &str) -> bool {
    match event {
        SpeechEvent::Transcript(update) if update.is_final => {
            println!("\r{}", transcript);
            true
        }
        SpeechEvent::Transcript(_) => {
            print!("\r{}", transcript);
            std::io::stdout().flush().ok();
            true
        }
        SpeechEvent::Failed(failure) => {
            println!("\nPerekaman suara gagal: {}", failure.reason);
            false
        }
        SpeechEvent::Ended => false,
    }
}

async fn run_intake<S, E>(mut intake: SymptomIntake<S, E>) -> Result<()>
where
    S: PredictionService,
    E: SpeechEngine,
{
    println!("Jelaskan gejala yang Anda alami. Perintah: /mic, /dismiss, /quit");
    if let Some(notice) = intake.view().mic_notice {
        println!("{}", notice);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/dismiss" => {
                intake.dismiss_error();
                continue;
            }
            "/mic" => {
                if intake.toggle_capture().await {
                    println!("Mendengarkan...");
                    while let Some(event) = intake.pump_speech().await {
                        if !echo_capture(&event, intake.input()) {
                            break;
                        }
                    }
                    println!("Tekan Enter untuk mengirim: {}", intake.input());
                } else if let Some(notice) = intake.view().mic_notice {
                    println!("{}", notice);
                }
                continue;
            }
            "" => {}
            text => intake.set_input(text),
        }

        if intake.handle_submit().await.is_some() {
            print_intake(&intake.view());
        }
    }

    intake.leave().await;
    Ok(())
}

async fn run_chat<C, E>(mut chat: ConversationSession<C>, mut speech: SpeechSession<E>) -> Result<()>
where
    C: sehat_intake::ChatService,
    E: SpeechEngine,
{
    info!("Chat session {} ready", chat.id());
    println!("Tanyakan apapun tentang kesehatan Anda. Perintah: /pick N, /mic, /reset, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();

        if line == "/quit" {
            break;
        }
        if line == "/reset" {
            chat.reset();
            continue;
        }
        if line == "/mic" {
            if speech.toggle().await {
                println!("Mendengarkan...");
                while let Some(event) = speech.next_event().await {
                    if !echo_capture(&event, speech.transcript()) {
                        break;
                    }
                }
                if !speech.transcript().is_empty() {
                    chat.set_draft(speech.transcript());
                }
                println!("Tekan Enter untuk mengirim: {}", chat.draft());
            } else if let Some(notice) = speech.notice() {
                println!("{}", notice);
            }
            continue;
        }
        if let Some(index) = line.strip_prefix("/pick ") {
            let chosen = index
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| chat.active_suggestions().get(n.wrapping_sub(1)).cloned());
            match chosen {
                Some(suggestion) => {
                    chat.select_suggestion(&suggestion);
                    println!("Tekan Enter untuk mengirim: {}", chat.draft());
                }
                None => println!("Tidak ada saran dengan nomor itu"),
            }
            continue;
        }

        if !line.is_empty() {
            chat.set_draft(line);
        }

        let before = chat.history().len();
        if chat.submit().await != TurnOutcome::Skipped {
            for message in chat.transcript().iter().skip(before) {
                println!("{}", message);
            }
        }
    }

    speech.stop().await;
    info!("Chat session {} closed ({} messages)", chat.id(), chat.history().len());
    Ok(())
}

//! Display models for predictions and chat messages
//!
//! Everything here is a pure projection of settled payloads. The `Display`
//! impls give the plain-text rendering used by the terminal front-end.

use crate::api::{Prediction, PredictionSet};
use crate::conversation::Message;
use std::fmt;

/// Shown under every rendered prediction
pub const DISCLAIMER: &str =
    "* Hasil ini hanya perkiraan. Silakan konsultasikan dengan dokter untuk diagnosis yang akurat.";

/// Separator used inside multi-word symptom tokens
pub const SYMPTOM_SEPARATOR: char = '_';

/// Confidence as a whole percentage, rounded to nearest
pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
}

pub fn format_confidence(confidence: f64) -> String {
    format!("{}%", confidence_percent(confidence))
}

/// Display form of a symptom token ("sakit_kepala" -> "sakit kepala")
pub fn display_symptom(token: &str) -> String {
    token.replace(SYMPTOM_SEPARATOR, " ")
}

/// One rendered prediction card
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionView {
    pub disease: String,
    pub confidence: String,
    pub symptoms: Vec<String>,
    pub recommendations: Vec<String>,
    pub disclaimer: &'static str,
}

/// What the result area shows
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    Loading,
    Empty,
    /// Predictions in the order the service returned them
    Results(Vec<PredictionView>),
}

pub fn render_prediction(prediction: &Prediction) -> PredictionView {
    PredictionView {
        disease: prediction.disease.clone(),
        confidence: format_confidence(prediction.confidence),
        symptoms: prediction
            .symptoms
            .iter()
            .map(|s| display_symptom(s))
            .collect(),
        recommendations: prediction.recommendations.clone(),
        disclaimer: DISCLAIMER,
    }
}

/// Project the current result; loading hides any previous result
pub fn render_predictions(predictions: Option<&PredictionSet>, loading: bool) -> ResultView {
    if loading {
        return ResultView::Loading;
    }

    match predictions {
        Some(set) if !set.is_empty() => {
            ResultView::Results(set.iter().map(render_prediction).collect())
        }
        _ => ResultView::Empty,
    }
}

/// One rendered chat bubble
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub author: &'static str,
    pub text: String,
    pub time: String,
    pub suggestions: Vec<String>,
}

pub fn render_message(message: &Message) -> MessageView {
    MessageView {
        author: if message.is_user() { "Anda" } else { "Asisten" },
        text: message.text().to_string(),
        time: message.timestamp().format("%H:%M:%S").to_string(),
        suggestions: message.suggestions().to_vec(),
    }
}

impl fmt::Display for PredictionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Kemungkinan Penyakit: {} ({} Akurasi)", self.disease, self.confidence)?;

        writeln!(f, "Gejala yang Terdeteksi:")?;
        for symptom in &self.symptoms {
            writeln!(f, "  - {}", symptom)?;
        }

        writeln!(f, "Rekomendasi:")?;
        for recommendation in &self.recommendations {
            writeln!(f, "  ! {}", recommendation)?;
        }

        write!(f, "{}", self.disclaimer)
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Menganalisis gejala..."),
            Self::Empty => Ok(()),
            Self::Results(predictions) => {
                writeln!(f, "Hasil Analisis")?;
                for (i, prediction) in predictions.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    writeln!(f, "{}", prediction)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for MessageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.time, self.author, self.text)?;
        for (i, suggestion) in self.suggestions.iter().enumerate() {
            write!(f, "\n    ({}) {}", i + 1, suggestion)?;
        }
        Ok(())
    }
}

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One chat turn entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    text: String,
    is_user: bool,
    suggestions: Vec<String>,
    timestamp: DateTime<Local>,
}

impl Message {
    /// User message; `None` when the text is empty after trimming
    pub fn user(text: &str) -> Option<Self> {
        Self::build(text, true, Vec::new())
    }

    /// Assistant message with optional suggestion chips
    pub fn assistant(text: &str, suggestions: Vec<String>) -> Option<Self> {
        Self::build(text, false, suggestions)
    }

    fn build(text: &str, is_user: bool, suggestions: Vec<String>) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            is_user,
            suggestions,
            timestamp: Local::now(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_user(&self) -> bool {
        self.is_user
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

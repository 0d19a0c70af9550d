//! Core types for qtranslate — the chat-completion wire shapes and the
//! translation outcome handed back to callers.
//!
//! The wire types model the OpenAI chat completions format. Every provider
//! family currently speaks this dialect.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A role-tagged chat message.
///
/// Each variant maps to a `role` field value on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum ChatMessage {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },

    #[serde(rename = "assistant")]
    Assistant {
        #[serde(default)]
        content: Option<String>,
    },
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
        }
    }

    /// Text content of the message, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            ChatMessage::System { content } | ChatMessage::User { content } => Some(content),
            ChatMessage::Assistant { content } => content.as_deref(),
        }
    }
}

// ─────────────────────────────────────────────
// Chat completion request
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

// ─────────────────────────────────────────────
// Chat completion response
// ─────────────────────────────────────────────

/// Raw chat completion response.
///
/// Some providers put the choice list under `data` instead of `choices`, and
/// some return an `error` envelope with a 200 status. Both are tolerated here;
/// interpretation lives in the normalizer.
#[derive(Debug, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<ChatChoice>>,
    #[serde(default)]
    pub data: Option<Vec<ChatChoice>>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl ChatResponse {
    /// The choice list to read from: `choices` when non-empty, else `data`.
    pub fn choice_list(&self) -> &[ChatChoice] {
        match (&self.choices, &self.data) {
            (Some(choices), _) if !choices.is_empty() => choices,
            (_, Some(data)) => data,
            _ => &[],
        }
    }

    /// Text of the first choice carrying non-empty content.
    pub fn first_text(&self) -> Option<&str> {
        self.choice_list()
            .iter()
            .filter_map(|c| c.message.as_ref()?.content.as_deref())
            .find(|text| !text.trim().is_empty())
    }
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The message within a choice. `role` is informational only.
#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Error envelope returned by the provider.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ApiError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

// ─────────────────────────────────────────────
// Translation outcome
// ─────────────────────────────────────────────

/// Result of one translation call.
///
/// Exactly one of `translated_text` / `error_message` is populated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TranslationOutcome {
    pub success: bool,
    pub translated_text: Option<String>,
    pub detected_language: Option<String>,
    pub error_message: Option<String>,
}

impl TranslationOutcome {
    /// A successful translation.
    pub fn success(text: impl Into<String>, detected_language: Option<String>) -> Self {
        TranslationOutcome {
            success: true,
            translated_text: Some(text.into()),
            detected_language,
            error_message: None,
        }
    }

    /// A failed translation with a human-readable reason.
    pub fn failure(message: impl Into<String>) -> Self {
        TranslationOutcome {
            success: false,
            translated_text: None,
            detected_language: None,
            error_message: Some(message.into()),
        }
    }

    /// The translated text, or `""` on failure.
    pub fn text(&self) -> &str {
        self.translated_text.as_deref().unwrap_or_default()
    }
}

//! Request/response normalization for the chat-completion dialect.
//!
//! Builds the outbound request, endpoint and auth header for a profile, and
//! interprets response bodies. Shared by the gateway (fail closed on bad
//! bodies) and the health prober (fail open).

use qtranslate_core::config::ProviderProfile;
use qtranslate_core::types::{ChatMessage, ChatRequest, ChatResponse};

/// Path appended to a bare API root.
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Quote character stripped from a translation that comes back wrapped.
const WRAPPING_QUOTE: char = '"';

// ─────────────────────────────────────────────
// Outbound
// ─────────────────────────────────────────────

/// Build the chat-completion request for a translation call.
pub fn build_request(profile: &ProviderProfile, system_prompt: &str, user_prompt: &str) -> ChatRequest {
    ChatRequest {
        model: profile.model.clone(),
        messages: vec![
            ChatMessage::system(system_prompt.trim()),
            ChatMessage::user(user_prompt.trim()),
        ],
        temperature: profile.temperature,
        max_tokens: profile.max_tokens,
    }
}

/// Build the full chat completions URL from a base URL.
///
/// Accepts either an API root (`https://api.openai.com/v1`) or a complete
/// endpoint (`…/v1/chat/completions`, matched case-insensitively). Applying
/// it to its own output is a no-op.
pub fn build_endpoint(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base
        .to_ascii_lowercase()
        .ends_with(CHAT_COMPLETIONS_PATH)
    {
        base.to_string()
    } else {
        format!("{}{}", base, CHAT_COMPLETIONS_PATH)
    }
}

/// The `Authorization` header value for a profile, if one should be sent.
///
/// Families that allow anonymous calls skip the header when no key is set.
pub fn auth_header(profile: &ProviderProfile) -> Option<String> {
    if profile.api_key.is_empty() && profile.family.allows_anonymous() {
        None
    } else {
        Some(format!("Bearer {}", profile.api_key))
    }
}

// ─────────────────────────────────────────────
// Inbound
// ─────────────────────────────────────────────

/// Deserialize a response body into the canonical shape.
pub fn parse_response(body: &str) -> Result<ChatResponse, serde_json::Error> {
    serde_json::from_str(body)
}

/// Turn a parsed 2xx response into the translated text or a failure message.
///
/// An error envelope always wins, whatever the HTTP status was.
pub fn extract_translation(response: &ChatResponse) -> Result<String, String> {
    if let Some(err) = &response.error {
        return Err(format!(
            "API Error ({}): {}",
            err.error_type.as_deref().unwrap_or("Unknown"),
            err.message.as_deref().unwrap_or("no message")
        ));
    }

    response
        .first_text()
        .map(clean_text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| "Empty response from API".to_string())
}

/// Best human-readable message from a non-2xx body: `error.message` when the
/// body is a JSON error envelope, else the raw body.
pub fn error_message_from_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Probe-side body check. Returns the failure reason, or `None` if the body
/// looks healthy.
///
/// Unparsable JSON is treated as healthy; an empty body, a non-object body or
/// an error envelope is not.
pub fn probe_body_error(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return Some("Empty response from API".to_string());
    }

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return None,
    };

    let Some(obj) = value.as_object() else {
        return Some("Unexpected response shape from API".to_string());
    };

    obj.get("error").map(|err| match err.get("message").and_then(|m| m.as_str()) {
        Some(message) => format!("API Error: {message}"),
        None => format!("API Error: {err}"),
    })
}

/// Trim the text and strip one layer of matching wrapping quotes.
pub fn clean_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= 2 {
        return trimmed.to_string();
    }

    let mut chars = trimmed.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return trimmed.to_string();
    };

    if first == WRAPPING_QUOTE && last == WRAPPING_QUOTE {
        chars.as_str().trim().to_string()
    } else {
        trimmed.to_string()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

//! Language name → speech-service language code.
//!
//! The speech service hosts one voice per language under `/{code}/api/tts`.
//! Anything unrecognised maps to the fallback voice.

/// Language codes the speech service has voices for.
pub const SPEECH_LANGUAGES: &[&str] = &["ru", "en", "de", "es", "fr", "it", "hi"];

/// Code used when the input is empty or unrecognised.
pub const FALLBACK_LANGUAGE: &str = "ru";

/// (code, substrings that identify it) — checked in order.
const LANGUAGE_HINTS: &[(&str, &[&str])] = &[
    ("ru", &["рус", "russian"]),
    ("en", &["англ", "english"]),
    ("de", &["нем", "german", "deutsch"]),
    ("fr", &["фран", "french"]),
    ("es", &["испан", "spanish"]),
    ("it", &["итал", "italian"]),
    ("hi", &["хинди", "hindi"]),
];

/// Normalize a language name or code (`"English"`, `"en-US"`, `"немецкий"`)
/// to a speech-service code.
pub fn normalize(input: &str) -> &'static str {
    let s = input.trim().to_lowercase();
    if s.is_empty() {
        return FALLBACK_LANGUAGE;
    }

    LANGUAGE_HINTS
        .iter()
        .find(|(code, hints)| s.starts_with(code) || hints.iter().any(|h| s.contains(h)))
        .map(|(code, _)| *code)
        .unwrap_or(FALLBACK_LANGUAGE)
}

/// Whether the input names a language with its own voice (not the fallback).
pub fn is_speech_supported(input: &str) -> bool {
    let s = input.trim().to_lowercase();
    LANGUAGE_HINTS
        .iter()
        .any(|(code, hints)| s.starts_with(code) || hints.iter().any(|h| s.contains(h)))
}

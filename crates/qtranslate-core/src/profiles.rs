//! Built-in translation profiles — domain hints appended to the system prompt.

/// A translation profile: an id plus a hint describing the text domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationProfile {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Extra system-prompt context. Empty for the general profile.
    pub hint: &'static str,
}

/// All built-in profiles. `general` comes first and is the default.
pub static PROFILES: &[TranslationProfile] = &[
    TranslationProfile {
        id: "general",
        display_name: "General",
        hint: "",
    },
    TranslationProfile {
        id: "technical",
        display_name: "Technical",
        hint: "This is technical documentation. Preserve code snippets, API names, variable names, \
               and technical terms without translation. Use precise technical terminology.",
    },
    TranslationProfile {
        id: "literary",
        display_name: "Literary",
        hint: "This is literary/fiction text. Preserve the author's style, tone, and voice. \
               Adapt idioms and metaphors naturally to the target language while maintaining \
               emotional impact.",
    },
    TranslationProfile {
        id: "legal",
        display_name: "Legal",
        hint: "This is a legal document. Use formal legal terminology. Maintain precise wording \
               and structure. Preserve legal terms in their standard translated form.",
    },
    TranslationProfile {
        id: "medical",
        display_name: "Medical",
        hint: "This is medical/scientific text. Use proper medical terminology. Keep Latin terms \
               where conventionally used. Accuracy is critical.",
    },
    TranslationProfile {
        id: "casual",
        display_name: "Casual",
        hint: "This is casual/informal text. Use conversational tone. Slang and colloquialisms \
               are acceptable. Make it sound natural.",
    },
];

/// Find a built-in profile by id (case-insensitive).
pub fn find(id: &str) -> Option<&'static TranslationProfile> {
    PROFILES.iter().find(|p| p.id.eq_ignore_ascii_case(id.trim()))
}

/// All built-in profile ids, in display order.
pub fn ids() -> Vec<&'static str> {
    PROFILES.iter().map(|p| p.id).collect()
}

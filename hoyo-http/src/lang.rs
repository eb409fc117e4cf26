//! Language tags accepted by the portal API
//!
//! The API localizes responses through the `x-rpc-language` header and
//! various `lang` query parameters. Unknown tags fall back to English, the
//! portal default.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported response languages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Simplified Chinese
    #[serde(rename = "zh-cn")]
    SimplifiedChinese,
    /// Traditional Chinese
    #[serde(rename = "zh-tw")]
    TraditionalChinese,
    /// German
    #[serde(rename = "de-de")]
    German,
    /// English
    #[default]
    #[serde(rename = "en-us")]
    English,
    /// Spanish
    #[serde(rename = "es-es")]
    Spanish,
    /// French
    #[serde(rename = "fr-fr")]
    French,
    /// Indonesian
    #[serde(rename = "id-id")]
    Indonesian,
    /// Italian
    #[serde(rename = "it-it")]
    Italian,
    /// Japanese
    #[serde(rename = "ja-jp")]
    Japanese,
    /// Korean
    #[serde(rename = "ko-kr")]
    Korean,
    /// Portuguese
    #[serde(rename = "pt-pt")]
    Portuguese,
    /// Russian
    #[serde(rename = "ru-ru")]
    Russian,
    /// Thai
    #[serde(rename = "th-th")]
    Thai,
    /// Turkish
    #[serde(rename = "tr-tr")]
    Turkish,
    /// Vietnamese
    #[serde(rename = "vi-vn")]
    Vietnamese,
}

impl Language {
    /// All supported languages
    pub fn all() -> &'static [Language] {
        &[
            Language::SimplifiedChinese,
            Language::TraditionalChinese,
            Language::German,
            Language::English,
            Language::Spanish,
            Language::French,
            Language::Indonesian,
            Language::Italian,
            Language::Japanese,
            Language::Korean,
            Language::Portuguese,
            Language::Russian,
            Language::Thai,
            Language::Turkish,
            Language::Vietnamese,
        ]
    }

    /// The wire tag sent to the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::SimplifiedChinese => "zh-cn",
            Language::TraditionalChinese => "zh-tw",
            Language::German => "de-de",
            Language::English => "en-us",
            Language::Spanish => "es-es",
            Language::French => "fr-fr",
            Language::Indonesian => "id-id",
            Language::Italian => "it-it",
            Language::Japanese => "ja-jp",
            Language::Korean => "ko-kr",
            Language::Portuguese => "pt-pt",
            Language::Russian => "ru-ru",
            Language::Thai => "th-th",
            Language::Turkish => "tr-tr",
            Language::Vietnamese => "vi-vn",
        }
    }

    /// Parse a language tag, falling back to English for unknown input.
    ///
    /// The API rejects requests carrying malformed language tags, so
    /// normalization never fails.
    pub fn parse(tag: &str) -> Self {
        Language::all()
            .iter()
            .copied()
            .find(|lang| tag.eq_ignore_ascii_case(lang.as_str()))
            .unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!(Language::parse("id-id"), Language::Indonesian);
        assert_eq!(Language::parse("ZH-CN"), Language::SimplifiedChinese);
        assert_eq!(Language::parse("en-us"), Language::English);
    }

    #[test]
    fn test_parse_unknown_tag_falls_back_to_english() {
        assert_eq!(Language::parse("xx-yy"), Language::English);
        assert_eq!(Language::parse(""), Language::English);
    }

    #[test]
    fn test_display_matches_wire_tag() {
        assert_eq!(Language::Japanese.to_string(), "ja-jp");
        assert_eq!(Language::default().to_string(), "en-us");
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Language::Korean).unwrap();
        assert_eq!(json, "\"ko-kr\"");
        let parsed: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Language::Korean);
    }
}

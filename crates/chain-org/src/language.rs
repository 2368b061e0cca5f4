//! Supported languages
//!
//! Organizations and restaurants carry a preferred language used by the
//! (external) notification and menu rendering layers. Only languages in this
//! closed set may be stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A language supported for organization and restaurant defaults.
///
/// # Examples
///
/// ```
/// use chain_org::Language;
///
/// assert_eq!(Language::parse("tr"), Some(Language::Turkish));
/// assert_eq!(Language::parse("EN"), Some(Language::English));
/// assert_eq!(Language::parse("xx"), None);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "ar")]
    Arabic,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 8] = [
        Language::English,
        Language::Turkish,
        Language::German,
        Language::French,
        Language::Spanish,
        Language::Italian,
        Language::Russian,
        Language::Arabic,
    ];

    /// ISO 639-1 code of the language.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Turkish => "tr",
            Language::German => "de",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::Italian => "it",
            Language::Russian => "ru",
            Language::Arabic => "ar",
        }
    }

    /// Parse a language code (case-insensitive, surrounding whitespace ignored).
    ///
    /// # Returns
    ///
    /// `None` when the code is not in the supported set
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_supported_code() {
        for lang in Language::ALL {
            assert_eq!(Language::parse(lang.code()), Some(lang));
        }
    }

    #[test]
    fn test_parse_rejects_unsupported() {
        assert_eq!(Language::parse(""), None);
        assert_eq!(Language::parse("english"), None);
        assert_eq!(Language::parse("pt"), None);
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Language::German).unwrap();
        assert_eq!(json, "\"de\"");
        assert!(serde_json::from_str::<Language>("\"zz\"").is_err());
    }
}

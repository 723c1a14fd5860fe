//! Supported display languages.
//!
//! The tag is forwarded to the geolocation providers so that country and
//! region names come back localized.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language tag from the fixed supported set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh-CN")]
    ChineseSimplified,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ru")]
    Russian,
}

impl Language {
    /// Every supported language, in menu order.
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::ChineseSimplified,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Japanese,
        Language::Russian,
    ];

    /// Wire tag sent to providers (e.g. `zh-CN`)
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::ChineseSimplified => "zh-CN",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Japanese => "ja",
            Self::Russian => "ru",
        }
    }

    /// Native display label for the language picker
    pub fn label(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::ChineseSimplified => "简体中文",
            Self::Spanish => "Español",
            Self::French => "Français",
            Self::German => "Deutsch",
            Self::Japanese => "日本語",
            Self::Russian => "Русский",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a tag is outside the supported set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language tag: {0}")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(tag))
            .ok_or_else(|| UnsupportedLanguage(tag.to_string()))
    }
}

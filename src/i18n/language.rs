//! Language type: the closed set of content languages.

use crate::error::ContentError;
use crate::i18n::{LanguageConfig, LanguageRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A content language.
///
/// English is always the source of truth; the others are translation targets.
/// Ordering follows declaration order (en, cs, de, fr), which is also the order
/// used in every report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Cs,
    De,
    Fr,
}

impl Language {
    /// All languages in report order.
    pub const ALL: [Language; 4] = [Language::En, Language::Cs, Language::De, Language::Fr];

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err(UnknownLanguage)` if the code is not registered or disabled
    pub fn from_code(code: &str) -> Result<Language, ContentError> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) if config.enabled => Ok(config.language),
            _ => Err(ContentError::UnknownLanguage(code.to_string())),
        }
    }

    /// Get the canonical (source) language.
    pub fn canonical() -> Language {
        LanguageRegistry::get().canonical().language
    }

    /// Enabled translation targets, in report order.
    pub fn targets() -> Vec<Language> {
        LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .filter(|config| !config.is_canonical)
            .map(|config| config.language)
            .collect()
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.config().code
    }

    /// Get the full language configuration from the registry.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get().config_for(*self)
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Get the native name of the language.
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Check if this is the canonical language.
    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_all_languages() {
        assert_eq!(Language::from_code("en").unwrap(), Language::En);
        assert_eq!(Language::from_code("cs").unwrap(), Language::Cs);
        assert_eq!(Language::from_code("de").unwrap(), Language::De);
        assert_eq!(Language::from_code("fr").unwrap(), Language::Fr);
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("es");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown language"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_parse_via_from_str() {
        let lang: Language = "de".parse().expect("Should parse");
        assert_eq!(lang, Language::De);
    }

    // ==================== canonical / targets Tests ====================

    #[test]
    fn test_canonical_returns_english() {
        let canonical = Language::canonical();
        assert_eq!(canonical, Language::En);
        assert!(canonical.is_canonical());
    }

    #[test]
    fn test_targets_exclude_english() {
        assert_eq!(
            Language::targets(),
            vec![Language::Cs, Language::De, Language::Fr]
        );
    }

    // ==================== Trait Tests ====================

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::Fr.to_string(), "fr");
        assert_eq!(format!("{}", Language::Cs), "cs");
    }

    #[test]
    fn test_ordering_is_report_order() {
        let mut langs = vec![Language::Fr, Language::En, Language::De, Language::Cs];
        langs.sort();
        assert_eq!(langs, Language::ALL.to_vec());
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Language::De).unwrap();
        assert_eq!(json, "\"de\"");
        let parsed: Language = serde_json::from_str("\"cs\"").unwrap();
        assert_eq!(parsed, Language::Cs);
    }

    #[test]
    fn test_native_name() {
        assert_eq!(Language::De.native_name(), "Deutsch");
        assert_eq!(Language::Fr.native_name(), "Français");
        assert_eq!(Language::En.name(), "English");
    }
}

//! Language registry: Single source of truth for all supported content languages.
//!
//! The registry is immutable after initialization and lives in a `OnceLock`.

use crate::i18n::Language;
use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// The language this entry describes
    pub language: Language,

    /// ISO 639-1 language code (e.g., "en", "cs")
    pub code: &'static str,

    /// English name of the language (e.g., "Czech", "German")
    pub name: &'static str,

    /// Native name of the language (e.g., "Čeština", "Deutsch")
    pub native_name: &'static str,

    /// Whether this is the source-of-truth language (exactly one is)
    pub is_canonical: bool,

    /// Whether content is expected in this language
    pub enabled: bool,
}

/// Global language registry.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get the configuration entry for a language.
    ///
    /// Entries are stored in `Language` declaration order, so this is an index.
    pub fn config_for(&self, language: Language) -> &LanguageConfig {
        &self.languages[language as usize]
    }

    /// Get all enabled languages, canonical first.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if the registry does not define exactly one canonical language.
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }
}

/// English is the source of truth; Czech, German and French mirror it.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            language: Language::En,
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: true,
            enabled: true,
        },
        LanguageConfig {
            language: Language::Cs,
            code: "cs",
            name: "Czech",
            native_name: "Čeština",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            language: Language::De,
            code: "de",
            name: "German",
            native_name: "Deutsch",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            language: Language::Fr,
            code: "fr",
            name: "French",
            native_name: "Français",
            is_canonical: false,
            enabled: true,
        },
    ]
}

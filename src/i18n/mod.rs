//! Internationalization (i18n) module for the content languages.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for supported languages and their metadata
//! - `language`: The `Language` type used across validation, checks and reports
//!
//! # Example
//!
//! ```rust,ignore
//! use statex_content::i18n::Language;
//!
//! let canonical = Language::canonical();      // English
//! let czech = Language::from_code("cs")?;
//! let targets = Language::targets();          // [cs, de, fr]
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};

//! Content types and the content-type to path table.

use crate::error::{ContentError, Result};
use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The closed set of content types.
///
/// Declared in lexicographic order so that `Ord` and `ALL` both give the
/// stable scan order used in reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Blog,
    Legal,
    Pages,
    Services,
    Solutions,
}

impl ContentType {
    /// All content types in scan order.
    pub const ALL: [ContentType; 5] = [
        ContentType::Blog,
        ContentType::Legal,
        ContentType::Pages,
        ContentType::Services,
        ContentType::Solutions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::Legal => "legal",
            ContentType::Pages => "pages",
            ContentType::Services => "services",
            ContentType::Solutions => "solutions",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self> {
        ContentType::ALL
            .into_iter()
            .find(|ct| ct.as_str() == s)
            .ok_or_else(|| ContentError::UnknownContentType(s.to_string()))
    }
}

/// Default path templates, relative to the content root.
///
/// `{type}` and `{lang}` are substituted; `blog` and `pages` keep the language
/// directly under the type root, everything else nests under `pages/{lang}`.
pub const DEFAULT_PATH_TEMPLATES: &[(ContentType, &str)] = &[
    (ContentType::Blog, "{type}/{lang}"),
    (ContentType::Legal, "pages/{lang}/{type}"),
    (ContentType::Pages, "{type}/{lang}"),
    (ContentType::Services, "pages/{lang}/{type}"),
    (ContentType::Solutions, "pages/{lang}/{type}"),
];

/// Resolves content directories and files for each (content type, language).
#[derive(Debug, Clone)]
pub struct ContentPaths {
    root: PathBuf,
    templates: BTreeMap<ContentType, String>,
}

impl ContentPaths {
    /// Build the path table with the default templates.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_templates(root, DEFAULT_PATH_TEMPLATES)
    }

    /// Build the path table from explicit templates, validating it against
    /// the closed `ContentType` set.
    pub fn with_templates(root: impl Into<PathBuf>, templates: &[(ContentType, &str)]) -> Result<Self> {
        let mut table = BTreeMap::new();

        for (content_type, template) in templates {
            if !template.contains("{lang}") {
                return Err(ContentError::InvalidPathTable(format!(
                    "template for '{}' has no {{lang}} placeholder: {}",
                    content_type, template
                )));
            }
            if table
                .insert(*content_type, (*template).to_string())
                .is_some()
            {
                return Err(ContentError::InvalidPathTable(format!(
                    "duplicate template for '{}'",
                    content_type
                )));
            }
        }

        let missing: Vec<_> = ContentType::ALL
            .iter()
            .filter(|ct| !table.contains_key(ct))
            .map(|ct| ct.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(ContentError::InvalidPathTable(format!(
                "no template for: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            root: root.into(),
            templates: table,
        })
    }

    /// Directory holding the markdown files for one (content type, language).
    pub fn language_dir(&self, content_type: ContentType, language: Language) -> PathBuf {
        // Every ContentType has a template after validation.
        let template = self
            .templates
            .get(&content_type)
            .map(String::as_str)
            .unwrap_or("{type}/{lang}");
        let relative = template
            .replace("{type}", content_type.as_str())
            .replace("{lang}", language.code());
        self.root.join(relative)
    }

    /// Markdown file for one content item.
    pub fn file_path(&self, content_type: ContentType, language: Language, slug: &str) -> PathBuf {
        self.language_dir(content_type, language)
            .join(format!("{}.md", slug))
    }
}

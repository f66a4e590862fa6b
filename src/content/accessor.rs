//! The content access capability consumed by validation and checks.

use crate::content::ContentType;
use crate::error::{ContentError, Result};
use crate::i18n::Language;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Parsed frontmatter: string keys, JSON-compatible values.
pub type Frontmatter = BTreeMap<String, serde_json::Value>;

/// A loaded markdown item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedContent {
    pub frontmatter: Frontmatter,
    pub body: String,
    /// File modification time, when the backing store knows it
    pub modified: Option<DateTime<Utc>>,
}

impl ParsedContent {
    pub fn new(frontmatter: Frontmatter, body: impl Into<String>) -> Self {
        Self {
            frontmatter,
            body: body.into(),
            modified: None,
        }
    }

    /// String value of a frontmatter field, if present and a string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.frontmatter.get(key).and_then(|v| v.as_str())
    }

    /// Most recent edit date of the item.
    ///
    /// Looks at `lastModified`, then `updatedAt`, then `publishDate`, and
    /// finally the file modification time.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        ["lastModified", "updatedAt", "publishDate"]
            .iter()
            .find_map(|key| self.field_str(key).and_then(parse_date))
            .or(self.modified)
    }
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Resolves `(content type, language, slug)` to parsed markdown.
///
/// Implementations must return slugs in a stable order.
#[async_trait]
pub trait ContentAccessor: Send + Sync {
    /// List slugs for a (content type, language).
    ///
    /// A missing directory is `Err(ContentError::MissingDirectory)`; other
    /// I/O failures are `Err(ContentError::Io)`.
    async fn list_slugs(&self, content_type: ContentType, language: Language) -> Result<Vec<String>>;

    async fn exists(&self, content_type: ContentType, language: Language, slug: &str) -> bool;

    /// Load one item, `Err(ContentError::NotFound)` when absent.
    async fn load(
        &self,
        content_type: ContentType,
        language: Language,
        slug: &str,
    ) -> Result<ParsedContent>;

    /// Like `list_slugs`, but a missing directory is an empty list.
    async fn list_slugs_or_empty(
        &self,
        content_type: ContentType,
        language: Language,
    ) -> Result<Vec<String>> {
        match self.list_slugs(content_type, language).await {
            Err(ContentError::MissingDirectory { .. }) => Ok(Vec::new()),
            other => other,
        }
    }
}

/// Split a markdown document into YAML frontmatter and body.
///
/// Documents without a leading `---` block have empty frontmatter.
pub fn parse_frontmatter(raw: &str) -> std::result::Result<(Frontmatter, String), String> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut lines = raw.split_inclusive('\n');
    let first = match lines.next() {
        Some(line) if line.trim_end() == "---" => line,
        _ => return Ok((Frontmatter::new(), raw.to_string())),
    };

    let mut offset = first.len();
    let mut yaml_end = None;
    for line in lines {
        if line.trim_end() == "---" {
            yaml_end = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    let (yaml_end, body_start) = yaml_end.ok_or_else(|| "unterminated frontmatter block".to_string())?;
    let yaml = &raw[first.len()..yaml_end];
    let body = raw[body_start..].to_string();

    if yaml.trim().is_empty() {
        return Ok((Frontmatter::new(), body));
    }

    let value: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
    let frontmatter = match value {
        serde_yaml::Value::Mapping(_) => {
            serde_json::from_value::<Frontmatter>(
                serde_json::to_value(&value).map_err(|e| e.to_string())?,
            )
            .map_err(|e| e.to_string())?
        }
        serde_yaml::Value::Null => Frontmatter::new(),
        _ => return Err("frontmatter is not a mapping".to_string()),
    };

    Ok((frontmatter, body))
}

//! Filesystem-backed content accessor over `{root}/...{slug}.md` files.

use crate::content::accessor::parse_frontmatter;
use crate::content::{ContentAccessor, ContentPaths, ContentType, ParsedContent};
use crate::error::{ContentError, Result};
use crate::i18n::Language;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use tracing::debug;

/// Reads markdown content from disk using a `ContentPaths` table.
#[derive(Debug, Clone)]
pub struct FsContentAccessor {
    paths: ContentPaths,
}

impl FsContentAccessor {
    pub fn new(paths: ContentPaths) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl ContentAccessor for FsContentAccessor {
    async fn list_slugs(&self, content_type: ContentType, language: Language) -> Result<Vec<String>> {
        let dir = self.paths.language_dir(content_type, language);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ContentError::MissingDirectory { path: dir });
            }
            Err(source) => return Err(ContentError::Io { path: dir, source }),
        };

        let mut slugs = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(ContentError::Io {
                        path: dir.clone(),
                        source,
                    })
                }
            };

            let path = entry.path();
            let is_markdown = path.extension().and_then(|ext| ext.to_str()) == Some("md");
            let is_file = entry
                .file_type()
                .await
                .map(|ft| ft.is_file())
                .unwrap_or(false);

            if is_markdown && is_file {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    slugs.push(stem.to_string());
                }
            }
        }

        // read_dir order is platform dependent
        slugs.sort();
        debug!(
            "Listed {} slugs for {}/{} in {}",
            slugs.len(),
            content_type,
            language,
            dir.display()
        );
        Ok(slugs)
    }

    async fn exists(&self, content_type: ContentType, language: Language, slug: &str) -> bool {
        let path = self.paths.file_path(content_type, language, slug);
        tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    async fn load(
        &self,
        content_type: ContentType,
        language: Language,
        slug: &str,
    ) -> Result<ParsedContent> {
        let path = self.paths.file_path(content_type, language, slug);

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ContentError::NotFound {
                    content_type,
                    language,
                    slug: slug.to_string(),
                });
            }
            Err(source) => return Err(ContentError::Io { path, source }),
        };

        let (frontmatter, body) = parse_frontmatter(&raw).map_err(|message| {
            ContentError::Frontmatter {
                path: path.clone(),
                message,
            }
        })?;

        let modified = tokio::fs::metadata(&path)
            .await
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(ParsedContent {
            frontmatter,
            body,
            modified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    fn create_accessor() -> (FsContentAccessor, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let paths = ContentPaths::new(temp_dir.path()).expect("Valid path table");
        (FsContentAccessor::new(paths), temp_dir)
    }

    fn write(temp_dir: &TempDir, relative: &str, contents: &str) {
        let path = temp_dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    // ==================== list_slugs Tests ====================

    #[tokio::test]
    async fn test_list_slugs_sorted_markdown_only() {
        let (accessor, temp_dir) = create_accessor();
        write(&temp_dir, "blog/en/zeta.md", "z");
        write(&temp_dir, "blog/en/alpha.md", "a");
        write(&temp_dir, "blog/en/notes.txt", "ignored");
        fs::create_dir_all(temp_dir.path().join("blog/en/drafts.md")).unwrap();

        let slugs = accessor
            .list_slugs(ContentType::Blog, Language::En)
            .await
            .expect("Should list");
        assert_eq!(slugs, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_list_slugs_missing_directory() {
        let (accessor, _temp_dir) = create_accessor();
        let err = accessor
            .list_slugs(ContentType::Legal, Language::En)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::MissingDirectory { .. }));

        let empty = accessor
            .list_slugs_or_empty(ContentType::Legal, Language::En)
            .await
            .expect("Missing directory is empty");
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_pages_listing_ignores_nested_type_directories() {
        let (accessor, temp_dir) = create_accessor();
        write(&temp_dir, "pages/en/about.md", "about");
        write(&temp_dir, "pages/en/services/ai.md", "service");

        let pages = accessor
            .list_slugs(ContentType::Pages, Language::En)
            .await
            .unwrap();
        assert_eq!(pages, vec!["about"]);

        let services = accessor
            .list_slugs(ContentType::Services, Language::En)
            .await
            .unwrap();
        assert_eq!(services, vec!["ai"]);
    }

    // ==================== exists / load Tests ====================

    #[tokio::test]
    async fn test_exists() {
        let (accessor, temp_dir) = create_accessor();
        write(&temp_dir, "pages/cs/legal/privacy.md", "x");

        assert!(accessor.exists(ContentType::Legal, Language::Cs, "privacy").await);
        assert!(!accessor.exists(ContentType::Legal, Language::De, "privacy").await);
    }

    #[tokio::test]
    async fn test_load_parses_frontmatter() {
        let (accessor, temp_dir) = create_accessor();
        write(
            &temp_dir,
            "blog/de/intro.md",
            "---\ntitle: Einführung\nlanguage: de\n---\n## Abschnitt\n",
        );

        let content = accessor
            .load(ContentType::Blog, Language::De, "intro")
            .await
            .expect("Should load");
        assert_eq!(content.field_str("title"), Some("Einführung"));
        assert_eq!(content.body, "## Abschnitt\n");
        assert!(content.modified.is_some());
    }

    #[tokio::test]
    async fn test_load_not_found() {
        let (accessor, _temp_dir) = create_accessor();
        let err = accessor
            .load(ContentType::Blog, Language::Fr, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_load_malformed_frontmatter() {
        let (accessor, temp_dir) = create_accessor();
        write(&temp_dir, "blog/en/broken.md", "---\ntitle: [oops\n---\nbody");

        let err = accessor
            .load(ContentType::Blog, Language::En, "broken")
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Frontmatter { .. }));
    }
}

//! Integration tests for the Statex content pipeline
//!
//! These tests drive the public library API against synthetic content trees
//! on disk: validation, consistency checks, alert rules and experiment
//! assignment working together.

use async_trait::async_trait;
use statex_content::abtest::{
    default_experiments, AbTestExperiment, AbTestManager, AbTestVariant, AssignmentStore,
    CookieAssignmentStore, MemoryAssignmentStore,
};
use statex_content::alerts::{Alert, AlertLevel, AlertRule, AlertRuleEngine, AlertSchedule};
use statex_content::content::{
    ContentAccessor, ContentPaths, ContentType, FsContentAccessor, ParsedContent,
};
use statex_content::error::{ContentError, Result};
use statex_content::i18n::Language;
use statex_content::validation::{ConsistencyOptions, ContentValidator};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

// ==================== Test Helpers ====================

fn markdown(language: Language) -> String {
    format!(
        "---\ntitle: Title\ndescription: Description\nlanguage: {}\ncategory: ai\ntemplate: page\npublishDate: 2024-03-01\n---\n# Heading\n\nBody text.\n",
        language
    )
}

fn write_item(paths: &ContentPaths, content_type: ContentType, language: Language, slug: &str) {
    let path = paths.file_path(content_type, language, slug);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, markdown(language)).unwrap();
}

fn validator(paths: &ContentPaths) -> ContentValidator {
    validator_over(Arc::new(FsContentAccessor::new(paths.clone())))
}

fn validator_over(accessor: Arc<dyn ContentAccessor>) -> ContentValidator {
    ContentValidator::new(accessor, ConsistencyOptions::default())
}

/// Every content type fully translated with two items each
fn full_tree(temp_dir: &TempDir) -> ContentPaths {
    let paths = ContentPaths::new(temp_dir.path()).unwrap();
    for content_type in ContentType::ALL {
        for slug in ["alpha", "beta"] {
            for language in Language::ALL {
                write_item(&paths, content_type, language, slug);
            }
        }
    }
    paths
}

/// Wraps a real accessor and fails listings for one content type
struct BrokenTypeAccessor {
    inner: FsContentAccessor,
    broken: ContentType,
}

#[async_trait]
impl ContentAccessor for BrokenTypeAccessor {
    async fn list_slugs(&self, content_type: ContentType, language: Language) -> Result<Vec<String>> {
        if content_type == self.broken {
            return Err(ContentError::Io {
                path: PathBuf::from(content_type.as_str()),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        self.inner.list_slugs(content_type, language).await
    }

    async fn exists(&self, content_type: ContentType, language: Language, slug: &str) -> bool {
        self.inner.exists(content_type, language, slug).await
    }

    async fn load(
        &self,
        content_type: ContentType,
        language: Language,
        slug: &str,
    ) -> Result<ParsedContent> {
        self.inner.load(content_type, language, slug).await
    }
}

// ==================== Validation Scenarios ====================

#[tokio::test]
async fn test_scenario_a_missing_translations() {
    let temp_dir = TempDir::new().unwrap();
    let paths = ContentPaths::new(temp_dir.path()).unwrap();
    write_item(&paths, ContentType::Blog, Language::En, "intro");
    write_item(&paths, ContentType::Blog, Language::En, "pricing");
    write_item(&paths, ContentType::Blog, Language::Cs, "intro");

    let report = validator(&paths).validate_all_translations().await;

    assert_eq!(report.total_content, 2);
    assert_eq!(report.valid_content, 0);
    assert_eq!(report.invalid_content, 2);

    let intro = &report.results[0];
    assert_eq!(intro.english_slug, "intro");
    assert_eq!(intro.missing_languages, vec![Language::De, Language::Fr]);

    let pricing = &report.results[1];
    assert_eq!(pricing.english_slug, "pricing");
    assert_eq!(
        pricing.missing_languages,
        vec![Language::Cs, Language::De, Language::Fr]
    );

    let blog = &report.missing_translations[0];
    assert_eq!(blog.content_type, ContentType::Blog);
    assert_eq!(blog.total_missing, 5);
    assert_eq!(report.summary.by_language[&Language::Cs], 1);
    assert_eq!(report.summary.by_language[&Language::De], 2);
}

#[tokio::test]
async fn test_completeness_invariant_on_full_tree() {
    let temp_dir = TempDir::new().unwrap();
    let paths = full_tree(&temp_dir);

    let report = validator(&paths).validate_all_translations().await;

    assert_eq!(report.total_content, ContentType::ALL.len() * 2);
    assert_eq!(report.total_content, report.results.len());
    assert_eq!(
        report.total_content,
        report.valid_content + report.invalid_content
    );
    assert_eq!(report.invalid_content, 0);
    assert!(report.warnings.is_empty());
    for result in &report.results {
        assert_eq!(
            result.is_valid,
            result.missing_languages.is_empty() && result.structural_inconsistencies.is_empty()
        );
    }
}

#[tokio::test]
async fn test_repeated_validation_is_identical() {
    let temp_dir = TempDir::new().unwrap();
    let paths = full_tree(&temp_dir);
    fs::remove_file(paths.file_path(ContentType::Services, Language::Fr, "beta")).unwrap();
    write_item(&paths, ContentType::Solutions, Language::En, "gamma");

    let validator = validator(&paths);
    let first = validator.validate_all_translations().await;
    let second = validator.validate_all_translations().await;

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    let order: Vec<_> = first
        .results
        .iter()
        .map(|r| (r.content_type, r.english_slug.clone()))
        .collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[tokio::test]
async fn test_missing_legal_directory_is_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let paths = full_tree(&temp_dir);
    fs::remove_dir_all(paths.language_dir(ContentType::Legal, Language::En)).unwrap();

    let report = validator(&paths).validate_all_translations().await;

    assert_eq!(report.total_content, 8);
    assert_eq!(report.valid_content, 8);
    assert_eq!(report.summary.by_content_type[&ContentType::Legal], 0);
    for content_type in [
        ContentType::Blog,
        ContentType::Pages,
        ContentType::Services,
        ContentType::Solutions,
    ] {
        assert_eq!(report.summary.by_content_type[&content_type], 2);
    }
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("legal"));
}

#[tokio::test]
async fn test_unreadable_content_type_is_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let paths = full_tree(&temp_dir);
    let accessor = BrokenTypeAccessor {
        inner: FsContentAccessor::new(paths),
        broken: ContentType::Pages,
    };

    let report = validator_over(Arc::new(accessor))
        .validate_all_translations()
        .await;

    assert_eq!(report.total_content, 8);
    assert_eq!(report.summary.by_content_type[&ContentType::Pages], 0);
    assert_eq!(report.warnings.len(), 1);
}

#[tokio::test]
async fn test_single_content_recheck_after_edit() {
    let temp_dir = TempDir::new().unwrap();
    let paths = full_tree(&temp_dir);
    let validator = validator(&paths);

    fs::write(
        paths.file_path(ContentType::Blog, Language::De, "alpha"),
        "---\ntitle: Titel\nlanguage: fr\n---\n# Kopf\n",
    )
    .unwrap();

    let result = validator
        .validate_single_content("alpha", ContentType::Blog)
        .await
        .unwrap();
    assert!(!result.is_valid);
    assert!(result.missing_languages.is_empty());
    assert!(result
        .structural_inconsistencies
        .iter()
        .all(|issue| issue.starts_with("de: ")));

    let missing = validator
        .validate_single_content("ghost", ContentType::Blog)
        .await;
    assert!(matches!(missing, Err(ContentError::NotFound { .. })));
}

// ==================== Alert Scenarios ====================

#[tokio::test]
async fn test_scenario_c_disabled_rule() {
    let rule = AlertRule::new(
        "manual-only",
        "Manual only",
        "Runs only when invoked directly",
        AlertSchedule::Daily,
        || async {
            Ok::<_, anyhow::Error>(vec![Alert::new(
                "manual",
                AlertLevel::Info,
                "Manual",
                "Invoked",
            )])
        },
    )
    .with_enabled(false);
    let engine = AlertRuleEngine::with_rules(vec![rule]);

    assert!(engine.run_all_alerts().await.is_empty());

    let direct = engine.run_alert_rule("manual-only").await.unwrap();
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].id, "manual");
}

// ==================== Experiment Scenarios ====================

#[test]
fn test_scenario_b_force_assign() {
    let manager = AbTestManager::new(default_experiments(), CookieAssignmentStore::new());

    manager.force_assign("u1", "homepage-hero-variants", "hero-urgency");
    assert_eq!(
        manager
            .get_user_variant("u1", "homepage-hero-variants")
            .unwrap()
            .as_deref(),
        Some("hero-urgency")
    );

    let mut expected = BTreeMap::new();
    expected.insert(
        "u1".to_string(),
        BTreeMap::from([(
            "homepage-hero-variants".to_string(),
            "hero-urgency".to_string(),
        )]),
    );
    let store = manager.into_store();
    assert_eq!(store.get(), expected);

    // A new manager over the same cookie sees the assignment
    let header = format!("abtest_assignments={}", store.cookie_value().unwrap());
    let reloaded = AbTestManager::new(
        default_experiments(),
        CookieAssignmentStore::from_cookie_header(Some(&header)),
    );
    assert_eq!(
        reloaded.assignment("u1", "homepage-hero-variants").as_deref(),
        Some("hero-urgency")
    );
}

#[test]
fn test_weighted_distribution() {
    let manager = AbTestManager::new(default_experiments(), MemoryAssignmentStore::new());
    let users = 10_000;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for i in 0..users {
        let variant = manager
            .get_user_variant(&format!("user-{}", i), "homepage-hero-variants")
            .unwrap()
            .unwrap();
        *counts.entry(variant).or_insert(0) += 1;
    }

    for (variant, expected) in [
        ("hero-control", 33.0),
        ("hero-urgency", 33.0),
        ("hero-social-proof", 34.0),
    ] {
        let share = counts[variant] as f64 * 100.0 / users as f64;
        assert!(
            (share - expected).abs() < 3.0,
            "{} share {:.2}% too far from {}%",
            variant,
            share,
            expected
        );
    }
}

#[test]
fn test_idempotent_assignment() {
    let manager = AbTestManager::new(default_experiments(), MemoryAssignmentStore::new());
    for i in 0..100 {
        let user = format!("user-{}", i);
        let first = manager.get_user_variant(&user, "homepage-cta-variants").unwrap();
        let second = manager.get_user_variant(&user, "homepage-cta-variants").unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_inactive_experiment_never_assigns() {
    let experiment = AbTestExperiment {
        id: "paused".to_string(),
        name: "Paused".to_string(),
        is_active: false,
        traffic_allocation: 100,
        target_page: None,
        variants: vec![AbTestVariant::new("a", 1), AbTestVariant::new("b", 1)],
    };
    let manager = AbTestManager::new(vec![experiment], MemoryAssignmentStore::new());

    for i in 0..50 {
        assert_eq!(
            manager.get_user_variant(&format!("user-{}", i), "paused").unwrap(),
            None
        );
    }
    assert!(manager.assignments().is_empty());
    assert_eq!(manager.into_store().writes(), 0);
}

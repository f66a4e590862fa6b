//! The default rule set registered at startup.

use crate::alerts::{Alert, AlertLevel, AlertRule, AlertSchedule};
use crate::validation::{
    ConsistencyReport, ContentValidator, PipelineHealth, Severity, ValidationReport,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultRuleOptions {
    /// Missing translations per content type above which the alert is an error
    pub missing_translation_threshold: usize,
}

impl Default for DefaultRuleOptions {
    fn default() -> Self {
        Self {
            missing_translation_threshold: 5,
        }
    }
}

/// Build the default rules around a shared validator.
pub fn default_rules(validator: Arc<ContentValidator>, options: DefaultRuleOptions) -> Vec<AlertRule> {
    let threshold = options.missing_translation_threshold;

    let missing = {
        let validator = Arc::clone(&validator);
        AlertRule::new(
            "missing-translations",
            "Missing translations",
            "English content without a translation in one or more languages",
            AlertSchedule::Daily,
            move || {
                let validator = Arc::clone(&validator);
                async move {
                    let report = validator.validate_all_translations().await;
                    Ok(missing_translation_alerts(&report, threshold))
                }
            },
        )
    };

    let consistency = {
        let validator = Arc::clone(&validator);
        AlertRule::new(
            "consistency-errors",
            "Consistency errors",
            "Translations with missing frontmatter fields, wrong language or unreadable files",
            AlertSchedule::Daily,
            move || {
                let validator = Arc::clone(&validator);
                async move {
                    let report = validator.checker().check_all_content().await;
                    Ok(consistency_alerts(&report))
                }
            },
        )
    };

    let outdated = {
        let validator = Arc::clone(&validator);
        AlertRule::new(
            "outdated-translations",
            "Outdated translations",
            "Translations that lag behind an updated English source",
            AlertSchedule::Weekly,
            move || {
                let validator = Arc::clone(&validator);
                async move {
                    let report = validator.validate_all_translations().await;
                    Ok(outdated_translation_alerts(&report))
                }
            },
        )
    };

    let pipeline = AlertRule::new(
        "content-pipeline-health",
        "Content pipeline health",
        "Checks that the content loader can list and parse content",
        AlertSchedule::OnDemand,
        move || {
            let validator = Arc::clone(&validator);
            async move {
                let health = validator.validate_content_loading_pipeline().await;
                Ok(pipeline_alerts(&health))
            }
        },
    );

    vec![missing, consistency, outdated, pipeline]
}

fn missing_translation_alerts(report: &ValidationReport, threshold: usize) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for missing in report
        .missing_translations
        .iter()
        .filter(|m| m.total_missing > 0)
    {
        let level = if missing.total_missing > threshold {
            AlertLevel::Error
        } else {
            AlertLevel::Warning
        };
        let details: Vec<String> = missing
            .missing_translations
            .iter()
            .map(|entry| {
                let langs: Vec<_> = entry.missing_languages.iter().map(|l| l.code()).collect();
                format!("{} ({})", entry.english_slug, langs.join(", "))
            })
            .collect();

        alerts.push(
            Alert::new(
                format!("missing-translations-{}", missing.content_type),
                level,
                format!(
                    "{} missing translations in {}",
                    missing.total_missing, missing.content_type
                ),
                details.join("; "),
            )
            .with_content_type(missing.content_type),
        );
    }

    for (i, warning) in report.warnings.iter().enumerate() {
        alerts.push(Alert::new(
            format!("scan-warning-{}", i),
            AlertLevel::Warning,
            "Content type skipped during scan",
            warning.clone(),
        ));
    }

    alerts
}

fn consistency_alerts(report: &ConsistencyReport) -> Vec<Alert> {
    report
        .issues
        .iter()
        .filter(|issue| issue.severity == Severity::Error)
        .map(|issue| {
            Alert::new(
                format!(
                    "consistency-{}-{}-{}-{}",
                    issue.kind.as_str(),
                    issue.content_type,
                    issue.language,
                    issue.english_slug
                ),
                AlertLevel::Error,
                format!(
                    "{} in {}/{}",
                    issue.kind.as_str(),
                    issue.content_type,
                    issue.english_slug
                ),
                issue.description.clone(),
            )
            .with_content_type(issue.content_type)
            .with_language(issue.language)
            .with_slug(issue.english_slug.clone())
        })
        .collect()
}

fn outdated_translation_alerts(report: &ValidationReport) -> Vec<Alert> {
    report
        .results
        .iter()
        .filter(|result| !result.outdated_translations.is_empty())
        .map(|result| {
            let langs: Vec<_> = result
                .outdated_translations
                .iter()
                .map(|l| l.code())
                .collect();
            Alert::new(
                format!("outdated-{}-{}", result.content_type, result.english_slug),
                AlertLevel::Warning,
                format!(
                    "Outdated translations for {}/{}",
                    result.content_type, result.english_slug
                ),
                format!("English source is newer than: {}", langs.join(", ")),
            )
            .with_content_type(result.content_type)
            .with_slug(result.english_slug.clone())
        })
        .collect()
}

fn pipeline_alerts(health: &PipelineHealth) -> Vec<Alert> {
    if health.is_valid {
        return Vec::new();
    }

    vec![Alert::new(
        "content-pipeline-health",
        AlertLevel::Error,
        "Content loading pipeline is unhealthy",
        health.errors.join("; "),
    )]
}

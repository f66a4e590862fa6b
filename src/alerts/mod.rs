//! Alert rule engine: a registry of named check functions that turn
//! validation and consistency findings into dismissible alerts.
//!
//! Rules are `enabled` or `disabled`. `run_all_alerts` only runs enabled
//! rules; `run_alert_rule` runs any registered rule, disabled or not.
//!
//! The registry lives behind a `RwLock` and is owned by whoever builds the
//! engine (the dashboard `AppState`, a test). Check functions run outside
//! the lock.

mod rules;

pub use rules::{default_rules, DefaultRuleOptions};

use crate::content::ContentType;
use crate::error::{ContentError, Result};
use crate::i18n::Language;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AlertSchedule {
    Daily,
    Weekly,
    OnDemand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Error,
    Warning,
    Info,
}

/// A single finding produced by a rule run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl Alert {
    pub fn new(
        id: impl Into<String>,
        level: AlertLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            level,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            content_type: None,
            language: None,
            slug: None,
        }
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

pub type CheckFuture = BoxFuture<'static, anyhow::Result<Vec<Alert>>>;
pub type CheckFunction = Arc<dyn Fn() -> CheckFuture + Send + Sync>;

/// A named, schedulable check.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub schedule: AlertSchedule,
    #[serde(skip)]
    check: CheckFunction,
}

impl AlertRule {
    /// Create an enabled rule.
    pub fn new<F, Fut>(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        schedule: AlertSchedule,
        check: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<Alert>>> + Send + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            enabled: true,
            schedule,
            check: Arc::new(move || check().boxed()),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Run the check, turning a failure into one generic error alert.
    async fn execute(&self) -> Vec<Alert> {
        debug!("Running alert rule '{}'", self.id);
        match (self.check)().await {
            Ok(alerts) => alerts,
            Err(e) => {
                error!("Alert rule '{}' failed: {:#}", self.id, e);
                vec![Alert::new(
                    format!("{}-failure-{}", self.id, Utc::now().timestamp_millis()),
                    AlertLevel::Error,
                    format!("Alert rule '{}' failed", self.name),
                    format!("{:#}", e),
                )]
            }
        }
    }
}

impl fmt::Debug for AlertRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertRule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

/// Partial update for a registered rule; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRulePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub schedule: Option<AlertSchedule>,
}

/// Registry of alert rules.
#[derive(Default)]
pub struct AlertRuleEngine {
    rules: RwLock<Vec<AlertRule>>,
}

impl AlertRuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<AlertRule>) -> Self {
        let engine = Self::new();
        for rule in rules {
            engine.add_alert_rule(rule);
        }
        engine
    }

    /// Run every enabled rule and concatenate the alerts.
    pub async fn run_all_alerts(&self) -> Vec<Alert> {
        self.run_matching(|rule| rule.enabled).await
    }

    /// Run every enabled rule with the given schedule.
    pub async fn run_scheduled(&self, schedule: AlertSchedule) -> Vec<Alert> {
        self.run_matching(|rule| rule.enabled && rule.schedule == schedule)
            .await
    }

    async fn run_matching(&self, filter: impl Fn(&AlertRule) -> bool) -> Vec<Alert> {
        let selected: Vec<AlertRule> = self
            .read_rules()
            .iter()
            .filter(|rule| filter(*rule))
            .cloned()
            .collect();

        let mut alerts = Vec::new();
        for rule in &selected {
            alerts.extend(rule.execute().await);
        }

        info!(
            "Ran {} alert rules, produced {} alerts",
            selected.len(),
            alerts.len()
        );
        alerts
    }

    /// Run one rule regardless of its enabled flag.
    pub async fn run_alert_rule(&self, id: &str) -> Result<Vec<Alert>> {
        let rule = self
            .read_rules()
            .iter()
            .find(|rule| rule.id == id)
            .cloned()
            .ok_or_else(|| ContentError::RuleNotFound(id.to_string()))?;

        Ok(rule.execute().await)
    }

    /// Snapshot of the registry.
    pub fn get_alert_rules(&self) -> Vec<AlertRule> {
        self.read_rules().clone()
    }

    /// Merge `patch` into the rule; false when no rule has this id.
    pub fn update_alert_rule(&self, id: &str, patch: AlertRulePatch) -> bool {
        let mut rules = self.write_rules();
        let Some(rule) = rules.iter_mut().find(|rule| rule.id == id) else {
            return false;
        };

        if let Some(name) = patch.name {
            rule.name = name;
        }
        if let Some(description) = patch.description {
            rule.description = description;
        }
        if let Some(enabled) = patch.enabled {
            rule.enabled = enabled;
        }
        if let Some(schedule) = patch.schedule {
            rule.schedule = schedule;
        }
        true
    }

    /// Register a rule; an existing rule with the same id is replaced in place.
    pub fn add_alert_rule(&self, rule: AlertRule) {
        let mut rules = self.write_rules();
        match rules.iter_mut().find(|existing| existing.id == rule.id) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
    }

    pub fn remove_alert_rule(&self, id: &str) -> bool {
        let mut rules = self.write_rules();
        let before = rules.len();
        rules.retain(|rule| rule.id != id);
        rules.len() != before
    }

    fn read_rules(&self) -> std::sync::RwLockReadGuard<'_, Vec<AlertRule>> {
        self.rules.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_rules(&self) -> std::sync::RwLockWriteGuard<'_, Vec<AlertRule>> {
        self.rules.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Alerts from the most recent run, shared between the scheduler and the dashboard.
#[derive(Debug, Clone, Default)]
pub struct AlertFeed {
    latest: Arc<RwLock<Vec<Alert>>>,
}

impl AlertFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the feed with the output of a newer run.
    pub fn publish(&self, alerts: Vec<Alert>) {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = alerts;
    }

    pub fn snapshot(&self) -> Vec<Alert> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ==================== Helper Functions ====================

    fn static_rule(id: &str, schedule: AlertSchedule, count: usize) -> AlertRule {
        let rule_id = id.to_string();
        AlertRule::new(id, format!("Rule {}", id), "test rule", schedule, move || {
            let rule_id = rule_id.clone();
            async move {
                let alerts: Vec<Alert> = (0..count)
                    .map(|i| {
                        Alert::new(format!("{}-{}", rule_id, i), AlertLevel::Info, "t", "m")
                    })
                    .collect();
                Ok::<_, anyhow::Error>(alerts)
            }
        })
    }

    fn failing_rule(id: &str) -> AlertRule {
        AlertRule::new(id, "Broken", "always fails", AlertSchedule::Daily, || async {
            Err::<Vec<Alert>, _>(anyhow::anyhow!("content root unreadable"))
        })
    }

    // ==================== run_all_alerts Tests ====================

    #[tokio::test]
    async fn test_run_all_concatenates_enabled_rules() {
        let engine = AlertRuleEngine::with_rules(vec![
            static_rule("a", AlertSchedule::Daily, 2),
            static_rule("b", AlertSchedule::Weekly, 1),
        ]);

        let alerts = engine.run_all_alerts().await;
        let ids: Vec<_> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a-0", "a-1", "b-0"]);
    }

    #[tokio::test]
    async fn test_disabled_rule_skipped_but_runnable_directly() {
        let engine = AlertRuleEngine::with_rules(vec![
            static_rule("on", AlertSchedule::Daily, 1),
            static_rule("off", AlertSchedule::Daily, 1).with_enabled(false),
        ]);

        let alerts = engine.run_all_alerts().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, "on-0");

        let forced = engine.run_alert_rule("off").await.expect("Rule exists");
        assert_eq!(forced.len(), 1);
        assert_eq!(forced[0].id, "off-0");
    }

    #[tokio::test]
    async fn test_failing_rule_is_isolated() {
        let engine = AlertRuleEngine::with_rules(vec![
            static_rule("before", AlertSchedule::Daily, 1),
            failing_rule("broken"),
            static_rule("after", AlertSchedule::Daily, 1),
        ]);

        let alerts = engine.run_all_alerts().await;
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].id, "before-0");
        assert_eq!(alerts[1].level, AlertLevel::Error);
        assert!(alerts[1].title.contains("Broken"));
        assert!(alerts[1].message.contains("content root unreadable"));
        assert_eq!(alerts[2].id, "after-0");
    }

    #[tokio::test]
    async fn test_run_scheduled_filters_by_schedule() {
        let engine = AlertRuleEngine::with_rules(vec![
            static_rule("daily", AlertSchedule::Daily, 1),
            static_rule("weekly", AlertSchedule::Weekly, 1),
            static_rule("manual", AlertSchedule::OnDemand, 1),
        ]);

        let weekly = engine.run_scheduled(AlertSchedule::Weekly).await;
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].id, "weekly-0");
    }

    #[tokio::test]
    async fn test_check_function_runs_each_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let engine = AlertRuleEngine::with_rules(vec![AlertRule::new(
            "count",
            "Counter",
            "",
            AlertSchedule::OnDemand,
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, anyhow::Error>(Vec::<Alert>::new()) }
            },
        )]);

        engine.run_all_alerts().await;
        engine.run_alert_rule("count").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    // ==================== Registry Tests ====================

    #[tokio::test]
    async fn test_run_alert_rule_unknown_id() {
        let engine = AlertRuleEngine::new();
        let result = engine.run_alert_rule("nope").await;
        assert!(matches!(result, Err(ContentError::RuleNotFound(id)) if id == "nope"));
    }

    #[test]
    fn test_add_replaces_duplicate_id_in_place() {
        let engine = AlertRuleEngine::with_rules(vec![
            static_rule("a", AlertSchedule::Daily, 1),
            static_rule("b", AlertSchedule::Daily, 1),
        ]);
        engine.add_alert_rule(static_rule("a", AlertSchedule::Weekly, 1));

        let rules = engine.get_alert_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, "a");
        assert_eq!(rules[0].schedule, AlertSchedule::Weekly);
    }

    #[test]
    fn test_update_alert_rule_merges_patch() {
        let engine = AlertRuleEngine::with_rules(vec![static_rule("a", AlertSchedule::Daily, 1)]);

        let updated = engine.update_alert_rule(
            "a",
            AlertRulePatch {
                enabled: Some(false),
                ..Default::default()
            },
        );
        assert!(updated);

        let rule = &engine.get_alert_rules()[0];
        assert!(!rule.enabled);
        assert_eq!(rule.name, "Rule a");
        assert_eq!(rule.schedule, AlertSchedule::Daily);
    }

    #[test]
    fn test_update_unknown_rule_returns_false() {
        let engine = AlertRuleEngine::new();
        assert!(!engine.update_alert_rule("x", AlertRulePatch::default()));
    }

    #[test]
    fn test_remove_alert_rule() {
        let engine = AlertRuleEngine::with_rules(vec![static_rule("a", AlertSchedule::Daily, 1)]);
        assert!(engine.remove_alert_rule("a"));
        assert!(!engine.remove_alert_rule("a"));
        assert!(engine.get_alert_rules().is_empty());
    }

    // ==================== Serialization Tests ====================

    #[test]
    fn test_alert_serialization() {
        let alert = Alert::new("id-1", AlertLevel::Warning, "Title", "Message")
            .with_content_type(ContentType::Legal)
            .with_language(Language::De)
            .with_slug("privacy");
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "warning");
        assert_eq!(json["contentType"], "legal");
        assert_eq!(json["language"], "de");
        assert_eq!(json["slug"], "privacy");
    }

    #[test]
    fn test_alert_omits_empty_scope() {
        let json = serde_json::to_value(Alert::new("x", AlertLevel::Info, "t", "m")).unwrap();
        assert!(json.get("contentType").is_none());
        assert!(json.get("slug").is_none());
    }

    #[test]
    fn test_rule_serialization_skips_check() {
        let json = serde_json::to_value(static_rule("a", AlertSchedule::OnDemand, 0)).unwrap();
        assert_eq!(json["schedule"], "on-demand");
        assert_eq!(json["enabled"], true);
        assert!(json.get("check").is_none());
    }

    #[test]
    fn test_patch_deserializes_camel_case() {
        let patch: AlertRulePatch =
            serde_json::from_str(r#"{"enabled": false, "schedule": "weekly"}"#).unwrap();
        assert_eq!(patch.enabled, Some(false));
        assert_eq!(patch.schedule, Some(AlertSchedule::Weekly));
        assert!(patch.name.is_none());
    }

    // ==================== AlertFeed Tests ====================

    #[test]
    fn test_alert_feed_publish_replaces() {
        let feed = AlertFeed::new();
        assert!(feed.snapshot().is_empty());

        let shared = feed.clone();
        shared.publish(vec![Alert::new("a", AlertLevel::Info, "t", "m")]);
        assert_eq!(feed.snapshot().len(), 1);

        feed.publish(Vec::new());
        assert!(shared.snapshot().is_empty());
    }
}

//! Content-management dashboard HTTP surface.
//!
//! Everything a handler needs is composed once at startup into [`AppState`];
//! there is no process-wide state.

mod handlers;
mod server;

pub use handlers::ApiError;
pub use server::{router, run};

use crate::abtest::{default_experiments, AnalyticsSink, ExperimentCatalog, TracingAnalytics};
use crate::alerts::{default_rules, AlertFeed, AlertRuleEngine};
use crate::config::Config;
use crate::content::ContentAccessor;
use crate::validation::{ContentValidator, ValidationReport};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub accessor: Arc<dyn ContentAccessor>,
    pub validator: Arc<ContentValidator>,
    pub engine: Arc<AlertRuleEngine>,
    pub feed: AlertFeed,
    pub experiments: Arc<ExperimentCatalog>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub api_key: Option<String>,
    pub cookie_max_age_days: u32,
    report: Arc<RwLock<Option<ValidationReport>>>,
}

impl AppState {
    /// Compose the validator, default alert rules and default experiments.
    pub fn new(config: &Config, accessor: Arc<dyn ContentAccessor>) -> Self {
        let validator = Arc::new(ContentValidator::new(
            Arc::clone(&accessor),
            config.consistency_options(),
        ));
        let engine = Arc::new(AlertRuleEngine::with_rules(default_rules(
            Arc::clone(&validator),
            config.rule_options(),
        )));
        let experiments = default_experiments()
            .into_iter()
            .map(|experiment| (experiment.id.clone(), experiment))
            .collect();

        Self {
            accessor,
            validator,
            engine,
            feed: AlertFeed::new(),
            experiments: Arc::new(experiments),
            analytics: Arc::new(TracingAnalytics),
            api_key: config.api_key.clone(),
            cookie_max_age_days: config.abtest_cookie_max_age_days,
            report: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }

    /// The last generated validation report, if any.
    pub fn cached_report(&self) -> Option<ValidationReport> {
        self.report
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rescan the content tree and cache the new report.
    pub async fn refresh_report(&self) -> ValidationReport {
        let report = self.validator.validate_all_translations().await;
        *self.report.write().unwrap_or_else(PoisonError::into_inner) = Some(report.clone());
        report
    }
}

use crate::alerts::DefaultRuleOptions;
use crate::validation::ConsistencyOptions;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Content
    pub content_root: PathBuf,

    // Dashboard
    pub port: u16,
    pub api_key: Option<String>,

    // Consistency checks
    pub staleness_threshold_days: i64,
    pub section_count_tolerance: usize,

    // Alerts
    pub missing_translation_alert_threshold: usize,
    pub daily_alert_time: String,
    pub weekly_alert_day: String,

    // A/B testing
    pub abtest_cookie_max_age_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("src/content"),
            port: 8080,
            api_key: None,
            staleness_threshold_days: 90,
            section_count_tolerance: 1,
            missing_translation_alert_threshold: 5,
            daily_alert_time: "06:00".to_string(),
            weekly_alert_day: "Mon".to_string(),
            abtest_cookie_max_age_days: 365,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match std::env::var("PORT") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", value))?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            // Content
            content_root: std::env::var("CONTENT_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.content_root),

            // Dashboard
            port,
            api_key: std::env::var("API_KEY").ok().filter(|key| !key.is_empty()),

            // Consistency checks
            staleness_threshold_days: parse_or("STALENESS_THRESHOLD_DAYS", defaults.staleness_threshold_days),
            section_count_tolerance: parse_or("SECTION_COUNT_TOLERANCE", defaults.section_count_tolerance),

            // Alerts
            missing_translation_alert_threshold: parse_or(
                "MISSING_TRANSLATION_ALERT_THRESHOLD",
                defaults.missing_translation_alert_threshold,
            ),
            daily_alert_time: std::env::var("DAILY_ALERT_TIME")
                .unwrap_or(defaults.daily_alert_time),
            weekly_alert_day: std::env::var("WEEKLY_ALERT_DAY")
                .unwrap_or(defaults.weekly_alert_day),

            // A/B testing
            abtest_cookie_max_age_days: parse_or(
                "ABTEST_COOKIE_MAX_AGE_DAYS",
                defaults.abtest_cookie_max_age_days,
            ),
        })
    }

    pub fn consistency_options(&self) -> ConsistencyOptions {
        ConsistencyOptions {
            staleness_threshold_days: self.staleness_threshold_days,
            section_tolerance: self.section_count_tolerance,
        }
    }

    pub fn rule_options(&self) -> DefaultRuleOptions {
        DefaultRuleOptions {
            missing_translation_threshold: self.missing_translation_alert_threshold,
        }
    }
}

/// Read a numeric variable, falling back to the default when unset or invalid.
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

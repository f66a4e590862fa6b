//! Side channel for assignment and conversion events.

use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionEvent {
    pub user_id: String,
    pub experiment_id: String,
    pub variant_id: String,
    pub conversion_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum AnalyticsEvent {
    #[serde(rename_all = "camelCase")]
    Assignment {
        user_id: String,
        experiment_id: String,
        variant_id: String,
    },
    Conversion(ConversionEvent),
}

/// Receives experiment events. Implementations must not fail the caller.
pub trait AnalyticsSink: Send + Sync {
    fn track_assignment(&self, user_id: &str, experiment_id: &str, variant_id: &str);
    fn track_conversion(&self, event: &ConversionEvent);
}

/// Emits events as structured log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn track_assignment(&self, user_id: &str, experiment_id: &str, variant_id: &str) {
        info!(user_id, experiment_id, variant_id, "Experiment assignment");
    }

    fn track_conversion(&self, event: &ConversionEvent) {
        info!(
            user_id = %event.user_id,
            experiment_id = %event.experiment_id,
            variant_id = %event.variant_id,
            conversion_type = %event.conversion_type,
            value = ?event.value,
            "Experiment conversion"
        );
    }
}

/// Records events in memory, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct MemoryAnalytics {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl MemoryAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: AnalyticsEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl AnalyticsSink for MemoryAnalytics {
    fn track_assignment(&self, user_id: &str, experiment_id: &str, variant_id: &str) {
        self.push(AnalyticsEvent::Assignment {
            user_id: user_id.to_string(),
            experiment_id: experiment_id.to_string(),
            variant_id: variant_id.to_string(),
        });
    }

    fn track_conversion(&self, event: &ConversionEvent) {
        self.push(AnalyticsEvent::Conversion(event.clone()));
    }
}

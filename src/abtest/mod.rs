//! A/B testing: deterministic, weighted variant assignment per
//! (user, experiment), persisted through an [`AssignmentStore`].
//!
//! Assignment is a pure function of the user id, experiment id and the
//! experiment's variant weights. Storage only remembers the outcome so that
//! inclusion in an experiment is sticky while exclusion by traffic
//! allocation is re-rolled on the next call.

mod analytics;
mod experiments;
mod hash;
mod manager;
mod store;

pub use analytics::{AnalyticsEvent, AnalyticsSink, ConversionEvent, MemoryAnalytics, TracingAnalytics};
pub use experiments::default_experiments;
pub use hash::assignment_hash;
pub use manager::{AbTestManager, ExperimentCatalog};
pub use store::{Assignments, AssignmentStore, CookieAssignmentStore, MemoryAssignmentStore, COOKIE_NAME};

use crate::error::AbTestError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque per-variant settings consumed by the page layer.
pub type VariantConfig = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTestVariant {
    pub id: String,
    pub weight: u32,
    #[serde(default)]
    pub config: VariantConfig,
}

impl AbTestVariant {
    pub fn new(id: impl Into<String>, weight: u32) -> Self {
        Self {
            id: id.into(),
            weight,
            config: VariantConfig::new(),
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTestExperiment {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    /// Percentage of users included in the experiment at all (0..=100)
    pub traffic_allocation: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_page: Option<String>,
    pub variants: Vec<AbTestVariant>,
}

impl AbTestExperiment {
    pub fn total_weight(&self) -> u64 {
        self.variants.iter().map(|v| u64::from(v.weight)).sum()
    }

    /// Reject definitions that cannot produce an assignment.
    pub fn validate(&self) -> Result<(), AbTestError> {
        let reason = if self.variants.is_empty() {
            "experiment has no variants"
        } else if self.total_weight() == 0 {
            "all variant weights are zero"
        } else if self.traffic_allocation > 100 {
            "traffic allocation is above 100"
        } else {
            return Ok(());
        };

        Err(AbTestError::Configuration {
            experiment_id: self.id.clone(),
            reason: reason.to_string(),
        })
    }

    /// Map a hash bucket onto a variant.
    ///
    /// The bucket is reduced modulo the total weight and the variants are
    /// walked in declared order, so each variant owns the half-open range
    /// `[cumulative, cumulative + weight)`. Returns `None` only when the
    /// total weight is zero.
    pub fn select_variant(&self, bucket: u32) -> Option<&AbTestVariant> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }

        let target = u64::from(bucket) % total;
        let mut cumulative = 0u64;
        for variant in &self.variants {
            cumulative += u64::from(variant.weight);
            if target < cumulative {
                return Some(variant);
            }
        }
        None
    }

    pub fn variant(&self, variant_id: &str) -> Option<&AbTestVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }
}

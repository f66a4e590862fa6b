//! Variant assignment and conversion tracking.

use crate::abtest::{
    assignment_hash, AbTestExperiment, AnalyticsSink, Assignments, AssignmentStore,
    ConversionEvent, TracingAnalytics, VariantConfig,
};
use crate::error::AbTestError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Experiment definitions keyed by id.
pub type ExperimentCatalog = BTreeMap<String, AbTestExperiment>;

struct ManagerState<S> {
    assignments: Assignments,
    store: S,
    rng: StdRng,
}

/// Assigns users to experiment variants.
///
/// The check for an existing assignment and the write of a new one happen
/// under the same lock, so concurrent first calls for the same user and
/// experiment agree on a single variant.
pub struct AbTestManager<S: AssignmentStore> {
    experiments: Arc<ExperimentCatalog>,
    analytics: Arc<dyn AnalyticsSink>,
    state: Mutex<ManagerState<S>>,
}

impl<S: AssignmentStore> AbTestManager<S> {
    pub fn new(experiments: Vec<AbTestExperiment>, store: S) -> Self {
        let catalog = experiments.into_iter().map(|e| (e.id.clone(), e)).collect();
        Self::with_catalog(Arc::new(catalog), store)
    }

    /// Build a manager over a shared catalog, loading prior assignments from the store.
    pub fn with_catalog(experiments: Arc<ExperimentCatalog>, store: S) -> Self {
        let assignments = store.get();
        Self {
            experiments,
            analytics: Arc::new(TracingAnalytics),
            state: Mutex::new(ManagerState {
                assignments,
                store,
                rng: StdRng::from_entropy(),
            }),
        }
    }

    pub fn with_analytics(self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        Self { analytics, ..self }
    }

    /// Seed the traffic allocation roll.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.state_mut().rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn experiment(&self, experiment_id: &str) -> Option<&AbTestExperiment> {
        self.experiments.get(experiment_id)
    }

    /// The user's variant for an experiment, assigning one on first call.
    ///
    /// Returns `Ok(None)` when the experiment is unknown or inactive, or when
    /// the traffic allocation roll excludes the user. Exclusion is not stored.
    pub fn get_user_variant(
        &self,
        user_id: &str,
        experiment_id: &str,
    ) -> Result<Option<String>, AbTestError> {
        let Some(experiment) = self.experiments.get(experiment_id) else {
            return Ok(None);
        };
        if !experiment.is_active {
            return Ok(None);
        }
        experiment.validate()?;

        let variant_id = {
            let mut state = self.lock();
            if let Some(existing) = lookup(&state.assignments, user_id, experiment_id) {
                return Ok(Some(existing.to_string()));
            }

            let roll: u8 = state.rng.gen_range(0..100);
            if roll >= experiment.traffic_allocation {
                debug!(
                    "User {} excluded from {} by traffic allocation",
                    user_id, experiment_id
                );
                return Ok(None);
            }

            let bucket = assignment_hash(user_id, experiment_id);
            let Some(variant) = experiment.select_variant(bucket) else {
                return Err(AbTestError::Configuration {
                    experiment_id: experiment_id.to_string(),
                    reason: "no variant covers the hash bucket".to_string(),
                });
            };

            state.assign(user_id, experiment_id, &variant.id);
            variant.id.clone()
        };

        self.analytics
            .track_assignment(user_id, experiment_id, &variant_id);
        Ok(Some(variant_id))
    }

    pub fn get_variant_config(&self, experiment_id: &str, variant_id: &str) -> Option<&VariantConfig> {
        self.experiments
            .get(experiment_id)?
            .variant(variant_id)
            .map(|variant| &variant.config)
    }

    /// Record a conversion tagged with the user's stored variant.
    ///
    /// Returns false, and records nothing, when the user has no assignment.
    pub fn track_conversion(
        &self,
        user_id: &str,
        experiment_id: &str,
        conversion_type: &str,
        value: Option<f64>,
    ) -> bool {
        let Some(variant_id) = self.assignment(user_id, experiment_id) else {
            debug!(
                "Ignoring {} conversion for unassigned user {} in {}",
                conversion_type, user_id, experiment_id
            );
            return false;
        };

        self.analytics.track_conversion(&ConversionEvent {
            user_id: user_id.to_string(),
            experiment_id: experiment_id.to_string(),
            variant_id,
            conversion_type: conversion_type.to_string(),
            value,
        });
        true
    }

    /// Overwrite an assignment without checking the variant exists.
    pub fn force_assign(&self, user_id: &str, experiment_id: &str, variant_id: &str) {
        self.lock().assign(user_id, experiment_id, variant_id);
    }

    pub fn assignment(&self, user_id: &str, experiment_id: &str) -> Option<String> {
        lookup(&self.lock().assignments, user_id, experiment_id).map(str::to_string)
    }

    pub fn assignments(&self) -> Assignments {
        self.lock().assignments.clone()
    }

    /// Hand the store back, e.g. to emit the updated cookie.
    pub fn into_store(self) -> S {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .store
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut ManagerState<S> {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: AssignmentStore> ManagerState<S> {
    fn assign(&mut self, user_id: &str, experiment_id: &str, variant_id: &str) {
        self.assignments
            .entry(user_id.to_string())
            .or_default()
            .insert(experiment_id.to_string(), variant_id.to_string());
        self.store.set_all(&self.assignments);
    }
}

fn lookup<'a>(assignments: &'a Assignments, user_id: &str, experiment_id: &str) -> Option<&'a str> {
    assignments
        .get(user_id)?
        .get(experiment_id)
        .map(String::as_str)
}

//! Execution results.
//!
//! Outcomes are keyed by their Fock-state label, e.g. `|0,1,1,0>`, so the
//! same containers work for local simulation and for remote JSON payloads.

use std::collections::BTreeMap;

use fusegraph_ir::FockState;
use serde::{Deserialize, Serialize};

/// Sampled detection counts keyed by outcome label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: BTreeMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `outcome`; repeated outcomes accumulate.
    pub fn insert(&mut self, outcome: impl Into<String>, count: u64) {
        *self.counts.entry(outcome.into()).or_insert(0) += count;
    }

    /// Count for an outcome, zero when absent.
    pub fn get(&self, outcome: &str) -> u64 {
        self.counts.get(outcome).copied().unwrap_or(0)
    }

    /// Total number of recorded shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Most frequent outcome; ties go to the smallest label.
    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
    }

    /// Iterate outcomes in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(FockState, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (FockState, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (state, count) in iter {
            counts.insert(state.to_string(), count);
        }
        counts
    }
}

/// Output probabilities keyed by outcome label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution {
    probabilities: BTreeMap<String, f64>,
}

impl Distribution {
    /// Create an empty distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add probability mass to `outcome`.
    pub fn insert(&mut self, outcome: impl Into<String>, probability: f64) {
        *self.probabilities.entry(outcome.into()).or_insert(0.0) += probability;
    }

    /// Probability of an outcome, zero when absent.
    pub fn get(&self, outcome: &str) -> f64 {
        self.probabilities.get(outcome).copied().unwrap_or(0.0)
    }

    /// Sum of all probabilities.
    pub fn total(&self) -> f64 {
        self.probabilities.values().sum()
    }

    /// Scale so the probabilities sum to one. No-op on an empty or zero-mass
    /// distribution.
    pub fn normalize(&mut self) {
        let total = self.total();
        if total > 0.0 {
            for p in self.probabilities.values_mut() {
                *p /= total;
            }
        }
    }

    /// Iterate outcomes in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.probabilities.iter()
    }

    /// Number of outcomes with recorded mass.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Check whether the distribution has no outcomes.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }
}

impl FromIterator<(FockState, f64)> for Distribution {
    fn from_iter<I: IntoIterator<Item = (FockState, f64)>>(iter: I) -> Self {
        let mut dist = Distribution::new();
        for (state, p) in iter {
            dist.insert(state.to_string(), p);
        }
        dist
    }
}

/// Payload of a finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ResultData {
    /// Exact probabilities.
    Probabilities(Distribution),
    /// Sampled counts.
    Samples(Counts),
}

/// Result of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Outcome data.
    pub data: ResultData,
    /// Probability that an outcome passed postselection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance: Option<f64>,
    /// Execution time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Backend-specific metadata.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ExecutionResult {
    /// Result carrying a probability distribution.
    pub fn probabilities(distribution: Distribution) -> Self {
        Self::from_data(ResultData::Probabilities(distribution))
    }

    /// Result carrying sampled counts.
    pub fn samples(counts: Counts) -> Self {
        Self::from_data(ResultData::Samples(counts))
    }

    fn from_data(data: ResultData) -> Self {
        Self {
            data,
            acceptance: None,
            execution_time_ms: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Set the postselection acceptance probability.
    pub fn with_acceptance(mut self, acceptance: f64) -> Self {
        self.acceptance = Some(acceptance);
        self
    }

    /// Set the execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The distribution, if this is a probability result.
    pub fn distribution(&self) -> Option<&Distribution> {
        match &self.data {
            ResultData::Probabilities(d) => Some(d),
            ResultData::Samples(_) => None,
        }
    }

    /// The counts, if this is a sampling result.
    pub fn counts(&self) -> Option<&Counts> {
        match &self.data {
            ResultData::Samples(c) => Some(c),
            ResultData::Probabilities(_) => None,
        }
    }
}

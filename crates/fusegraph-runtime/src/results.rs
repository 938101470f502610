//! Query results keyed by outcome label.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;

use fusegraph_hal::{Counts, Distribution, ExecutionResult, HalError};
use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};

/// Value stored per outcome.
pub trait OutcomeValue: Copy + Default + AddAssign + fmt::Debug {
    /// Column header used when rendering a table.
    const HEADER: &'static str;

    /// Render one cell.
    fn cell(&self) -> String;
}

impl OutcomeValue for u64 {
    const HEADER: &'static str = "counts";

    fn cell(&self) -> String {
        self.to_string()
    }
}

impl OutcomeValue for f64 {
    const HEADER: &'static str = "probability";

    fn cell(&self) -> String {
        format!("{self:.6}")
    }
}

/// Outcomes of one query, keyed by raw Fock string or logical label.
///
/// Keys are either raw detection patterns such as `|0,1,1,0>` or, after
/// [`replace_keys`](Outcomes::replace_keys), logical labels such as `|01>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcomes<V> {
    values: BTreeMap<String, V>,
    /// Fraction of raw probability that passed postselection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    acceptance: Option<f64>,
}

/// Sampled detection counts.
pub type PhotonCount = Outcomes<u64>;

/// Output probabilities.
pub type PhotonDistribution = Outcomes<f64>;

impl<V: OutcomeValue> Outcomes<V> {
    /// Create an empty result.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            acceptance: None,
        }
    }

    /// Record a value, accumulating on an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        *self.values.entry(key.into()).or_default() += value;
    }

    /// Set the postselection acceptance.
    pub fn with_acceptance(mut self, acceptance: Option<f64>) -> Self {
        self.acceptance = acceptance;
        self
    }

    /// Fraction of raw probability that passed postselection, if reported.
    pub fn acceptance(&self) -> Option<f64> {
        self.acceptance
    }

    /// Value for `key`.
    ///
    /// Fails with [`RuntimeError::KeyNotFound`] when the outcome was never
    /// observed or was dropped by relabelling.
    pub fn get(&self, key: &str) -> RuntimeResult<V> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| RuntimeError::KeyNotFound(key.to_string()))
    }

    /// Check whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Relabel outcomes through `labels`, dropping keys it does not map.
    pub fn replace_keys(self, labels: &BTreeMap<String, String>) -> Self {
        let mut relabelled = Self::new().with_acceptance(self.acceptance);
        for (key, value) in self.values {
            if let Some(label) = labels.get(&key) {
                relabelled.insert(label.clone(), value);
            }
        }
        relabelled
    }

    /// Sum of all values.
    pub fn total(&self) -> V {
        self.values.values().fold(V::default(), |mut acc, v| {
            acc += *v;
            acc
        })
    }

    /// Iterate over `(key, value)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, V)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether there are no outcomes.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: OutcomeValue> Default for Outcomes<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: OutcomeValue, K: Into<String>> FromIterator<(K, V)> for Outcomes<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut outcomes = Self::new();
        for (key, value) in iter {
            outcomes.insert(key, value);
        }
        outcomes
    }
}

impl From<&Counts> for PhotonCount {
    fn from(counts: &Counts) -> Self {
        counts.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

impl From<&Distribution> for PhotonDistribution {
    fn from(distribution: &Distribution) -> Self {
        distribution.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

impl TryFrom<&ExecutionResult> for PhotonDistribution {
    type Error = RuntimeError;

    fn try_from(result: &ExecutionResult) -> RuntimeResult<Self> {
        let distribution = result.distribution().ok_or_else(|| {
            RuntimeError::Backend(HalError::Backend(
                "expected probabilities, backend returned samples".into(),
            ))
        })?;
        Ok(Self::from(distribution).with_acceptance(result.acceptance))
    }
}

impl TryFrom<&ExecutionResult> for PhotonCount {
    type Error = RuntimeError;

    fn try_from(result: &ExecutionResult) -> RuntimeResult<Self> {
        let counts = result.counts().ok_or_else(|| {
            RuntimeError::Backend(HalError::Backend(
                "expected samples, backend returned probabilities".into(),
            ))
        })?;
        Ok(Self::from(counts).with_acceptance(result.acceptance))
    }
}

impl<V: OutcomeValue> fmt::Display for Outcomes<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<(&str, String)> = self.iter().map(|(k, v)| (k, v.cell())).collect();
        let key_width = rows
            .iter()
            .map(|(k, _)| k.chars().count())
            .chain(std::iter::once("state".len()))
            .max()
            .unwrap_or(0);
        let value_width = rows
            .iter()
            .map(|(_, v)| v.len())
            .chain(std::iter::once(V::HEADER.len()))
            .max()
            .unwrap_or(0);

        writeln!(f, "{:<key_width$}  {:>value_width$}", "state", V::HEADER)?;
        writeln!(f, "{}  {}", "-".repeat(key_width), "-".repeat(value_width))?;
        for (key, value) in rows {
            writeln!(f, "{key:<key_width$}  {value:>value_width$}")?;
        }
        Ok(())
    }
}

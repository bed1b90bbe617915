//! Plan file configuration
//!
//! Parses TOML plan files describing named workloads and their shares, and
//! turns them into a [`WeightedSelector`] whose actions return the workload
//! name.

use crate::error::{BalancerError, BalancerResult};
use crate::selector::WeightedSelector;
use crate::workload::WeightedWorkload;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

/// Root plan structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanConfig {
    pub workloads: Vec<WorkloadConfig>,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// One named workload in a plan
///
/// A workload without a probability receives whatever share remains; only the
/// last workload may omit it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkloadConfig {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    probability: Option<i32>,
}

impl WorkloadConfig {
    pub fn new(name: impl Into<String>, probability: Option<i32>) -> Self {
        Self {
            name: name.into(),
            probability,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit share, or `None` when the workload takes the remainder
    pub fn probability(&self) -> Option<i32> {
        self.probability
    }
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PlanConfig {
    /// Load a plan from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> BalancerResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            BalancerError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let plan: Self =
            toml::from_str(&content).map_err(|source| BalancerError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        plan.validate()
            .map_err(|e| BalancerError::ConfigValidationFailed {
                path: path_display.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            path = %path_display,
            workloads = plan.workloads.len(),
            "Loaded plan file"
        );

        Ok(plan)
    }

    /// Validate the plan after parsing
    ///
    /// Called by `from_file()` and `from_str()`. Besides the structural checks
    /// this registers every workload on a scratch selector, so anything that
    /// passes here builds a Ready selector.
    pub fn validate(&self) -> BalancerResult<()> {
        if self.workloads.is_empty() {
            return Err(BalancerError::Config(
                "plan has no workloads; add at least one [[workloads]] entry".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for workload in &self.workloads {
            if workload.name.trim().is_empty() {
                return Err(BalancerError::Config(
                    "workload name must not be empty".to_string(),
                ));
            }
            if !seen.insert(workload.name.as_str()) {
                return Err(BalancerError::Config(format!(
                    "workload '{}' is defined more than once",
                    workload.name
                )));
            }
        }

        let last = self.workloads.len() - 1;
        if let Some((index, workload)) = self
            .workloads
            .iter()
            .enumerate()
            .find(|(index, w)| w.probability.is_none() && *index != last)
        {
            return Err(BalancerError::Config(format!(
                "workload '{}' (position {}) has no probability; only the last workload \
                may omit it and take the remaining share",
                workload.name,
                index + 1
            )));
        }

        let selector = self.build_selector()?;
        if !selector.is_ready() {
            return Err(BalancerError::Config(format!(
                "workload probabilities add up to {}%, expected exactly 100%",
                selector.accumulated_percentage()
            )));
        }

        Ok(())
    }

    /// Register every workload, in file order, on a new selector
    ///
    /// Each action returns the workload name. The selector is not required to
    /// be Ready; call `validate()` for that.
    pub fn build_selector(&self) -> BalancerResult<WeightedSelector<String>> {
        let mut selector = WeightedSelector::new();
        for workload in &self.workloads {
            let name = workload.name.clone();
            let entry = WeightedWorkload::new(workload.probability.unwrap_or(0), move || {
                name.clone()
            })
            .with_name(workload.name.clone());

            let registered = match workload.probability {
                Some(_) => selector.add(entry),
                None => selector.fill(entry),
            };
            registered.map_err(|e| {
                BalancerError::Config(format!("workload '{}': {}", workload.name, e))
            })?;
        }
        Ok(selector)
    }
}

impl FromStr for PlanConfig {
    type Err = BalancerError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let plan: PlanConfig =
            toml::from_str(toml_str).map_err(|source| BalancerError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        plan.validate()?;
        Ok(plan)
    }
}

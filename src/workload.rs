//! Workload entries handed to a [`WeightedSelector`](crate::selector::WeightedSelector)
//!
//! A workload is an opaque zero-argument action. The weighted variant adds the
//! share of traffic it should receive. Entries never carry their own bounds:
//! the selector computes those and keeps them next to the entry.

use crate::error::{BalancerError, BalancerResult};
use std::fmt;
use std::sync::Arc;

/// Shareable zero-argument action producing a `T`
pub type Action<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Wraps exactly one action
pub struct Workload<T> {
    action: Action<T>,
}

impl<T> Workload<T> {
    /// Wrap a closure as a workload
    pub fn new<F>(action: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
        }
    }

    /// Wrap an action that may be absent
    ///
    /// # Errors
    ///
    /// Returns `BalancerError::InvalidArgument` when `action` is `None`.
    pub fn try_new(action: Option<Action<T>>) -> BalancerResult<Self> {
        match action {
            Some(action) => Ok(Self { action }),
            None => Err(BalancerError::invalid_argument("supplier can not be null")),
        }
    }

    /// Get the wrapped action
    pub fn action(&self) -> &Action<T> {
        &self.action
    }

    /// Invoke the wrapped action
    ///
    /// Whatever the action returns (or panics with) reaches the caller as is.
    pub fn run(&self) -> T {
        (self.action)()
    }
}

impl<T> Clone for Workload<T> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
        }
    }
}

impl<T> fmt::Debug for Workload<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workload").finish_non_exhaustive()
    }
}

/// A workload with a percentage share of traffic
///
/// The entity performs no validation. A probability outside 0..=100 is
/// representable on purpose so the selector can reject it at registration.
pub struct WeightedWorkload<T> {
    workload: Workload<T>,
    probability: i32,
    name: Option<String>,
}

impl<T> WeightedWorkload<T> {
    /// Create a workload with an explicit percentage share
    pub fn new<F>(probability: i32, action: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_workload(probability, Workload::new(action))
    }

    /// Create a workload with probability 0, meant to be registered through
    /// `fill`
    pub fn unweighted<F>(action: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_workload(0, Workload::new(action))
    }

    /// Attach a percentage share to an existing workload
    pub fn from_workload(probability: i32, workload: Workload<T>) -> Self {
        Self {
            workload,
            probability,
            name: None,
        }
    }

    /// Label used in logs and simulation reports
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn probability(&self) -> i32 {
        self.probability
    }

    pub(crate) fn set_probability(&mut self, probability: i32) {
        self.probability = probability;
    }

    pub fn workload(&self) -> &Workload<T> {
        &self.workload
    }

    /// Get the wrapped action
    pub fn action(&self) -> &Action<T> {
        self.workload.action()
    }
}

impl<T> fmt::Debug for WeightedWorkload<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedWorkload")
            .field("name", &self.name)
            .field("probability", &self.probability)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_runs_wrapped_action() {
        let workload = Workload::new(|| 42);
        assert_eq!(workload.run(), 42);
        assert_eq!((workload.action())(), 42);
    }

    #[test]
    fn test_workload_try_new_rejects_missing_action() {
        let result = Workload::<u32>::try_new(None);
        match result {
            Err(BalancerError::InvalidArgument(msg)) => {
                assert_eq!(msg, "supplier can not be null");
            }
            other => panic!("expected InvalidArgument, got: {:?}", other),
        }
    }

    #[test]
    fn test_workload_try_new_accepts_present_action() {
        let action: Action<&str> = Arc::new(|| "ok");
        let workload = Workload::try_new(Some(action)).expect("action is present");
        assert_eq!(workload.run(), "ok");
    }

    #[test]
    fn test_weighted_workload_keeps_probability_unvalidated() {
        let entry = WeightedWorkload::new(250, || ());
        assert_eq!(entry.probability(), 250);

        let entry = WeightedWorkload::new(-3, || ());
        assert_eq!(entry.probability(), -3);
    }

    #[test]
    fn test_unweighted_defaults_to_zero() {
        let entry = WeightedWorkload::unweighted(|| "rest");
        assert_eq!(entry.probability(), 0);
        assert!(entry.name().is_none());
    }

    #[test]
    fn test_set_probability_overwrites() {
        let mut entry = WeightedWorkload::new(10, || ()).with_name("a");
        entry.set_probability(90);
        assert_eq!(entry.probability(), 90);
        assert_eq!(entry.name(), Some("a"));
    }

    #[test]
    fn test_cloned_workload_shares_action() {
        let workload = Workload::new(|| String::from("shared"));
        let clone = workload.clone();
        assert!(Arc::ptr_eq(workload.action(), clone.action()));
    }
}

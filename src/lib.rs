//! asymmetric-balancer - percentage-based weighted workload selection
//!
//! Register workloads with a percentage share each, then let the selector
//! pick one at random in proportion to those shares and run it.
//!
//! ```
//! use asymmetric_balancer::{WeightedSelector, WeightedWorkload};
//!
//! # fn main() -> asymmetric_balancer::BalancerResult<()> {
//! let mut selector = WeightedSelector::new();
//! selector
//!     .add(WeightedWorkload::new(70, || "stable"))?
//!     .fill(WeightedWorkload::unweighted(|| "canary"))?;
//!
//! let chosen = selector.balance()?;
//! assert!(chosen == "stable" || chosen == "canary");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod selector;
pub mod telemetry;
pub mod workload;

pub use error::{BalancerError, BalancerResult};
pub use selector::{Allocation, SelectorState, WeightedSelector};
pub use workload::{Action, WeightedWorkload, Workload};

/// Something that picks one workload per call and returns its result
pub trait LoadBalancer<T> {
    fn balance(&self) -> BalancerResult<T>;
}

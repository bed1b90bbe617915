//! Percentage-based weighted selection
//!
//! Maps each registered workload onto a contiguous slice of the integer
//! space 0..100 and picks one by drawing a uniform value from that space.
//!
//! Registration (`add`/`fill`) takes `&mut self` and must finish on one thread.
//! Once the shares sum to exactly 100 the selector is Ready and `balance`
//! can run concurrently through a shared reference.

use crate::LoadBalancer;
use crate::error::{BalancerError, BalancerResult};
use crate::workload::WeightedWorkload;
use rand::Rng;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Size of the draw space; shares must add up to exactly this value
pub const MAX_PERCENTAGE: i32 = 100;

/// Inclusive slice of the draw space owned by one entry
///
/// An entry with probability 0 gets `upper_bound == lower_bound - 1`, an
/// empty range that no draw can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    lower_bound: i32,
    upper_bound: i32,
}

impl Allocation {
    fn starting_at(accumulated: i32, probability: i32) -> Self {
        Self {
            lower_bound: accumulated,
            upper_bound: accumulated + probability - 1,
        }
    }

    pub fn lower_bound(&self) -> i32 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> i32 {
        self.upper_bound
    }

    /// Whether `draw` falls inside `[lower_bound, upper_bound]`
    pub fn contains(&self, draw: i32) -> bool {
        draw >= self.lower_bound && draw <= self.upper_bound
    }

    /// True when the range cannot contain any draw
    pub fn is_empty(&self) -> bool {
        self.upper_bound < self.lower_bound
    }
}

/// Registration progress of a selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    /// Shares sum to less than 100; `balance` fails
    Building,
    /// Shares sum to exactly 100; `balance` is allowed
    Ready,
}

struct Slot<T> {
    entry: WeightedWorkload<T>,
    allocation: Allocation,
    hits: AtomicU64,
}

/// Picks one registered workload at random according to its percentage share
/// and runs it
///
/// Insertion order is significant: it decides where each entry's range sits
/// and which entry wins when ranges overlap (the last one registered).
pub struct WeightedSelector<T> {
    slots: Vec<Slot<T>>,
    accumulated_percentage: i32,
}

impl<T> WeightedSelector<T> {
    /// Create an empty selector in the Building state
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            accumulated_percentage: 0,
        }
    }

    /// Register an entry with its explicit probability
    ///
    /// The entry receives the range starting at the current accumulated
    /// percentage. A failed call leaves the selector untouched.
    ///
    /// # Errors
    ///
    /// Returns `BalancerError::InvalidArgument` when the probability lies
    /// outside 0..=100 or when adding it would push the total above 100.
    pub fn add(&mut self, entry: WeightedWorkload<T>) -> BalancerResult<&mut Self> {
        self.check_share(&entry)?;
        self.register(entry);
        Ok(self)
    }

    /// Like [`add`](Self::add), for callers holding an entry that may be absent
    ///
    /// # Errors
    ///
    /// Returns `BalancerError::InvalidArgument` when `entry` is `None`, then
    /// the same errors as `add`.
    pub fn add_entry(
        &mut self,
        entry: Option<WeightedWorkload<T>>,
    ) -> BalancerResult<&mut Self> {
        let entry = Self::require_present(entry)?;
        self.add(entry)
    }

    /// Register an entry with whatever share is left to reach 100
    ///
    /// The probability the entry carries in goes through the same checks as
    /// in `add` before it is replaced by the remainder, so entries meant for
    /// `fill` are normally built with [`WeightedWorkload::unweighted`]. If the
    /// shares already total 100 the entry gets probability 0 and can never be
    /// selected.
    ///
    /// # Errors
    ///
    /// Returns `BalancerError::InvalidArgument` when the carried probability
    /// lies outside 0..=100 or would push the total above 100.
    pub fn fill(&mut self, mut entry: WeightedWorkload<T>) -> BalancerResult<&mut Self> {
        self.check_share(&entry)?;
        entry.set_probability(self.remaining_percentage());
        self.add(entry)
    }

    /// Like [`fill`](Self::fill), for callers holding an entry that may be absent
    ///
    /// # Errors
    ///
    /// Returns `BalancerError::InvalidArgument` when `entry` is `None`.
    pub fn fill_entry(
        &mut self,
        entry: Option<WeightedWorkload<T>>,
    ) -> BalancerResult<&mut Self> {
        let entry = Self::require_present(entry)?;
        self.fill(entry)
    }

    /// Pick an entry with the thread-local generator and run its action
    ///
    /// # Errors
    ///
    /// Returns `BalancerError::IllegalState` unless the shares sum to exactly
    /// 100, or if the draw matches no entry.
    pub fn balance(&self) -> BalancerResult<T> {
        self.balance_with(&mut rand::rng())
    }

    /// Pick an entry using `rng` and run its action
    ///
    /// The action's result is returned untouched.
    pub fn balance_with<R: Rng>(&self, rng: &mut R) -> BalancerResult<T> {
        self.ensure_ready()?;

        let draw = rng.random_range(0..MAX_PERCENTAGE);
        let Some(index) = self.select(draw) else {
            tracing::error!(
                draw = draw,
                entries = self.slots.len(),
                "Draw is not covered by any registered workload"
            );
            return Err(BalancerError::illegal_state("failed to find a target"));
        };

        let slot = &self.slots[index];
        slot.hits.fetch_add(1, Ordering::Relaxed);

        tracing::trace!(
            draw = draw,
            index = index,
            name = slot.entry.name().unwrap_or("<unnamed>"),
            probability = slot.entry.probability(),
            "Selected workload"
        );

        Ok(slot.entry.workload().run())
    }

    /// Index of the entry whose range contains `draw`
    ///
    /// Scans every entry in insertion order without stopping early, so when
    /// several ranges contain the draw the last one wins.
    pub fn select(&self, draw: i32) -> Option<usize> {
        let mut chosen = None;
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.allocation.contains(draw) {
                chosen = Some(index);
            }
        }
        chosen
    }

    /// Building until the shares sum to exactly 100, then Ready
    pub fn state(&self) -> SelectorState {
        if self.accumulated_percentage == MAX_PERCENTAGE {
            SelectorState::Ready
        } else {
            SelectorState::Building
        }
    }

    /// Whether `balance` is allowed
    pub fn is_ready(&self) -> bool {
        self.state() == SelectorState::Ready
    }

    /// Sum of the probabilities registered so far
    pub fn accumulated_percentage(&self) -> i32 {
        self.accumulated_percentage
    }

    /// Share still available before the selector is Ready
    pub fn remaining_percentage(&self) -> i32 {
        MAX_PERCENTAGE - self.accumulated_percentage
    }

    /// Number of registered entries, zero-probability ones included
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Range assigned to the entry at `index`
    pub fn allocation(&self, index: usize) -> Option<Allocation> {
        self.slots.get(index).map(|slot| slot.allocation)
    }

    /// Registered entries and their ranges, in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&WeightedWorkload<T>, Allocation)> + '_ {
        self.slots.iter().map(|slot| (&slot.entry, slot.allocation))
    }

    /// How many times each entry has been selected, in insertion order
    pub fn selection_counts(&self) -> Vec<u64> {
        self.slots
            .iter()
            .map(|slot| slot.hits.load(Ordering::Relaxed))
            .collect()
    }

    fn require_present(
        entry: Option<WeightedWorkload<T>>,
    ) -> BalancerResult<WeightedWorkload<T>> {
        entry.ok_or_else(|| {
            tracing::warn!("Rejected workload registration: entry is absent");
            BalancerError::invalid_argument("supplier can not be null")
        })
    }

    fn check_share(&self, entry: &WeightedWorkload<T>) -> BalancerResult<()> {
        let probability = entry.probability();

        if !(0..=MAX_PERCENTAGE).contains(&probability) {
            tracing::warn!(
                name = entry.name().unwrap_or("<unnamed>"),
                probability = probability,
                "Rejected workload registration: probability out of range"
            );
            return Err(BalancerError::invalid_argument(
                "probability must have a value between 0 and 100",
            ));
        }

        if self.accumulated_percentage + probability > MAX_PERCENTAGE {
            tracing::warn!(
                name = entry.name().unwrap_or("<unnamed>"),
                probability = probability,
                accumulated_percentage = self.accumulated_percentage,
                "Rejected workload registration: probability overflow"
            );
            return Err(BalancerError::invalid_argument("probability overflow"));
        }

        Ok(())
    }

    fn register(&mut self, entry: WeightedWorkload<T>) {
        let probability = entry.probability();
        let allocation = Allocation::starting_at(self.accumulated_percentage, probability);
        self.accumulated_percentage += probability;

        if allocation.is_empty() {
            tracing::warn!(
                name = entry.name().unwrap_or("<unnamed>"),
                index = self.slots.len(),
                "Registered workload with probability 0; it will never be selected"
            );
        } else {
            tracing::debug!(
                name = entry.name().unwrap_or("<unnamed>"),
                index = self.slots.len(),
                probability = probability,
                lower_bound = allocation.lower_bound,
                upper_bound = allocation.upper_bound,
                accumulated_percentage = self.accumulated_percentage,
                "Registered workload"
            );
        }

        self.slots.push(Slot {
            entry,
            allocation,
            hits: AtomicU64::new(0),
        });
    }

    fn ensure_ready(&self) -> BalancerResult<()> {
        if self.accumulated_percentage != MAX_PERCENTAGE {
            tracing::debug!(
                accumulated_percentage = self.accumulated_percentage,
                "Refusing to balance before shares reach 100%"
            );
            return Err(BalancerError::illegal_state(
                "workload probability is not 100%",
            ));
        }
        Ok(())
    }
}

impl<T> Default for WeightedSelector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for WeightedSelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedSelector")
            .field("entries", &self.slots.len())
            .field("accumulated_percentage", &self.accumulated_percentage)
            .finish()
    }
}

impl<T> LoadBalancer<T> for WeightedSelector<T> {
    fn balance(&self) -> BalancerResult<T> {
        WeightedSelector::balance(self)
    }
}

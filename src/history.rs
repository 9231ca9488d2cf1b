//! Usage-weighted memory of tools and colors
//!
//! Things that got painted with for a while are remembered and may come back
//! on a later change request; things abandoned quickly are forgotten.

use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Entries at or below this share of the top usage are forgotten
pub const PRUNE_RATIO: u32 = 10;

#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<(T, Duration)>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: Clone + PartialEq> History<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(T, Duration)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn usage(&self, value: &T) -> Option<Duration> {
        self.entries.iter().find(|(v, _)| v == value).map(|(_, d)| *d)
    }

    /// Add `duration` to `value`'s usage, remembering it if new
    pub fn record_usage(&mut self, value: &T, duration: Duration) {
        match self.entries.iter_mut().find(|(v, _)| v == value) {
            Some((_, usage)) => *usage += duration,
            None => self.entries.push((value.clone(), duration)),
        }
    }

    /// Forget entries used 10% or less as long as the favorite.
    /// Returns how many were dropped.
    pub fn prune(&mut self) -> usize {
        let Some(max) = self.entries.iter().map(|(_, d)| *d).max() else {
            return 0;
        };
        if max.is_zero() {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|(_, usage)| *usage * PRUNE_RATIO > max);
        before - self.entries.len()
    }

    /// Recall or invent the next value.
    ///
    /// After pruning, when more than `memory_threshold` entries survive, a
    /// coin flip may return the entry after `current` (wrapping, or the first
    /// entry when `current` is unknown). Otherwise `generate` makes a new
    /// value, which is remembered with zero usage.
    pub fn select<R, F>(&mut self, current: &T, generate: F, memory_threshold: usize, rng: &mut R) -> T
    where
        R: Rng + ?Sized,
        F: FnOnce(&mut R) -> T,
    {
        let pruned = self.prune();
        if pruned > 0 {
            debug!(pruned, remaining = self.entries.len(), "pruned history");
        }

        if self.entries.len() > memory_threshold && rng.gen_bool(0.5) {
            let next = self
                .entries
                .iter()
                .position(|(v, _)| v == current)
                .map_or(0, |i| (i + 1) % self.entries.len());
            debug!(index = next, "recalled from history");
            return self.entries[next].0.clone();
        }

        let fresh = generate(rng);
        self.entries.push((fresh.clone(), Duration::ZERO));
        fresh
    }
}

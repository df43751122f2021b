//! Advisory in-memory vote counters
//!
//! Counts only what this process relayed successfully. They are never
//! consulted when accepting or rejecting a vote and are not reconciled with
//! the upstream's totals.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::vote::VoteItem;

/// Category used for polls without a configured mapping.
pub const UNMAPPED_CATEGORY: &str = "other";

/// Read-only copy of the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallySnapshot {
    /// category -> `pollId::optionId` -> count
    pub counts: BTreeMap<String, BTreeMap<String, u64>>,
    /// Last increment or reset
    pub updated_at: Option<DateTime<Utc>>,
}

/// Best-effort counters keyed by category, poll and option.
#[derive(Debug, Default)]
pub struct LocalTally {
    state: Mutex<TallySnapshot>,
    categories: HashMap<String, String>,
}

impl LocalTally {
    /// Create a tally that files polls under the given categories
    pub fn new(categories: HashMap<String, String>) -> Self {
        Self {
            state: Mutex::default(),
            categories,
        }
    }

    /// Category a poll is counted under
    pub fn category_for(&self, poll_id: &str) -> &str {
        self.categories
            .get(poll_id)
            .map(String::as_str)
            .unwrap_or(UNMAPPED_CATEGORY)
    }

    /// Count one relayed vote under its poll's category
    pub fn record(&self, item: &VoteItem) {
        self.increment(self.category_for(&item.poll_id), &item.poll_id, &item.option_id);
    }

    /// Add one to a counter, creating it if absent.
    ///
    /// Never fails the caller: a poisoned lock turns this into a logged no-op.
    pub fn increment(&self, category: &str, poll_id: &str, option_id: &str) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Skipping tally update for {}/{}: {}", poll_id, option_id, e);
                return;
            }
        };

        let count = state
            .counts
            .entry(category.to_string())
            .or_default()
            .entry(format!("{}::{}", poll_id, option_id))
            .or_insert(0);
        *count = count.saturating_add(1);
        state.updated_at = Some(Utc::now());
    }

    /// Clear every counter; returns the reset time
    pub fn reset(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.state.lock() {
            Ok(mut state) => {
                state.counts.clear();
                state.updated_at = Some(now);
            }
            Err(e) => {
                // Replace the poisoned contents outright
                let mut state = e.into_inner();
                *state = TallySnapshot {
                    counts: BTreeMap::new(),
                    updated_at: Some(now),
                };
                self.state.clear_poison();
            }
        }
        log::info!("Local tally reset");
        now
    }

    /// Copy of the current counters
    pub fn snapshot(&self) -> TallySnapshot {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }

    /// Poison the lock by panicking while holding it
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|scope| {
            let holder = scope.spawn(|| {
                let _guard = self.state.lock();
                panic!("tally holder panicked");
            });
            assert!(holder.join().is_err());
        });
        assert!(self.state.is_poisoned());
    }
}

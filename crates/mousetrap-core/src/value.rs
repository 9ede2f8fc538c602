//! Tabular action-value storage

use std::collections::HashMap;

use crate::{RlError, StateKey};

/// Sparse `state -> [Q(state, a) for a in actions]` table.
///
/// Rows are created on first access with every action valued at zero and
/// are never removed. All lazily-inserting accessors take `&mut self`, so a
/// table can only be grown by one caller at a time.
#[derive(Debug, Clone)]
pub struct ValueTable<S> {
    /// Value rows, each exactly `action_count` long
    rows: HashMap<S, Vec<f64>>,
    /// Number of actions per row
    action_count: usize,
}

impl<S: StateKey> ValueTable<S> {
    /// Create an empty table for `action_count` actions
    pub fn new(action_count: usize) -> crate::Result<Self> {
        if action_count == 0 {
            return Err(RlError::config("action_count must be positive"));
        }
        Ok(Self {
            rows: HashMap::new(),
            action_count,
        })
    }

    /// Number of actions per state
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.action_count
    }

    /// Mutable access to the row for `state`, inserting zeros if unseen
    pub fn values_mut(&mut self, state: &S) -> &mut [f64] {
        let action_count = self.action_count;
        self.rows
            .entry(state.clone())
            .or_insert_with(|| vec![0.0; action_count])
    }

    /// Read-only peek that never inserts
    #[must_use]
    pub fn values(&self, state: &S) -> Option<&[f64]> {
        self.rows.get(state).map(Vec::as_slice)
    }

    /// Best value at `state` and the first action reaching it.
    ///
    /// Unseen states are inserted first, so a fresh state yields `(0.0, 0)`.
    pub fn best_value(&mut self, state: &S) -> (f64, usize) {
        first_max(self.values_mut(state))
    }

    /// Greedy action for an already-discovered state
    #[must_use]
    pub fn greedy_action(&self, state: &S) -> Option<usize> {
        self.values(state).map(|row| first_max(row).1)
    }

    /// Whether `state` has been discovered
    #[must_use]
    pub fn contains(&self, state: &S) -> bool {
        self.rows.contains_key(state)
    }

    /// Number of discovered states
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no state has been discovered yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over discovered states and their rows
    pub fn iter(&self) -> impl Iterator<Item = (&S, &[f64])> {
        self.rows.iter().map(|(state, row)| (state, row.as_slice()))
    }
}

/// Left-to-right scan that only moves on strictly greater values, so ties
/// resolve to the lowest index.
///
/// `values` must be non-empty.
#[must_use]
pub fn first_max(values: &[f64]) -> (f64, usize) {
    let mut best = values[0];
    let mut index = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > best {
            best = value;
            index = i;
        }
    }
    (best, index)
}

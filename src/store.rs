//! Append-only store of official draws.
//!
//! The store is the single source of truth for the whole engine: every
//! statistic is recomputed from it. Draws are keyed by contest number in a
//! `BTreeMap`, so range scans come out ascending for free. Writers must hold
//! the surrounding lock exclusively (see `api::AppState`).

use std::collections::BTreeMap;

use crate::types::{Draw, EngineError};

/// In-memory draw history, ordered by contest number.
#[derive(Debug, Default, Clone)]
pub struct DrawStore {
    draws: BTreeMap<u32, Draw>,
}

impl DrawStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a batch of draws (used when restoring a snapshot).
    /// Each draw is validated; duplicates are rejected.
    pub fn from_draws(draws: Vec<Draw>) -> Result<Self, EngineError> {
        let mut store = Self::new();
        for draw in draws {
            store.append(draw)?;
        }
        Ok(store)
    }

    /// Append a draw. Fails without mutating on an invalid draw or an
    /// already-present contest number.
    pub fn append(&mut self, draw: Draw) -> Result<(), EngineError> {
        draw.validate()?;
        if self.draws.contains_key(&draw.contest_number) {
            return Err(EngineError::DuplicateContest(draw.contest_number));
        }
        self.draws.insert(draw.contest_number, draw);
        Ok(())
    }

    /// Look up one contest.
    pub fn get(&self, contest_number: u32) -> Result<&Draw, EngineError> {
        self.draws
            .get(&contest_number)
            .ok_or(EngineError::NotFound(contest_number))
    }

    /// The draw with the highest contest number.
    pub fn latest(&self) -> Result<&Draw, EngineError> {
        self.draws
            .values()
            .next_back()
            .ok_or(EngineError::EmptyStore)
    }

    /// All draws, ascending by contest number. Restartable: the iterator
    /// borrows the map, so callers can re-iterate at will.
    pub fn all(&self) -> impl Iterator<Item = &Draw> {
        self.draws.values()
    }

    /// The `limit` most recent draws, newest first. `None` returns everything.
    pub fn recent(&self, limit: Option<usize>) -> Vec<&Draw> {
        let iter = self.draws.values().rev();
        match limit {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

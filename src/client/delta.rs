//! Delta detection
//!
//! Compares the message counts of a fresh fetch with the counts observed on
//! the previous successful tick. A conversation reports new activity only
//! when its count grew from a non-zero value, which keeps the first load
//! from flagging every conversation at once.

use std::collections::HashMap;

/// New messages observed in one conversation since the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub conversation_id: u64,
    pub count: u64,
}

/// Last observed message count per conversation
///
/// Lives only as long as the client session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalSnapshot {
    counts: HashMap<u64, u64>,
}

impl LocalSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previously observed count, 0 if never seen
    pub fn count(&self, conversation_id: u64) -> u64 {
        self.counts.get(&conversation_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Classify `fetched` against this snapshot, then replace it with `fetched`
    ///
    /// Deltas come back in the order of `fetched`. The snapshot is replaced
    /// whether or not anything fired.
    pub fn reconcile<I>(&mut self, fetched: I) -> Vec<Delta>
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let fetched: Vec<(u64, u64)> = fetched.into_iter().collect();
        let deltas = detect(self, &fetched);
        self.counts = fetched.into_iter().collect();
        deltas
    }
}

/// Pure classification step of [`LocalSnapshot::reconcile`]
pub fn detect(snapshot: &LocalSnapshot, fetched: &[(u64, u64)]) -> Vec<Delta> {
    fetched
        .iter()
        .filter_map(|&(conversation_id, curr)| {
            let prev = snapshot.count(conversation_id);
            (curr > prev && prev > 0).then(|| Delta {
                conversation_id,
                count: curr - prev,
            })
        })
        .collect()
}

/// Total number of new messages across a tick's deltas
pub fn total(deltas: &[Delta]) -> u64 {
    deltas.iter().map(|d| d.count).sum()
}

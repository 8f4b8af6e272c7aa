//! Liveness tracking, independent of the roster.
//!
//! Every message refreshes its sender's last-seen timestamp. The periodic
//! sweep asks which identities have gone silent for too long; eviction is
//! advisory — the protocol engine decides what to remove from the roster.
//! A peer can be present here and absent from the roster (a spectator or
//! a long-departed node).

use std::time::{Duration, Instant};

use crate::game::state::{PeerId, MAX_PLAYERS};

/// Identities beyond this are recycled least-recently-seen first, so the
/// table stays bounded across a long session with much peer churn.
const MAX_ENTRIES: usize = MAX_PLAYERS * 2;

#[derive(Debug, Clone)]
struct Entry {
    id: PeerId,
    last_seen: Instant,
}

#[derive(Debug, Default)]
pub struct MembershipTable {
    entries: Vec<Entry>,
}

impl MembershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` was heard from at `now`, inserting it if unseen.
    /// When the table is full the least-recently-seen entry makes room.
    pub fn touch(&mut self, id: PeerId, now: Instant) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.last_seen = now;
            return;
        }
        if self.entries.len() >= MAX_ENTRIES {
            if let Some(oldest) = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| e.last_seen)
                .map(|(i, _)| i)
            {
                self.entries.remove(oldest);
            }
        }
        self.entries.push(Entry { id, last_seen: now });
    }

    pub fn last_seen(&self, id: PeerId) -> Option<Instant> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.last_seen)
    }

    /// Identities whose silence has reached `timeout` (age >= timeout; the
    /// boundary counts as stale). Does not mutate anything — the engine
    /// applies the evictions to the roster.
    pub fn evict_stale(&self, now: Instant, timeout: Duration) -> Vec<PeerId> {
        self.entries
            .iter()
            .filter(|e| now.duration_since(e.last_seen) >= timeout)
            .map(|e| e.id)
            .collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

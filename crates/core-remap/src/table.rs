//! Read-only remap table for one mode group and recursion variant.

use core_config::{RemapTableKey, Remapping};
use core_state::Mode;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct RemapTable {
    key: RemapTableKey,
    by_before: HashMap<Vec<String>, Arc<Remapping>>,
    /// Shortest and longest `before` length, in keys.
    range: Option<(usize, usize)>,
}

/// A remap found at the tail of the key list; `start` is where its `before`
/// begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapMatch {
    pub remapping: Arc<Remapping>,
    pub start: usize,
}

fn is_count_key(key: &str) -> bool {
    key.len() == 1 && key.as_bytes()[0].is_ascii_digit()
}

impl RemapTable {
    pub fn new(key: RemapTableKey, remappings: Vec<Remapping>) -> Self {
        let mut by_before = HashMap::with_capacity(remappings.len());
        for r in remappings {
            if r.before.is_empty() {
                continue;
            }
            by_before.insert(r.before.clone(), Arc::new(r));
        }
        let range = by_before
            .keys()
            .map(Vec::len)
            .fold(None, |acc: Option<(usize, usize)>, len| match acc {
                None => Some((len, len)),
                Some((lo, hi)) => Some((lo.min(len), hi.max(len))),
            });
        Self {
            key,
            by_before,
            range,
        }
    }

    pub fn empty(key: RemapTableKey) -> Self {
        Self::new(key, Vec::new())
    }

    pub fn key(&self) -> RemapTableKey {
        self.key
    }

    pub fn len(&self) -> usize {
        self.by_before.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_before.is_empty()
    }

    pub fn length_range(&self) -> Option<(usize, usize)> {
        self.range
    }

    pub fn get(&self, before: &[String]) -> Option<&Arc<Remapping>> {
        self.by_before.get(before)
    }

    pub fn remappings(&self) -> impl Iterator<Item = &Arc<Remapping>> {
        self.by_before.values()
    }

    /// Longest remap whose `before` equals a trailing slice of `keys`.
    ///
    /// Outside Insert mode whatever precedes the slice must be a count
    /// (digits only); the first slice that violates this ends the search.
    pub fn find_matching(&self, keys: &[String], mode: Mode) -> Option<RemapMatch> {
        let (shortest, longest) = self.range?;
        let start = longest.min(keys.len());
        if start < shortest {
            return None;
        }
        for len in (shortest..=start).rev() {
            let split = keys.len() - len;
            let Some(remapping) = self.by_before.get(&keys[split..]) else {
                continue;
            };
            if mode != Mode::Insert {
                let preceding = &keys[..split];
                if !preceding.iter().all(|k| is_count_key(k)) {
                    trace!(target: "input.remap", table = self.key.config_key(), ?preceding, "preceding_keys_not_a_count");
                    return None;
                }
            }
            return Some(RemapMatch {
                remapping: remapping.clone(),
                start: split,
            });
        }
        None
    }

    /// True when some `before` strictly extends `pending`.
    pub fn is_potential(&self, pending: &[String]) -> bool {
        if pending.is_empty() {
            return false;
        }
        self.by_before
            .keys()
            .any(|before| before.len() > pending.len() && before.starts_with(pending))
    }
}

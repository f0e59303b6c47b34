//! Mode-indexed action registry.
//!
//! Resolution is a streaming parse over the pending keys with three outcomes:
//! a full match (first registered wins, no backtracking), "keep buffering"
//! when some template could still complete, or a definite failure.

use crate::action::{ActionDescriptor, ResolvedAction};
use crate::matcher::KeyMatcher;
use core_state::Mode;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeypressResolution {
    Matched(ResolvedAction),
    WaitingOnKeys,
    NoPossibleMatch,
}

impl KeypressResolution {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, KeypressResolution::WaitingOnKeys)
    }
}

#[derive(Debug, Default)]
pub struct ActionRegistry {
    by_mode: HashMap<Mode, Vec<Arc<ActionDescriptor>>>,
    /// Every registered template, keyed or not, in registration order.
    all: Vec<Arc<ActionDescriptor>>,
    matcher: KeyMatcher,
}

impl ActionRegistry {
    pub fn new(matcher: KeyMatcher) -> Self {
        Self {
            by_mode: HashMap::new(),
            all: Vec::new(),
            matcher,
        }
    }

    /// Registry populated from the built-in descriptor table.
    pub fn with_builtins(matcher: KeyMatcher) -> Self {
        let mut reg = Self::new(matcher);
        reg.register_all(crate::builtins::builtin_actions());
        reg
    }

    pub fn register(&mut self, descriptor: ActionDescriptor) {
        let descriptor = Arc::new(descriptor);
        self.all.push(descriptor.clone());
        if !descriptor.is_keyed() {
            trace!(target: "input.registry", name = descriptor.name, "programmatic_only");
            return;
        }
        for mode in descriptor.modes.modes() {
            self.by_mode.entry(mode).or_default().push(descriptor.clone());
        }
    }

    pub fn register_all<I: IntoIterator<Item = ActionDescriptor>>(&mut self, descriptors: I) {
        for d in descriptors {
            self.register(d);
        }
    }

    pub fn matcher(&self) -> &KeyMatcher {
        &self.matcher
    }

    pub fn set_leader(&mut self, leader: impl Into<String>) {
        self.matcher.set_leader(leader);
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ActionDescriptor>> {
        self.all.iter().find(|d| d.name == name).cloned()
    }

    pub fn actions_for(&self, mode: Mode) -> &[Arc<ActionDescriptor>] {
        self.by_mode.get(&mode).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// `pending_len` is the length of the whole pending command without its
    /// count prefix; `must_be_first_key` templates only apply when `typed` is
    /// all of it.
    fn first_key_ok(d: &ActionDescriptor, typed_len: usize, pending_len: usize) -> bool {
        !d.must_be_first_key || pending_len <= typed_len
    }

    pub fn does_action_apply(
        &self,
        d: &ActionDescriptor,
        mode: Mode,
        typed: &[String],
        pending_len: usize,
    ) -> bool {
        d.modes.admits(mode)
            && self.matcher.matches_any(&d.keys, typed)
            && Self::first_key_ok(d, typed.len(), pending_len)
    }

    pub fn could_action_apply(
        &self,
        d: &ActionDescriptor,
        mode: Mode,
        typed: &[String],
        pending_len: usize,
    ) -> bool {
        d.modes.admits(mode)
            && self.matcher.matches_prefix(&d.keys, typed)
            && Self::first_key_ok(d, typed.len(), pending_len)
    }

    pub fn resolve(&self, typed: &[String], mode: Mode, pending_len: usize) -> KeypressResolution {
        let mut potential = false;
        for d in self.actions_for(mode) {
            if self.does_action_apply(d, mode, typed, pending_len) {
                debug!(target: "input.registry", action = d.name, keys = ?typed, %mode, "action_match");
                return KeypressResolution::Matched(ResolvedAction::new(d.clone(), typed.to_vec()));
            }
            if !potential && self.could_action_apply(d, mode, typed, pending_len) {
                trace!(target: "input.registry", action = d.name, keys = ?typed, "potential_match");
                potential = true;
            }
        }
        if potential {
            KeypressResolution::WaitingOnKeys
        } else {
            debug!(target: "input.registry", keys = ?typed, %mode, "no_possible_match");
            KeypressResolution::NoPossibleMatch
        }
    }
}

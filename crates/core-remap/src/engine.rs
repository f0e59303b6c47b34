//! One remapping engine per remap table.
//!
//! `send_key` never executes anything: it reports what the dispatcher must do
//! next as a `RemapOutcome`, and the dispatcher replays keys through its own
//! queue. That keeps the engine free of re-entrant calls.

use crate::table::{RemapMatch, RemapTable};
use core_config::Remapping;
use core_events::{BUFFERED_KEYS_SENTINEL, TimeoutScheduler, TimeoutToken, TimerHandle};
use core_state::Mode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Per-call inputs supplied by the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct RemapContext<'a> {
    pub mode: Mode,
    /// Pending command without its count prefix or the timeout sentinel.
    pub pending_command: &'a [String],
    /// Ambiguity timeout; `None` disables timed buffering.
    pub timeout: Option<Duration>,
    /// A non-recursive remap is replaying its output.
    pub performing_nonrecursive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemapOutcome {
    /// Not handled; the keys belong to the action registry.
    Declined,
    /// Held back while a longer remap may still complete.
    Buffered,
    /// Ambiguity broke with no shorter remap: replay every key, in order,
    /// through the full pipeline.
    ReplayAll { keys: Vec<String> },
    /// Insert `leading_keys` literally, apply `remapping`, then replay
    /// `remaining_keys`. Leading keys are buffered text typed before the
    /// remap trigger and only occur in Insert mode.
    Apply {
        remapping: Arc<Remapping>,
        recursive: bool,
        leading_keys: Vec<String>,
        remaining_keys: Vec<String>,
    },
}

impl RemapOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, RemapOutcome::Declined)
    }
}

#[derive(Debug)]
pub struct RemappingEngine {
    id: usize,
    table: RemapTable,
    is_potential_remap: bool,
    has_ambiguous_remap: bool,
    allow_ambiguous_remap_on_first_key: bool,
    generation: u64,
    pending_timer: Option<TimerHandle>,
}

impl RemappingEngine {
    pub fn new(id: usize, table: RemapTable) -> Self {
        Self {
            id,
            table,
            is_potential_remap: false,
            has_ambiguous_remap: false,
            allow_ambiguous_remap_on_first_key: true,
            generation: 0,
            pending_timer: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn table(&self) -> &RemapTable {
        &self.table
    }

    pub fn recursive(&self) -> bool {
        self.table.key().recursive
    }

    /// Set by the last `send_key`: more keys could still complete a remap.
    pub fn is_potential_remap(&self) -> bool {
        self.is_potential_remap
    }

    pub fn has_ambiguous_remap(&self) -> bool {
        self.has_ambiguous_remap
    }

    pub fn allows_ambiguity_on_first_key(&self) -> bool {
        self.allow_ambiguous_remap_on_first_key
    }

    /// A timer token is live only for the generation that armed it and only
    /// while that ambiguity is still pending.
    pub fn accepts_timeout(&self, token: TimeoutToken) -> bool {
        token.engine == self.id
            && token.generation == self.generation
            && self.has_ambiguous_remap
            && self.pending_timer.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    fn arm_timer(&mut self, delay: Duration, scheduler: &mut dyn TimeoutScheduler) {
        if let Some(old) = self.pending_timer.take() {
            old.cancel();
        }
        self.generation += 1;
        let token = TimeoutToken {
            engine: self.id,
            generation: self.generation,
        };
        self.pending_timer = Some(scheduler.schedule(delay, token));
    }

    fn settle(&mut self) {
        self.has_ambiguous_remap = false;
        if let Some(timer) = self.pending_timer.take() {
            timer.cancel();
        }
    }

    /// The next key this engine sees resolves without buffering.
    pub fn defer_ambiguity_on_first_key(&mut self) {
        self.allow_ambiguous_remap_on_first_key = false;
    }

    pub fn admits(&self, mode: Mode) -> bool {
        self.table.key().modes().admits(mode)
    }

    /// Another engine consumed the keys this one was buffering.
    pub fn abandon_ambiguity(&mut self) {
        if self.has_ambiguous_remap {
            trace!(target: "input.remap", table = self.table.key().config_key(), "ambiguity_abandoned");
        }
        self.settle();
    }

    /// Drop any pending ambiguity without resolving it.
    pub fn reset(&mut self) {
        self.settle();
        self.is_potential_remap = false;
        self.allow_ambiguous_remap_on_first_key = true;
    }

    pub fn send_key(
        &mut self,
        keys: &[String],
        ctx: &RemapContext<'_>,
        scheduler: &mut dyn TimeoutScheduler,
    ) -> RemapOutcome {
        self.is_potential_remap = false;
        let table_name = self.table.key().config_key();
        if !self.admits(ctx.mode) {
            return RemapOutcome::Declined;
        }

        let mut allow_ambiguous = true;
        let keys = match keys.split_last() {
            Some((last, rest)) if last == BUFFERED_KEYS_SENTINEL => {
                allow_ambiguous = false;
                rest
            }
            _ => keys,
        };
        trace!(target: "input.remap", table = table_name, ?keys, mode = %ctx.mode, "find_matching_remap");

        let mut found = self.table.find_matching(keys, ctx.mode);
        let is_potential = self.table.is_potential(ctx.pending_command);
        // Without a timeout a complete remap fires at once; a bare prefix
        // still waits for the next key.
        if ctx.timeout.is_none() && found.is_some() {
            allow_ambiguous = false;
        }
        self.is_potential_remap =
            is_potential && allow_ambiguous && self.allow_ambiguous_remap_on_first_key;

        let mut remaining_keys = Vec::new();
        if found.is_none() && self.has_ambiguous_remap && (!is_potential || !allow_ambiguous) {
            let shortest = self.table.length_range().map_or(1, |(lo, _)| lo.max(1));
            for len in (shortest..keys.len()).rev() {
                if let Some(shorter) = self.table.find_matching(&keys[..len], ctx.mode) {
                    remaining_keys = keys[len..].to_vec();
                    found = Some(shorter);
                    self.is_potential_remap = false;
                    break;
                }
            }
            self.settle();
            if found.is_none() {
                debug!(target: "input.remap", table = table_name, ?keys, "ambiguity_broken_replay_all");
                self.allow_ambiguous_remap_on_first_key = false;
                return RemapOutcome::ReplayAll {
                    keys: keys.to_vec(),
                };
            }
            debug!(target: "input.remap", table = table_name, ?remaining_keys, "ambiguity_broken_shorter_match");
        }

        if is_potential && allow_ambiguous && self.allow_ambiguous_remap_on_first_key {
            self.has_ambiguous_remap = true;
            if let Some(delay) = ctx.timeout {
                self.arm_timer(delay, scheduler);
            }
            debug!(target: "input.remap", table = table_name, ?keys, "buffered_ambiguous");
            return RemapOutcome::Buffered;
        } else if !self.allow_ambiguous_remap_on_first_key && !ctx.pending_command.is_empty() {
            // Replayed count digits leave the pending command empty; the
            // deferral holds until the first key after them goes through.
            self.allow_ambiguous_remap_on_first_key = true;
        }

        match found {
            Some(RemapMatch { remapping, start }) => {
                self.settle();
                // Outside Insert mode the residue is the count prefix, which
                // the dispatcher already holds.
                let leading_keys = if ctx.mode == Mode::Insert {
                    keys[..start].to_vec()
                } else {
                    Vec::new()
                };
                debug!(
                    target: "input.remap",
                    table = table_name,
                    before = ?remapping.before,
                    after = ?remapping.after,
                    commands = remapping.commands.as_ref().map_or(0, Vec::len),
                    "remap_match"
                );
                RemapOutcome::Apply {
                    remapping,
                    recursive: self.recursive(),
                    leading_keys,
                    remaining_keys,
                }
            }
            None => RemapOutcome::Declined,
        }
    }
}

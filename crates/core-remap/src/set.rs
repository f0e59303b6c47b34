//! The full set of remapping engines, consulted in a fixed order.

use crate::engine::{RemapContext, RemapOutcome, RemappingEngine};
use crate::table::RemapTable;
use core_config::{Config, ConfigIssue, command_warnings};
use core_events::{TimeoutScheduler, TimeoutToken};
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct RemapperSet {
    engines: Vec<RemappingEngine>,
}

impl RemapperSet {
    /// Engines are numbered by position; timer tokens carry that number.
    pub fn new(tables: Vec<RemapTable>) -> Self {
        let engines = tables
            .into_iter()
            .enumerate()
            .map(|(id, table)| RemappingEngine::new(id, table))
            .collect();
        Self { engines }
    }

    /// Build all eight engines from configuration: recursive tables first.
    pub fn from_config(config: &Config) -> (Self, Vec<ConfigIssue>) {
        let (tables, issues) = config.remap_tables();
        let tables: Vec<RemapTable> = tables
            .into_iter()
            .map(|t| RemapTable::new(t.key, t.remappings))
            .collect();
        let set = Self::new(tables);
        debug!(target: "input.remap", engines = set.engines.len(), remaps = set.remap_count(), "remapper_set_built");
        (set, issues)
    }

    pub fn engines(&self) -> &[RemappingEngine] {
        &self.engines
    }

    pub fn remap_count(&self) -> usize {
        self.engines.iter().map(|e| e.table().len()).sum()
    }

    /// First engine that handles the keys wins; later engines never see them.
    /// Everything is declined while a non-recursive remap replays its output.
    pub fn send_key(
        &mut self,
        keys: &[String],
        ctx: &RemapContext<'_>,
        scheduler: &mut dyn TimeoutScheduler,
    ) -> RemapOutcome {
        if ctx.performing_nonrecursive {
            trace!(target: "input.remap", ?keys, "bypassed_performing_nonrecursive");
            return RemapOutcome::Declined;
        }
        let mut outcome = RemapOutcome::Declined;
        let mut handled_by = None;
        for engine in &mut self.engines {
            outcome = engine.send_key(keys, ctx, scheduler);
            if outcome.is_handled() {
                handled_by = Some(engine.id());
                break;
            }
        }
        if matches!(outcome, RemapOutcome::Declined | RemapOutcome::Buffered) {
            return outcome;
        }
        let defer_first = matches!(&outcome, RemapOutcome::ReplayAll { keys } if !keys.is_empty());
        // The pending keys are consumed; no other engine may still hold them.
        for engine in self.engines.iter_mut().filter(|e| e.admits(ctx.mode)) {
            if Some(engine.id()) != handled_by {
                engine.abandon_ambiguity();
            }
            // Every engine for this mode lets the replayed first key through,
            // otherwise two tables sharing a prefix would hand it back and
            // forth forever.
            if defer_first {
                engine.defer_ambiguity_on_first_key();
            }
        }
        outcome
    }

    pub fn is_potential_remap(&self) -> bool {
        self.engines.iter().any(RemappingEngine::is_potential_remap)
    }

    pub fn has_pending_ambiguity(&self) -> bool {
        self.engines.iter().any(RemappingEngine::has_ambiguous_remap)
    }

    pub fn accepts_timeout(&self, token: TimeoutToken) -> bool {
        self.engines.iter().any(|e| e.accepts_timeout(token))
    }

    /// Cancel timers and forget pending ambiguity in every engine.
    pub fn reset(&mut self) {
        for engine in &mut self.engines {
            engine.reset();
        }
    }

    /// Host-command warnings for every table (`:` commands always pass).
    pub fn command_warnings<F>(&self, is_known: F) -> Vec<ConfigIssue>
    where
        F: Fn(&str) -> bool,
    {
        let mut issues = Vec::new();
        for engine in &self.engines {
            let remaps: Vec<_> = engine
                .table()
                .remappings()
                .map(|r| r.as_ref().clone())
                .collect();
            issues.extend(command_warnings(engine.table().key(), &remaps, &is_known));
        }
        issues
    }
}

//! KeyDispatcher: the ordered pipeline from raw key to host execution.
//!
//! raw key → remappers → count / register / operator composition → action
//! registry → host → mode transition.
//!
//! Decomposed into:
//! * `remap`   - acting on `RemapOutcome`s (replay, apply, commands)
//! * `compose` - counts, registers and operator composition around a match
//!
//! Replays never recurse: remap output and replayed keys are pushed onto the
//! front of a work queue that `drain` runs to completion before returning, so
//! one call to `handle_key` resolves everything the key triggered.

use crate::error::DispatchError;
use crate::host::EditorHost;
use crate::recorded::RecordedState;
use core_config::{Config, ConfigIssue, InputConfig, Remapping};
use core_events::{BUFFERED_KEYS_SENTINEL, TimeoutScheduler, TimeoutToken};
use core_keymap::{ActionDescriptor, ActionRegistry, KeyMatcher, KeypressResolution};
use core_remap::{RemapContext, RemapOutcome, RemapperSet};
use core_state::{Mode, ModeStateMachine};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace};

mod compose;
mod remap;

#[derive(Debug, Clone)]
enum Work {
    /// A key offered to the whole pipeline. `depth` counts nested remap
    /// expansions that produced it.
    Key { key: String, depth: u32 },
    /// A key that skips the remappers (text typed ahead of a remap trigger).
    Literal(String),
    Commands(Arc<Remapping>),
    EndRemap,
}

pub struct KeyDispatcher {
    mode: ModeStateMachine,
    registry: ActionRegistry,
    remappers: RemapperSet,
    scheduler: Box<dyn TimeoutScheduler>,
    state: RecordedState,
    input: InputConfig,
    performing_nonrecursive: bool,
    queue: VecDeque<Work>,
    deferred_reload: Option<Config>,
}

impl KeyDispatcher {
    /// Registry holds the built-ins followed by `extra_actions` (plugins).
    /// Remap table problems are reported through tracing and returned.
    pub fn new(
        config: &Config,
        extra_actions: Vec<ActionDescriptor>,
        scheduler: Box<dyn TimeoutScheduler>,
    ) -> (Self, Vec<ConfigIssue>) {
        let input = config.input().clone();
        let mut registry = ActionRegistry::with_builtins(KeyMatcher::new(input.leader_key()));
        registry.register_all(extra_actions);
        let (remappers, issues) = RemapperSet::from_config(config);
        info!(
            target: "input.dispatch",
            actions = registry.len(),
            remaps = remappers.remap_count(),
            timeout = input.timeout,
            timeoutlen = input.timeoutlen,
            "dispatcher_ready"
        );
        let dispatcher = Self {
            mode: ModeStateMachine::default(),
            registry,
            remappers,
            scheduler,
            state: RecordedState::default(),
            input,
            performing_nonrecursive: false,
            queue: VecDeque::new(),
            deferred_reload: None,
        };
        (dispatcher, issues)
    }

    pub fn mode(&self) -> Mode {
        self.mode.current()
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn remappers(&self) -> &RemapperSet {
        &self.remappers
    }

    pub fn recorded(&self) -> &RecordedState {
        &self.state
    }

    pub fn is_performing_remap(&self) -> bool {
        self.performing_nonrecursive
    }

    pub fn has_deferred_reload(&self) -> bool {
        self.deferred_reload.is_some()
    }

    fn timeout(&self) -> Option<Duration> {
        self.input
            .timeout
            .then(|| Duration::from_millis(u64::from(self.input.timeoutlen)))
    }

    /// Process one key and everything it triggers.
    pub fn handle_key(&mut self, key: &str, host: &mut dyn EditorHost) -> Result<(), DispatchError> {
        self.queue.push_back(Work::Key {
            key: key.to_string(),
            depth: 0,
        });
        self.drain(host)
    }

    /// Process a batch in order, exactly as if typed one at a time.
    pub fn handle_keys<S: AsRef<str>>(
        &mut self,
        keys: &[S],
        host: &mut dyn EditorHost,
    ) -> Result<(), DispatchError> {
        for key in keys {
            self.handle_key(key.as_ref(), host)?;
        }
        Ok(())
    }

    /// An ambiguity timer fired. Stale tokens are dropped.
    pub fn on_timeout(
        &mut self,
        token: TimeoutToken,
        host: &mut dyn EditorHost,
    ) -> Result<(), DispatchError> {
        if !self.remappers.accepts_timeout(token) {
            trace!(target: "input.timer", engine = token.engine, generation = token.generation, "stale_timeout_ignored");
            return Ok(());
        }
        debug!(target: "input.timer", engine = token.engine, generation = token.generation, "timeout_fired");
        self.handle_key(BUFFERED_KEYS_SENTINEL, host)
    }

    /// Resolve a pending ambiguity as if its timer had fired. Used when input
    /// ends while keys are still buffered.
    pub fn flush_pending(&mut self, host: &mut dyn EditorHost) -> Result<(), DispatchError> {
        if !self.remappers.has_pending_ambiguity() {
            return Ok(());
        }
        debug!(target: "input.timer", "flush_pending_ambiguity");
        self.handle_key(BUFFERED_KEYS_SENTINEL, host)
    }

    /// Swap in remap tables built from `config`. Deferred while an ambiguity
    /// is pending; applied once it resolves or on the next mode change.
    pub fn reload(&mut self, config: Config, host: &mut dyn EditorHost) -> Vec<ConfigIssue> {
        if self.remappers.has_pending_ambiguity() {
            debug!(target: "config", "reload_deferred_pending_ambiguity");
            self.deferred_reload = Some(config);
            return Vec::new();
        }
        self.apply_config(config, host)
    }

    fn apply_config(&mut self, config: Config, host: &mut dyn EditorHost) -> Vec<ConfigIssue> {
        let (remappers, mut issues) = RemapperSet::from_config(&config);
        self.remappers.reset();
        self.remappers = remappers;
        self.input = config.input().clone();
        self.registry.set_leader(self.input.leader_key());
        issues.extend(self.validate_commands(host));
        info!(target: "config", remaps = self.remappers.remap_count(), "remap_tables_reloaded");
        issues
    }

    /// Warn about remap commands the host does not know.
    pub fn validate_commands(&self, host: &dyn EditorHost) -> Vec<ConfigIssue> {
        let issues = self
            .remappers
            .command_warnings(|cmd| host.is_known_command(cmd));
        for issue in &issues {
            issue.report();
        }
        issues
    }

    fn drain(&mut self, host: &mut dyn EditorHost) -> Result<(), DispatchError> {
        while let Some(work) = self.queue.pop_front() {
            match work {
                Work::Key { key, depth } => {
                    if let Err(e) = self.process_key(key, depth, host) {
                        error!(target: "input.dispatch", error = %e, "remap_expansion_aborted");
                        self.abort_expansion();
                        return Err(e);
                    }
                }
                Work::Literal(key) => {
                    self.state.command_list.push(key.clone());
                    self.resolve_action_key(key, host);
                }
                Work::Commands(remapping) => self.run_commands(&remapping, host),
                Work::EndRemap => self.performing_nonrecursive = false,
            }
        }
        if self.deferred_reload.is_some() && !self.remappers.has_pending_ambiguity() {
            self.apply_deferred_reload(host);
        }
        Ok(())
    }

    fn abort_expansion(&mut self) {
        self.queue.clear();
        self.performing_nonrecursive = false;
        self.state.reset();
        self.remappers.reset();
    }

    fn apply_deferred_reload(&mut self, host: &mut dyn EditorHost) {
        if let Some(config) = self.deferred_reload.take() {
            debug!(target: "config", "reload_applied_after_deferral");
            self.apply_config(config, host);
        }
    }

    fn process_key(
        &mut self,
        key: String,
        depth: u32,
        host: &mut dyn EditorHost,
    ) -> Result<(), DispatchError> {
        if depth > self.input.max_map_depth {
            return Err(DispatchError::RecursiveMapping {
                depth,
                limit: self.input.max_map_depth,
            });
        }
        trace!(target: "input.dispatch", %key, depth, mode = %self.mode.current(), "key");
        self.state.command_list.push(key.clone());

        let mode = self.mode.current();
        let pending = self.state.command_without_count_prefix(mode);
        let keys = self.state.command_list.clone();
        let ctx = RemapContext {
            mode,
            pending_command: &pending,
            timeout: self.timeout(),
            performing_nonrecursive: self.performing_nonrecursive,
        };
        match self.remappers.send_key(&keys, &ctx, self.scheduler.as_mut()) {
            RemapOutcome::Declined => {}
            RemapOutcome::Buffered => return Ok(()),
            RemapOutcome::ReplayAll { keys } => {
                self.replay_all(keys, depth);
                return Ok(());
            }
            RemapOutcome::Apply {
                remapping,
                recursive,
                leading_keys,
                remaining_keys,
            } => {
                self.apply_remap(remapping, recursive, leading_keys, remaining_keys, depth);
                return Ok(());
            }
        }

        if key == BUFFERED_KEYS_SENTINEL {
            self.state.command_list.pop();
            return Ok(());
        }
        self.resolve_action_key(key, host);
        Ok(())
    }

    fn transition(&mut self, to: Mode, host: &mut dyn EditorHost) {
        let t = self.mode.transition_to(to);
        if t.changed() {
            self.state.reset();
            self.apply_deferred_reload(host);
        }
    }

    /// Count digits, then registry resolution for the current action keys.
    fn resolve_action_key(&mut self, key: String, host: &mut dyn EditorHost) {
        let mode = self.mode.current();
        if !mode.is_text_entry()
            && self.state.action_keys.is_empty()
            && self.state.accumulate_count(&key)
        {
            trace!(target: "input.dispatch", count = ?self.state.count, post_op_count = ?self.state.post_op_count, "count_digit");
            return;
        }
        self.state.action_keys.push(key);
        if self.operator_repeated() {
            self.execute_linewise(host);
            return;
        }
        let pending_len = self.state.command_without_count_prefix(mode).len();
        match self
            .registry
            .resolve(&self.state.action_keys, mode, pending_len)
        {
            KeypressResolution::WaitingOnKeys => {
                trace!(target: "input.dispatch", keys = ?self.state.action_keys, "waiting_on_keys");
            }
            KeypressResolution::NoPossibleMatch => {
                debug!(target: "input.dispatch", keys = ?self.state.action_keys, %mode, "no_possible_match");
                self.state.reset();
            }
            KeypressResolution::Matched(action) => self.on_matched(action, host),
        }
    }
}

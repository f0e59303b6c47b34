//! Acting on remap outcomes.

use super::{KeyDispatcher, Work};
use crate::host::EditorHost;
use core_config::Remapping;
use std::sync::Arc;
use tracing::{debug, warn};

impl KeyDispatcher {
    fn push_front_all(&mut self, items: Vec<Work>) {
        for item in items.into_iter().rev() {
            self.queue.push_front(item);
        }
    }

    /// Broken ambiguity without a shorter remap: start over and feed every
    /// buffered key through the pipeline again.
    pub(super) fn replay_all(&mut self, keys: Vec<String>, depth: u32) {
        debug!(target: "input.dispatch", ?keys, "replay_buffered_keys");
        self.state.reset();
        let items = keys
            .into_iter()
            .map(|key| Work::Key { key, depth })
            .collect();
        self.push_front_all(items);
    }

    /// Queue a remap's effect: leading literals, `after` once per count,
    /// commands, the end-of-remap marker, then the leftover keys.
    pub(super) fn apply_remap(
        &mut self,
        remapping: Arc<Remapping>,
        recursive: bool,
        leading_keys: Vec<String>,
        remaining_keys: Vec<String>,
        depth: u32,
    ) {
        let count = self.state.count.unwrap_or(1).max(1);
        self.state.reset();
        if !recursive {
            self.performing_nonrecursive = true;
        }
        debug!(
            target: "input.dispatch",
            before = ?remapping.before,
            recursive,
            count,
            ?leading_keys,
            ?remaining_keys,
            "apply_remap"
        );

        let mut items: Vec<Work> = leading_keys.into_iter().map(Work::Literal).collect();
        if let Some(after) = &remapping.after {
            for _ in 0..count {
                items.extend(after.iter().map(|key| Work::Key {
                    key: key.clone(),
                    depth: depth + 1,
                }));
            }
        }
        if remapping.commands.is_some() {
            items.push(Work::Commands(remapping.clone()));
        }
        items.push(Work::EndRemap);
        items.extend(
            remaining_keys
                .into_iter()
                .map(|key| Work::Key { key, depth }),
        );
        self.push_front_all(items);
    }

    /// Run a remap's commands in order. The first failure stops the rest;
    /// cleanup and leftover keys still follow in the queue.
    pub(super) fn run_commands(&mut self, remapping: &Remapping, host: &mut dyn EditorHost) {
        for cmd in remapping.commands.iter().flatten() {
            let result = match cmd.command_line() {
                Some(input) => host.run_command_line(input),
                None => host.execute_command(&cmd.command, &cmd.args),
            };
            if let Err(e) = result {
                warn!(target: "input.dispatch", command = %cmd.command, error = %e, "remap_command_failed");
                return;
            }
            debug!(target: "input.dispatch", command = %cmd.command, args = ?cmd.args, "remap_command");
        }
    }
}

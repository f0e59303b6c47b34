//! Counts, registers and operator composition around a matched action.

use super::KeyDispatcher;
use crate::host::{EditorHost, Invocation, InvocationKind};
use core_keymap::ResolvedAction;
use core_keymap::builtins::REGISTER_PREFIX;
use core_state::Mode;
use tracing::{debug, warn};

impl KeyDispatcher {
    /// `dd`, `grr`, `grgr`: the action keys repeat the pending operator in
    /// full or repeat its last key.
    pub(super) fn operator_repeated(&self) -> bool {
        let Some(op) = &self.state.operator else {
            return false;
        };
        let keys = &self.state.action_keys;
        if *keys == op.keys_pressed {
            return true;
        }
        op.keys_pressed.len() > 1 && keys.len() == 1 && op.keys_pressed.last() == keys.first()
    }

    pub(super) fn execute_linewise(&mut self, host: &mut dyn EditorHost) {
        let Some(op) = self.state.operator.take() else {
            return;
        };
        let invocation = Invocation {
            action: op,
            kind: InvocationKind::Linewise,
            count: self.state.total_count(),
            register: self.state.register.take(),
            mode: self.mode.current(),
        };
        self.execute(invocation, host);
    }

    pub(super) fn on_matched(&mut self, action: ResolvedAction, host: &mut dyn EditorHost) {
        let mode = self.mode.current();
        let template = action.template.clone();

        if template.name == REGISTER_PREFIX {
            self.state.register = action.argument().map(str::to_string);
            self.state.action_keys.clear();
            debug!(target: "input.dispatch", register = ?self.state.register, "register_selected");
            return;
        }

        if template.is_operator {
            if mode.is_visual() {
                let invocation = Invocation {
                    action,
                    kind: InvocationKind::Selection,
                    count: self.state.total_count(),
                    register: self.state.register.take(),
                    mode,
                };
                self.execute(invocation, host);
                return;
            }
            if self.state.operator.is_some() {
                // A different operator while one is pending cancels both.
                debug!(target: "input.dispatch", operator = template.name, "operator_conflict_cancel");
                self.state.reset();
                return;
            }
            debug!(target: "input.dispatch", operator = template.name, "operator_pending");
            self.state.operator = Some(action);
            self.state.action_keys.clear();
            return;
        }

        let invocation = match self.state.operator.take() {
            Some(op) if template.is_motion => Invocation {
                action: op,
                kind: InvocationKind::OperatorMotion { motion: action },
                count: self.state.total_count(),
                register: self.state.register.take(),
                mode,
            },
            Some(op) => {
                debug!(target: "input.dispatch", operator = op.name(), action = template.name, "operator_cancelled_by_non_motion");
                self.state.reset();
                return;
            }
            None => Invocation {
                action,
                kind: InvocationKind::Action,
                count: self.state.count,
                register: self.state.register.take(),
                mode,
            },
        };
        self.execute(invocation, host);
    }

    /// Hand the invocation to the host, reset the recorded state and apply
    /// the resulting mode: the host's override, else the action's own target,
    /// else Normal after a Visual-selection operator.
    fn execute(&mut self, invocation: Invocation, host: &mut dyn EditorHost) {
        debug!(
            target: "input.dispatch",
            action = invocation.name(),
            kind = ?invocation.kind,
            count = ?invocation.count,
            register = ?invocation.register,
            "execute_action"
        );
        let requested = match host.execute_action(&invocation) {
            Ok(mode) => mode,
            Err(e) => {
                warn!(target: "input.dispatch", action = invocation.name(), error = %e, "action_failed");
                self.state.reset();
                return;
            }
        };
        self.state.reset();
        let fallback = (invocation.kind == InvocationKind::Selection).then_some(Mode::Normal);
        if let Some(to) = requested
            .or(invocation.action.template.enters)
            .or(fallback)
        {
            self.transition(to, host);
        }
    }
}

//! Host collaborator seam: everything that touches the buffer lives behind it.

use core_keymap::ResolvedAction;
use core_state::Mode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationKind {
    /// A command or a bare motion.
    Action,
    /// `action` is the operator, applied over `motion`.
    OperatorMotion { motion: ResolvedAction },
    /// Operator repeated (`dd`, `grr`): acts on whole lines.
    Linewise,
    /// Operator applied to the Visual selection.
    Selection,
}

/// A resolved action plus everything composed around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: ResolvedAction,
    pub kind: InvocationKind,
    /// `None` when no count was typed.
    pub count: Option<u32>,
    pub register: Option<String>,
    /// Mode the keys were resolved in.
    pub mode: Mode,
}

impl Invocation {
    pub fn name(&self) -> &'static str {
        self.action.name()
    }

    pub fn motion(&self) -> Option<&ResolvedAction> {
        match &self.kind {
            InvocationKind::OperatorMotion { motion } => Some(motion),
            _ => None,
        }
    }
}

/// Buffer, command and command-line execution provided by the embedding
/// editor. Errors are logged by the dispatcher and never stop key processing.
pub trait EditorHost {
    /// Run a resolved action. `Ok(Some(mode))` overrides the mode the action
    /// would otherwise enter.
    fn execute_action(&mut self, invocation: &Invocation) -> anyhow::Result<Option<Mode>>;

    /// Run a host-level command from a remap's `commands`.
    fn execute_command(&mut self, command: &str, args: &[String]) -> anyhow::Result<()>;

    /// Run Vim command-line input (`:` already stripped).
    fn run_command_line(&mut self, input: &str) -> anyhow::Result<()>;

    /// Used to warn about remap commands the host cannot run.
    fn is_known_command(&self, _command: &str) -> bool {
        true
    }
}

//! Editing modes and the mode state machine.
//!
//! The machine is deliberately passive: transitions are requested by whoever
//! executes a resolved action (or by the dispatcher when a remap changes mode)
//! and are never rejected here. Validity of a transition belongs to the action
//! that asked for it.
//!
//! Besides the current-mode value the crate exposes `ModeSet`, the guard used by
//! both the action registry and the remapping engines to filter candidates by
//! mode membership.

use std::fmt;
use tracing::debug;

/// Fixed enumeration of editing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Normal command/navigation mode.
    #[default]
    Normal,
    /// Insert text mode.
    Insert,
    /// Character-wise visual selection.
    Visual,
    /// Line-wise visual selection.
    VisualLine,
    /// Block-wise visual selection.
    VisualBlock,
    /// Overtype mode entered with `R`.
    Replace,
    /// A `:` command line is being typed.
    CommandlineInProgress,
    /// A `/` or `?` search is being typed.
    SearchInProgress,
}

impl Mode {
    pub const ALL: [Mode; 8] = [
        Mode::Normal,
        Mode::Insert,
        Mode::Visual,
        Mode::VisualLine,
        Mode::VisualBlock,
        Mode::Replace,
        Mode::CommandlineInProgress,
        Mode::SearchInProgress,
    ];

    /// Single-member set for this mode.
    pub const fn as_set(self) -> ModeSet {
        match self {
            Mode::Normal => ModeSet::NORMAL,
            Mode::Insert => ModeSet::INSERT,
            Mode::Visual => ModeSet::VISUAL,
            Mode::VisualLine => ModeSet::VISUAL_LINE,
            Mode::VisualBlock => ModeSet::VISUAL_BLOCK,
            Mode::Replace => ModeSet::REPLACE,
            Mode::CommandlineInProgress => ModeSet::COMMANDLINE,
            Mode::SearchInProgress => ModeSet::SEARCH,
        }
    }

    pub fn is_visual(self) -> bool {
        ModeSet::ANY_VISUAL.contains(self.as_set())
    }

    /// Modes where typed keys are text rather than commands. Count prefixes are
    /// not accumulated in these modes.
    pub fn is_text_entry(self) -> bool {
        matches!(
            self,
            Mode::Insert | Mode::Replace | Mode::CommandlineInProgress | Mode::SearchInProgress
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Insert => "insert",
            Mode::Visual => "visual",
            Mode::VisualLine => "visual-line",
            Mode::VisualBlock => "visual-block",
            Mode::Replace => "replace",
            Mode::CommandlineInProgress => "commandline",
            Mode::SearchInProgress => "search",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// Set of modes an action or remap table is legal in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ModeSet: u16 {
        const NORMAL = 1;
        const INSERT = 1 << 1;
        const VISUAL = 1 << 2;
        const VISUAL_LINE = 1 << 3;
        const VISUAL_BLOCK = 1 << 4;
        const REPLACE = 1 << 5;
        const COMMANDLINE = 1 << 6;
        const SEARCH = 1 << 7;

        const ANY_VISUAL = Self::VISUAL.bits() | Self::VISUAL_LINE.bits() | Self::VISUAL_BLOCK.bits();
        const NORMAL_AND_VISUAL = Self::NORMAL.bits() | Self::ANY_VISUAL.bits();
        const INSERT_LIKE = Self::INSERT.bits() | Self::REPLACE.bits();
        const COMMAND_LINE_LIKE = Self::COMMANDLINE.bits() | Self::SEARCH.bits();
    }
}

impl ModeSet {
    /// Mode-membership guard shared by the registry and the remapping engines.
    pub fn admits(self, mode: Mode) -> bool {
        self.contains(mode.as_set())
    }

    /// Members in declaration order.
    pub fn modes(self) -> impl Iterator<Item = Mode> {
        Mode::ALL.into_iter().filter(move |m| self.admits(*m))
    }
}

impl From<Mode> for ModeSet {
    fn from(mode: Mode) -> Self {
        mode.as_set()
    }
}

/// Record of a completed transition, returned so the owner can run its
/// refresh hook (remap table swap, pending-state cleanup).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: Mode,
    pub to: Mode,
}

impl ModeTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Holds the single current mode.
#[derive(Debug, Clone)]
pub struct ModeStateMachine {
    current: Mode,
    transitions: u64,
}

impl Default for ModeStateMachine {
    fn default() -> Self {
        Self::new(Mode::Normal)
    }
}

impl ModeStateMachine {
    pub fn new(initial: Mode) -> Self {
        Self {
            current: initial,
            transitions: 0,
        }
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    /// Number of transitions that actually changed the mode.
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }

    /// Switch to `to`. Never rejected; a transition to the current mode is a
    /// no-op reported through `ModeTransition::changed`.
    pub fn transition_to(&mut self, to: Mode) -> ModeTransition {
        let from = self.current;
        self.current = to;
        if from != to {
            self.transitions += 1;
            debug!(target: "input.mode", %from, %to, "mode_transition");
        }
        ModeTransition { from, to }
    }

    pub fn allows(&self, modes: ModeSet) -> bool {
        modes.admits(self.current)
    }
}

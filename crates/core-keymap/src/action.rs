//! Action templates and resolved instances.

use crate::token::{KeyPattern, pattern};
use core_state::{Mode, ModeSet};
use std::sync::Arc;

/// Immutable template for one built-in (or plugin) command. Registered once;
/// the behaviour behind it is opaque to the resolution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub name: &'static str,
    pub modes: ModeSet,
    /// Alternative key sequences. Empty means programmatic-only.
    pub keys: Vec<KeyPattern>,
    /// Only valid when these keys are the whole pending command (e.g. `"a`).
    pub must_be_first_key: bool,
    pub is_motion: bool,
    pub is_operator: bool,
    pub can_repeat_with_dot: bool,
    /// Mode requested after a successful execution, if any.
    pub enters: Option<Mode>,
}

impl ActionDescriptor {
    pub fn new(name: &'static str, modes: ModeSet) -> Self {
        Self {
            name,
            modes,
            keys: Vec::new(),
            must_be_first_key: false,
            is_motion: false,
            is_operator: false,
            can_repeat_with_dot: false,
            enters: None,
        }
    }

    /// Add one alternative key sequence.
    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keys.push(pattern(keys));
        self
    }

    pub fn motion(mut self) -> Self {
        self.is_motion = true;
        self
    }

    pub fn operator(mut self) -> Self {
        self.is_operator = true;
        self.can_repeat_with_dot = true;
        self
    }

    pub fn first_key(mut self) -> Self {
        self.must_be_first_key = true;
        self
    }

    pub fn dot(mut self) -> Self {
        self.can_repeat_with_dot = true;
        self
    }

    pub fn enters(mut self, mode: Mode) -> Self {
        self.enters = Some(mode);
        self
    }

    pub fn is_keyed(&self) -> bool {
        !self.keys.is_empty()
    }
}

/// A template stamped with the literal keys that triggered it. Created fresh
/// for every match and dropped after execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAction {
    pub template: Arc<ActionDescriptor>,
    pub keys_pressed: Vec<String>,
}

impl ResolvedAction {
    pub fn new(template: Arc<ActionDescriptor>, keys_pressed: Vec<String>) -> Self {
        Self {
            template,
            keys_pressed,
        }
    }

    pub fn name(&self) -> &'static str {
        self.template.name
    }

    /// The literal key matched by a trailing wildcard (`f<character>` → `x`).
    pub fn argument(&self) -> Option<&str> {
        if self.keys_pressed.len() < 2 {
            return None;
        }
        self.keys_pressed.last().map(String::as_str)
    }
}

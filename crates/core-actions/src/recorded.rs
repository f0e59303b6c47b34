//! Recorded state for the command being typed.
//!
//! State Machine (minimal):
//! * Idle: optional `count` accumulating prefix digits.
//! * OperatorPending(op): operator captured; may accumulate a post-operator
//!   count via digits 1-9 (a leading 0 is the `line_start` motion, not a
//!   count).
//! * Counts multiply when the operator completes (`2d3w` => 6) and are
//!   clamped to 999_999.

use core_events::BUFFERED_KEYS_SENTINEL;
use core_keymap::ResolvedAction;
use core_state::Mode;

pub const MAX_COUNT: u32 = 999_999;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordedState {
    /// Every key since the last reset, count digits and sentinel included.
    pub command_list: Vec<String>,
    /// Keys offered to the action registry for the current action.
    pub action_keys: Vec<String>,
    /// Count prefix prior to an operator or motion (e.g. `12d` or `12w`).
    pub count: Option<u32>,
    /// Count following an operator but before the motion (e.g. `d3w`).
    pub post_op_count: Option<u32>,
    /// Pending operator awaiting a motion.
    pub operator: Option<ResolvedAction>,
    /// Pending explicit register (after `"`).
    pub register: Option<String>,
}

fn digit(key: &str) -> Option<u32> {
    let mut chars = key.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    c.to_digit(10)
}

impl RecordedState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Command list minus the timeout sentinel and, outside text entry, the
    /// leading count.
    pub fn command_without_count_prefix(&self, mode: Mode) -> Vec<String> {
        let keys: Vec<String> = self
            .command_list
            .iter()
            .filter(|k| *k != BUFFERED_KEYS_SENTINEL)
            .cloned()
            .collect();
        if mode.is_text_entry() {
            return keys;
        }
        let count_len = match keys.first().and_then(|k| digit(k)) {
            Some(d) if d != 0 => {
                1 + keys[1..]
                    .iter()
                    .take_while(|k| digit(k).is_some())
                    .count()
            }
            _ => 0,
        };
        keys[count_len..].to_vec()
    }

    /// Feed `key` as a count digit. Returns false when it is not part of a
    /// count (a non-digit, or a `0` with no count started).
    pub fn accumulate_count(&mut self, key: &str) -> bool {
        let Some(d) = digit(key) else {
            return false;
        };
        let slot = if self.operator.is_some() {
            &mut self.post_op_count
        } else {
            &mut self.count
        };
        if d == 0 && slot.is_none() {
            return false;
        }
        let next = slot
            .unwrap_or(0)
            .saturating_mul(10)
            .saturating_add(d)
            .min(MAX_COUNT);
        *slot = Some(next);
        true
    }

    /// Effective count: prefix times post-operator count, `None` when
    /// neither was typed.
    pub fn total_count(&self) -> Option<u32> {
        match (self.count, self.post_op_count) {
            (None, None) => None,
            (prefix, post) => Some(
                prefix
                    .unwrap_or(1)
                    .saturating_mul(post.unwrap_or(1))
                    .min(MAX_COUNT),
            ),
        }
    }
}

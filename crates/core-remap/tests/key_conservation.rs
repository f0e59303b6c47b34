//! Remapping never loses, duplicates or reorders keys: every key typed ends up
//! as literal input, inside the `before` of exactly one applied remap, or in
//! the count prefix in front of it.

use core_config::{ModeGroup, RemapTableKey, Remapping};
use core_events::{BUFFERED_KEYS_SENTINEL, ManualTimeoutScheduler};
use core_keymap::parse_key_notation;
use core_remap::{RemapContext, RemapOutcome, RemapTable, RemapperSet};
use core_state::Mode;
use proptest::prelude::*;
use std::time::Duration;

fn table(group: ModeGroup, recursive: bool, befores: &[&str]) -> RemapTable {
    let remaps = befores
        .iter()
        .map(|b| Remapping {
            before: parse_key_notation(b),
            after: Some(vec!["<esc>".to_string()]),
            commands: None,
        })
        .collect();
    RemapTable::new(RemapTableKey { group, recursive }, remaps)
}

/// Feed calls allowed per simulation before it counts as a replay loop.
const STEP_LIMIT: usize = 1024;

fn is_count_digit(key: &str) -> bool {
    key.len() == 1 && key.chars().all(|c| c.is_ascii_digit())
}

/// Outside Insert mode a leading `[1-9][0-9]*` is a count, not command.
fn without_count(keys: &[String], mode: Mode) -> Vec<String> {
    let count_len = if mode == Mode::Insert || keys.first().is_none_or(|k| k == "0") {
        0
    } else {
        keys.iter().take_while(|k| is_count_digit(k)).count()
    };
    keys[count_len..].to_vec()
}

struct Sim {
    mode: Mode,
    set: RemapperSet,
    sched: ManualTimeoutScheduler,
    buffer: Vec<String>,
    out: Vec<String>,
    applied: usize,
    steps: usize,
    runaway: bool,
}

impl Sim {
    fn new() -> Self {
        Self::in_mode(Mode::Insert, ModeGroup::Insert)
    }

    fn in_mode(mode: Mode, group: ModeGroup) -> Self {
        Self {
            mode,
            set: RemapperSet::new(vec![
                table(group, true, &["jj", "jk", "jjk"]),
                table(group, false, &["kj", "jz"]),
            ]),
            sched: ManualTimeoutScheduler::new(),
            buffer: Vec::new(),
            out: Vec::new(),
            applied: 0,
            steps: 0,
            runaway: false,
        }
    }

    fn feed(&mut self, key: String) {
        self.steps += 1;
        if self.steps > STEP_LIMIT {
            self.runaway = true;
            return;
        }
        self.buffer.push(key);
        let keys = self.buffer.clone();
        let typed: Vec<String> = keys
            .iter()
            .filter(|k| *k != BUFFERED_KEYS_SENTINEL)
            .cloned()
            .collect();
        let pending = without_count(&typed, self.mode);
        let ctx = RemapContext {
            mode: self.mode,
            pending_command: &pending,
            timeout: Some(Duration::from_millis(1000)),
            performing_nonrecursive: false,
        };
        match self.set.send_key(&keys, &ctx, &mut self.sched) {
            // A bare count stays with the command being built.
            RemapOutcome::Declined if pending.is_empty() && !typed.is_empty() => {
                self.buffer = typed;
            }
            RemapOutcome::Declined => {
                self.buffer.clear();
                self.out.extend(typed);
            }
            RemapOutcome::Buffered => {}
            RemapOutcome::ReplayAll { keys } => {
                self.buffer.clear();
                for k in keys {
                    self.feed(k);
                }
            }
            RemapOutcome::Apply {
                remapping,
                leading_keys,
                remaining_keys,
                ..
            } => {
                self.buffer.clear();
                self.applied += 1;
                if self.mode == Mode::Insert {
                    self.out.extend(leading_keys);
                } else {
                    let count_end = typed.len() - remaining_keys.len() - remapping.before.len();
                    self.out.extend(typed[..count_end].iter().cloned());
                }
                self.out.extend(remapping.before.iter().cloned());
                for k in remaining_keys {
                    self.feed(k);
                }
            }
        }
    }

    fn fire_timer(&mut self) {
        if let Some(token) = self.sched.latest_live()
            && self.set.accepts_timeout(token)
        {
            self.feed(BUFFERED_KEYS_SENTINEL.to_string());
        }
    }

    fn drain(&mut self) {
        for _ in 0..64 {
            if !self.set.has_pending_ambiguity() {
                return;
            }
            self.fire_timer();
        }
    }

    /// Drain timers, then hand over any count still waiting for a command.
    fn finish(&mut self) {
        self.drain();
        if !self.set.has_pending_ambiguity() {
            self.out.append(&mut self.buffer);
        }
    }

    fn run(&mut self, script: &str) -> Vec<String> {
        let mut typed = Vec::new();
        for c in script.chars() {
            if c == 'T' {
                self.fire_timer();
            } else {
                typed.push(c.to_string());
                self.feed(c.to_string());
            }
        }
        self.finish();
        typed
    }
}

proptest! {
    // 'T' in the script stands for "the ambiguity timer elapsed here".
    #[test]
    fn keys_are_conserved(script in "[jkzT]{0,16}") {
        let mut sim = Sim::new();
        let typed = sim.run(&script);
        prop_assert!(!sim.runaway);
        prop_assert!(sim.buffer.is_empty());
        prop_assert!(!sim.set.has_pending_ambiguity());
        prop_assert_eq!(sim.out, typed);
    }

    #[test]
    fn counted_normal_mode_keys_are_conserved(script in "[1-9jkzT]{0,16}") {
        let mut sim = Sim::in_mode(Mode::Normal, ModeGroup::Normal);
        let typed = sim.run(&script);
        prop_assert!(!sim.runaway, "replay never settled for {:?}", script);
        prop_assert!(sim.buffer.is_empty());
        prop_assert!(!sim.set.has_pending_ambiguity());
        prop_assert_eq!(sim.out, typed);
    }

    #[test]
    fn jj_always_applies_when_typed_without_pause(prefix in "[kz]{0,4}") {
        let mut sim = Sim::new();
        for c in prefix.chars() {
            sim.feed(c.to_string());
        }
        sim.drain();
        let before = sim.applied;
        sim.feed("j".to_string());
        sim.feed("j".to_string());
        sim.drain();
        prop_assert!(sim.applied > before);
    }
}

#[test]
fn timeout_between_keys_yields_literals() {
    let mut sim = Sim::new();
    sim.feed("j".to_string());
    sim.fire_timer();
    sim.feed("x".to_string());
    sim.drain();
    assert_eq!(sim.applied, 0);
    assert_eq!(sim.out, vec!["j", "x"]);
}

#[test]
fn count_before_broken_ambiguity_terminates() {
    let mut sim = Sim::in_mode(Mode::Normal, ModeGroup::Normal);
    let typed = sim.run("2jx");
    assert!(!sim.runaway);
    assert_eq!(sim.applied, 0);
    assert_eq!(sim.out, typed);

    let mut sim = Sim::in_mode(Mode::Normal, ModeGroup::Normal);
    let typed = sim.run("2jT");
    assert!(!sim.runaway);
    assert!(!sim.set.has_pending_ambiguity());
    assert_eq!(sim.out, typed);
}

#[test]
fn count_prefix_is_kept_with_applied_remap() {
    let mut sim = Sim::in_mode(Mode::Normal, ModeGroup::Normal);
    let typed = sim.run("3kj");
    assert_eq!(sim.applied, 1);
    assert_eq!(sim.out, typed);
}

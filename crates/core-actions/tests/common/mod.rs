#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use anyhow::bail;
use core_actions::{DispatchError, EditorHost, Invocation, InvocationKind, KeyDispatcher};
use core_config::{Config, ConfigFile, ConfigIssue};
use core_events::ManualTimeoutScheduler;
use core_keymap::parse_key_notation;
use core_plugin::{BuiltinPluginHost, PluginHost};
use core_state::Mode;
use std::collections::HashSet;

/// One thing the dispatcher asked the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Action {
        name: &'static str,
        /// `action`, `linewise`, `selection` or `motion:<name>`.
        kind: String,
        count: Option<u32>,
        register: Option<String>,
        keys: Vec<String>,
        mode: Mode,
    },
    Command {
        command: String,
        args: Vec<String>,
    },
    CommandLine(String),
}

fn kind_label(kind: &InvocationKind) -> String {
    match kind {
        InvocationKind::Action => "action".to_string(),
        InvocationKind::Linewise => "linewise".to_string(),
        InvocationKind::Selection => "selection".to_string(),
        InvocationKind::OperatorMotion { motion } => format!("motion:{}", motion.name()),
    }
}

#[derive(Debug, Default)]
pub struct MockHost {
    pub calls: Vec<HostCall>,
    /// Commands (or command-line inputs) that return an error.
    pub failing: HashSet<String>,
    /// When set, only these commands are reported as known.
    pub known: Option<HashSet<String>>,
}

impl EditorHost for MockHost {
    fn execute_action(&mut self, inv: &Invocation) -> anyhow::Result<Option<Mode>> {
        self.calls.push(HostCall::Action {
            name: inv.name(),
            kind: kind_label(&inv.kind),
            count: inv.count,
            register: inv.register.clone(),
            keys: inv.action.keys_pressed.clone(),
            mode: inv.mode,
        });
        Ok(None)
    }

    fn execute_command(&mut self, command: &str, args: &[String]) -> anyhow::Result<()> {
        self.calls.push(HostCall::Command {
            command: command.to_string(),
            args: args.to_vec(),
        });
        if self.failing.contains(command) {
            bail!("{command} failed");
        }
        Ok(())
    }

    fn run_command_line(&mut self, input: &str) -> anyhow::Result<()> {
        self.calls.push(HostCall::CommandLine(input.to_string()));
        if self.failing.contains(input) {
            bail!("E492: Not an editor command: {input}");
        }
        Ok(())
    }

    fn is_known_command(&self, command: &str) -> bool {
        self.known.as_ref().is_none_or(|k| k.contains(command))
    }
}

pub fn config(src: &str) -> Config {
    let file: ConfigFile = toml::from_str(src).expect("test config parses");
    Config::from_file(file)
}

/// Dispatcher wired to a recording host and a manual timer.
pub struct Harness {
    pub dispatcher: KeyDispatcher,
    pub host: MockHost,
    pub timers: ManualTimeoutScheduler,
    pub issues: Vec<ConfigIssue>,
}

impl Harness {
    pub fn new(src: &str) -> Self {
        Self::build(config(src), Vec::new())
    }

    /// Same as `new` but with the `[plugins]` section honoured.
    pub fn with_plugins(src: &str) -> Self {
        let cfg = config(src);
        let mut plugins = BuiltinPluginHost::new(cfg.file.plugins.clone());
        plugins.load_all().expect("builtin plugins load");
        let actions = plugins.actions();
        Self::build(cfg, actions)
    }

    fn build(cfg: Config, actions: Vec<core_keymap::ActionDescriptor>) -> Self {
        let timers = ManualTimeoutScheduler::new();
        let (dispatcher, issues) = KeyDispatcher::new(&cfg, actions, Box::new(timers.clone()));
        Self {
            dispatcher,
            host: MockHost::default(),
            timers,
            issues,
        }
    }

    /// Feed keys written in bracket notation, one at a time.
    pub fn send(&mut self, notation: &str) -> Result<(), DispatchError> {
        let keys = parse_key_notation(notation);
        self.dispatcher.handle_keys(&keys, &mut self.host)
    }

    pub fn type_keys(&mut self, notation: &str) {
        self.send(notation).expect("keys dispatch without error");
    }

    /// Fire the most recently armed live timer.
    pub fn fire_timeout(&mut self) {
        let token = self.timers.latest_live().expect("a live ambiguity timer");
        self.dispatcher
            .on_timeout(token, &mut self.host)
            .expect("timeout dispatches without error");
    }

    pub fn mode(&self) -> Mode {
        self.dispatcher.mode()
    }

    pub fn action_names(&self) -> Vec<&'static str> {
        self.host
            .calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Action { name, .. } => Some(*name),
                _ => None,
            })
            .collect()
    }

    /// Text produced by `insert_character` actions, in order.
    pub fn inserted_text(&self) -> String {
        self.host
            .calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Action {
                    name: "insert_character",
                    keys,
                    ..
                } => keys.last().cloned(),
                _ => None,
            })
            .collect()
    }

    pub fn last_action(&self) -> Option<&HostCall> {
        self.host
            .calls
            .iter()
            .rev()
            .find(|c| matches!(c, HostCall::Action { .. }))
    }
}

pub fn keys(ks: &[&str]) -> Vec<String> {
    ks.iter().map(|s| s.to_string()).collect()
}

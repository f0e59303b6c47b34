//! Remap table schema and validation.
//!
//! Raw entries come straight from TOML; `RemapTableKey::load` turns one table
//! into validated, normalized `Remapping`s plus the issues found on the way.
//! Invalid entries are dropped, warnings keep the entry.

use core_keymap::{normalize_key, parse_key_notation, substitute_leader};
use core_state::ModeSet;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{error, warn};

/// A key list written either as an array (`["j", "j"]`) or as a notation
/// string (`"<leader>w"`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum KeySpec {
    List(Vec<String>),
    Notation(String),
}

impl KeySpec {
    pub fn to_keys(&self) -> Vec<String> {
        match self {
            KeySpec::List(keys) => keys.iter().map(|k| normalize_key(k)).collect(),
            KeySpec::Notation(s) => parse_key_notation(s),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CommandSpec {
    Name(String),
    Full {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RemapEntry {
    pub before: KeySpec,
    #[serde(default)]
    pub after: Option<KeySpec>,
    #[serde(default)]
    pub commands: Option<Vec<CommandSpec>>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct RemapConfig {
    #[serde(default)]
    pub insert: Vec<RemapEntry>,
    #[serde(default)]
    pub insert_nonrecursive: Vec<RemapEntry>,
    #[serde(default)]
    pub normal: Vec<RemapEntry>,
    #[serde(default)]
    pub normal_nonrecursive: Vec<RemapEntry>,
    #[serde(default)]
    pub visual: Vec<RemapEntry>,
    #[serde(default)]
    pub visual_nonrecursive: Vec<RemapEntry>,
    #[serde(default)]
    pub commandline: Vec<RemapEntry>,
    #[serde(default)]
    pub commandline_nonrecursive: Vec<RemapEntry>,
}

/// Host command invoked by a remap. Entries starting with `:` are routed to
/// the command-line interpreter instead of the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapCommand {
    pub command: String,
    pub args: Vec<String>,
}

impl RemapCommand {
    pub fn command_line(&self) -> Option<&str> {
        self.command.strip_prefix(':')
    }
}

impl From<&CommandSpec> for RemapCommand {
    fn from(spec: &CommandSpec) -> Self {
        match spec {
            CommandSpec::Name(c) => RemapCommand {
                command: c.clone(),
                args: Vec::new(),
            },
            CommandSpec::Full { command, args } => RemapCommand {
                command: command.clone(),
                args: args.clone(),
            },
        }
    }
}

/// Validated remap: `before` is non-empty and at least one target is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remapping {
    pub before: Vec<String>,
    pub after: Option<Vec<String>>,
    pub commands: Option<Vec<RemapCommand>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigIssue {
    #[error("{table}: {before} missing 'after' key or 'commands'")]
    MissingTarget { table: &'static str, before: String },
    #[error("{table}: remap entry has an empty 'before'")]
    EmptyBefore { table: &'static str },
    #[error("{table}: {before} sets both 'after' and 'commands'; keys replay first")]
    BothTargets { table: &'static str, before: String },
    #[error("{table}: {before} is defined more than once; the last definition wins")]
    Duplicate { table: &'static str, before: String },
    #[error("{table}: {command} does not exist")]
    UnknownCommand {
        table: &'static str,
        before: String,
        command: String,
    },
}

impl ConfigIssue {
    pub fn level(&self) -> IssueLevel {
        match self {
            ConfigIssue::MissingTarget { .. } | ConfigIssue::EmptyBefore { .. } => {
                IssueLevel::Error
            }
            _ => IssueLevel::Warning,
        }
    }

    /// Report through tracing at the matching level.
    pub fn report(&self) {
        match self.level() {
            IssueLevel::Error => error!(target: "config", issue = %self, "remap_config_error"),
            IssueLevel::Warning => warn!(target: "config", issue = %self, "remap_config_warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeGroup {
    Insert,
    Normal,
    Visual,
    CommandLine,
}

impl ModeGroup {
    pub const ALL: [ModeGroup; 4] = [
        ModeGroup::Insert,
        ModeGroup::Normal,
        ModeGroup::Visual,
        ModeGroup::CommandLine,
    ];

    pub fn modes(self) -> ModeSet {
        match self {
            ModeGroup::Insert => ModeSet::INSERT_LIKE,
            ModeGroup::Normal => ModeSet::NORMAL,
            ModeGroup::Visual => ModeSet::ANY_VISUAL,
            ModeGroup::CommandLine => ModeSet::COMMAND_LINE_LIKE,
        }
    }
}

/// Identifies one remap table: a mode group plus the recursion variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemapTableKey {
    pub group: ModeGroup,
    pub recursive: bool,
}

impl RemapTableKey {
    /// Recursive tables first, then the non-recursive ones.
    pub fn all() -> impl Iterator<Item = RemapTableKey> {
        [true, false].into_iter().flat_map(|recursive| {
            ModeGroup::ALL
                .into_iter()
                .map(move |group| RemapTableKey { group, recursive })
        })
    }

    pub fn config_key(self) -> &'static str {
        match (self.group, self.recursive) {
            (ModeGroup::Insert, true) => "insert",
            (ModeGroup::Insert, false) => "insert_nonrecursive",
            (ModeGroup::Normal, true) => "normal",
            (ModeGroup::Normal, false) => "normal_nonrecursive",
            (ModeGroup::Visual, true) => "visual",
            (ModeGroup::Visual, false) => "visual_nonrecursive",
            (ModeGroup::CommandLine, true) => "commandline",
            (ModeGroup::CommandLine, false) => "commandline_nonrecursive",
        }
    }

    pub fn modes(self) -> ModeSet {
        self.group.modes()
    }

    pub fn entries(self, cfg: &RemapConfig) -> &[RemapEntry] {
        match (self.group, self.recursive) {
            (ModeGroup::Insert, true) => &cfg.insert,
            (ModeGroup::Insert, false) => &cfg.insert_nonrecursive,
            (ModeGroup::Normal, true) => &cfg.normal,
            (ModeGroup::Normal, false) => &cfg.normal_nonrecursive,
            (ModeGroup::Visual, true) => &cfg.visual,
            (ModeGroup::Visual, false) => &cfg.visual_nonrecursive,
            (ModeGroup::CommandLine, true) => &cfg.commandline,
            (ModeGroup::CommandLine, false) => &cfg.commandline_nonrecursive,
        }
    }

    /// Validate and normalize this table. `<leader>` in `before`/`after` is
    /// replaced by `leader`. Later duplicates replace earlier ones in place.
    pub fn load(self, cfg: &RemapConfig, leader: &str) -> (Vec<Remapping>, Vec<ConfigIssue>) {
        let table = self.config_key();
        let mut out: Vec<Remapping> = Vec::new();
        let mut index: HashMap<Vec<String>, usize> = HashMap::new();
        let mut issues = Vec::new();
        for entry in self.entries(cfg) {
            let before = substitute_leader(&entry.before.to_keys(), leader);
            if before.is_empty() {
                issues.push(ConfigIssue::EmptyBefore { table });
                continue;
            }
            let shown = before.concat();
            if entry.after.is_none() && entry.commands.is_none() {
                issues.push(ConfigIssue::MissingTarget {
                    table,
                    before: shown,
                });
                continue;
            }
            if entry.after.is_some() && entry.commands.is_some() {
                issues.push(ConfigIssue::BothTargets {
                    table,
                    before: shown.clone(),
                });
            }
            let remapping = Remapping {
                before: before.clone(),
                after: entry
                    .after
                    .as_ref()
                    .map(|a| substitute_leader(&a.to_keys(), leader)),
                commands: entry
                    .commands
                    .as_ref()
                    .map(|cs| cs.iter().map(RemapCommand::from).collect()),
            };
            if let Some(&at) = index.get(&before) {
                issues.push(ConfigIssue::Duplicate {
                    table,
                    before: shown,
                });
                out[at] = remapping;
            } else {
                index.insert(before, out.len());
                out.push(remapping);
            }
        }
        (out, issues)
    }
}

/// Lazy host-command validation: warn about commands the host does not know.
/// Command-line (`:`) entries are always accepted.
pub fn command_warnings<F>(table: RemapTableKey, remaps: &[Remapping], is_known: F) -> Vec<ConfigIssue>
where
    F: Fn(&str) -> bool,
{
    let mut issues = Vec::new();
    for r in remaps {
        for cmd in r.commands.iter().flatten() {
            if cmd.command_line().is_none() && !is_known(&cmd.command) {
                issues.push(ConfigIssue::UnknownCommand {
                    table: table.config_key(),
                    before: r.before.concat(),
                    command: cmd.command.clone(),
                });
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> RemapConfig {
        #[derive(Deserialize)]
        struct Wrapper {
            remap: RemapConfig,
        }
        toml::from_str::<Wrapper>(src).expect("valid toml").remap
    }

    const INSERT: RemapTableKey = RemapTableKey {
        group: ModeGroup::Insert,
        recursive: true,
    };

    #[test]
    fn accepts_list_and_notation_forms() {
        let cfg = parse(
            r#"
            [[remap.insert]]
            before = ["j", "j"]
            after = ["<Esc>"]

            [[remap.insert]]
            before = "<leader>w"
            commands = [":w", { command = "editor.save", args = ["now"] }]
            "#,
        );
        let (remaps, issues) = INSERT.load(&cfg, ",");
        assert!(issues.is_empty());
        assert_eq!(remaps[0].before, vec!["j", "j"]);
        assert_eq!(remaps[0].after, Some(vec!["<esc>".to_string()]));
        assert_eq!(remaps[1].before, vec![",", "w"]);
        let cmds = remaps[1].commands.as_ref().expect("commands");
        assert_eq!(cmds[0].command_line(), Some("w"));
        assert_eq!(cmds[1].command, "editor.save");
        assert_eq!(cmds[1].args, vec!["now"]);
    }

    #[test]
    fn missing_target_is_error_and_dropped() {
        let cfg = parse(
            r#"
            [[remap.insert]]
            before = ["j", "k"]
            "#,
        );
        let (remaps, issues) = INSERT.load(&cfg, "\\");
        assert!(remaps.is_empty());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level(), IssueLevel::Error);
        assert_eq!(
            issues[0].to_string(),
            "insert: jk missing 'after' key or 'commands'"
        );
    }

    #[test]
    fn duplicates_keep_last_definition() {
        let cfg = parse(
            r#"
            [[remap.insert]]
            before = "jj"
            after = ["a"]
            [[remap.insert]]
            before = "jj"
            after = ["b"]
            "#,
        );
        let (remaps, issues) = INSERT.load(&cfg, "\\");
        assert_eq!(remaps.len(), 1);
        assert_eq!(remaps[0].after, Some(vec!["b".to_string()]));
        assert_eq!(issues[0].level(), IssueLevel::Warning);
    }

    #[test]
    fn unknown_host_commands_warn_but_survive() {
        let cfg = parse(
            r#"
            [[remap.insert]]
            before = "jj"
            commands = ["nope.command", ":nohl", "known.command"]
            "#,
        );
        let (remaps, _) = INSERT.load(&cfg, "\\");
        let issues = command_warnings(INSERT, &remaps, |c| c == "known.command");
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues[0],
            ConfigIssue::UnknownCommand { command, .. } if command == "nope.command"
        ));
        assert_eq!(remaps.len(), 1);
    }

    #[test]
    fn table_keys_cover_eight_variants() {
        let keys: Vec<_> = RemapTableKey::all().map(|k| k.config_key()).collect();
        assert_eq!(keys.len(), 8);
        assert_eq!(keys[0], "insert");
        assert_eq!(keys[4], "insert_nonrecursive");
    }
}

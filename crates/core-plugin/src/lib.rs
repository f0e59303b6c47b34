//! Plugin host: compiled-in extensions selected by configuration.
//!
//! A plugin contributes action descriptors (appended to the registry after the
//! built-ins, so a built-in with an identical pattern still wins) and may
//! contribute async event sources spawned alongside the runtime's own.
//!
//! Design Notes:
//! - Loading is synchronous; `load_all` returns `Result` to reserve space for
//!   plugins that read external state.
//! - `actions` and `event_sources` transfer ownership; later calls return
//!   empty collections.
//! - This crate depends only on the keymap, state, events and config crates
//!   to avoid cycles with the dispatcher.

pub mod replace_with_register;

use core_config::PluginsConfig;
use core_events::AsyncEventSource;
use core_keymap::ActionDescriptor;
use tracing::info;

pub use replace_with_register::ReplaceWithRegister;

/// One compiled-in plugin.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;
    fn actions(&self) -> Vec<ActionDescriptor>;
    fn event_sources(&self) -> Vec<Box<dyn AsyncEventSource>> {
        Vec::new()
    }
}

/// Trait representing a collection-oriented plugin host. Implementors are
/// responsible for discovering zero or more plugins and exposing what they
/// contribute.
pub trait PluginHost: Send + Sync {
    /// Stable human-readable host identifier (for logs / diagnostics).
    fn name(&self) -> &'static str;
    /// Load plugins. Repeated calls must not duplicate contributions.
    fn load_all(&mut self) -> anyhow::Result<()>;
    /// Action descriptors contributed by loaded plugins, in load order.
    fn actions(&mut self) -> Vec<ActionDescriptor>;
    /// Async event sources contributed by loaded plugins.
    fn event_sources(&mut self) -> Vec<Box<dyn AsyncEventSource>>;
}

/// Host for the plugins compiled into this binary, enabled per `[plugins]`.
pub struct BuiltinPluginHost {
    enabled: PluginsConfig,
    loaded: Vec<Box<dyn Plugin>>,
    actions_drained: bool,
    sources_drained: bool,
}

impl BuiltinPluginHost {
    pub fn new(enabled: PluginsConfig) -> Self {
        Self {
            enabled,
            loaded: Vec::new(),
            actions_drained: false,
            sources_drained: false,
        }
    }

    pub fn loaded(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.loaded.iter().map(|p| p.name())
    }
}

impl PluginHost for BuiltinPluginHost {
    fn name(&self) -> &'static str {
        "builtin-plugin-host"
    }

    fn load_all(&mut self) -> anyhow::Result<()> {
        if !self.loaded.is_empty() {
            return Ok(());
        }
        if self.enabled.replace_with_register {
            self.loaded.push(Box::new(ReplaceWithRegister));
        }
        for plugin in &self.loaded {
            info!(target: "plugin", plugin = plugin.name(), "plugin_loaded");
        }
        Ok(())
    }

    fn actions(&mut self) -> Vec<ActionDescriptor> {
        if self.actions_drained {
            return Vec::new();
        }
        self.actions_drained = true;
        self.loaded.iter().flat_map(|p| p.actions()).collect()
    }

    fn event_sources(&mut self) -> Vec<Box<dyn AsyncEventSource>> {
        if self.sources_drained {
            return Vec::new();
        }
        self.sources_drained = true;
        self.loaded.iter().flat_map(|p| p.event_sources()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_host_contributes_nothing() {
        let mut host = BuiltinPluginHost::new(PluginsConfig::default());
        host.load_all().expect("load should succeed");
        assert!(host.actions().is_empty());
        assert!(host.event_sources().is_empty());
        assert_eq!(host.loaded().count(), 0);
    }

    #[test]
    fn contributions_drain_once() {
        let mut host = BuiltinPluginHost::new(PluginsConfig {
            replace_with_register: true,
        });
        host.load_all().expect("load should succeed");
        host.load_all().expect("reload is idempotent");
        assert_eq!(host.loaded().collect::<Vec<_>>(), vec!["replace-with-register"]);
        let first = host.actions();
        assert!(!first.is_empty());
        assert!(host.actions().is_empty(), "subsequent calls remain empty");
    }
}

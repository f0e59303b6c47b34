//! keyweave entrypoint: resolve keystrokes from stdin (or `--keys`) and print
//! what an editor would execute.
mod host;
mod stdin_source;

use anyhow::Result;
use clap::Parser;
use core_actions::{DispatchError, KeyDispatcher};
use core_config::{Config, load_from};
use core_events::{
    EVENT_CHANNEL_CAP, Event, EventHooks, EventSourceRegistry, InputEvent, NoopEventHooks,
    ScriptedKeySource, TimeoutToken, TokioTimeoutScheduler,
};
use core_keymap::parse_key_notation;
use core_plugin::{BuiltinPluginHost, PluginHost};
use host::PrintingHost;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use stdin_source::LineKeySource;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "keyweave", version, about = "Vim keystroke resolution engine")]
struct Args {
    /// Optional configuration file path (overrides discovery of `keyweave.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Resolve this key notation string (`"ijj<esc>"`) and exit instead of reading stdin.
    #[arg(long = "keys")]
    pub keys: Option<String>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("keyweave.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "keyweave.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

enum LoopControl {
    Continue,
    Break { reason: ShutdownReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    ShutdownEvent,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::ShutdownEvent => "shutdown_event",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

struct KeyRuntime<W: Write> {
    dispatcher: KeyDispatcher,
    host: PrintingHost<W>,
    config_path: Option<PathBuf>,
    hooks: Box<dyn EventHooks>,
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    source_handles: Vec<tokio::task::JoinHandle<()>>,
}

impl<W: Write> KeyRuntime<W> {
    fn new(
        dispatcher: KeyDispatcher,
        host: PrintingHost<W>,
        config_path: Option<PathBuf>,
        tx: mpsc::Sender<Event>,
        rx: mpsc::Receiver<Event>,
        source_handles: Vec<tokio::task::JoinHandle<()>>,
    ) -> Self {
        Self {
            dispatcher,
            host,
            config_path,
            hooks: Box::new(NoopEventHooks),
            rx,
            tx: Some(tx),
            source_handles,
        }
    }

    async fn run(&mut self) -> Result<()> {
        let loop_span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter_loop = loop_span.enter();

        let mut shutdown_reason = ShutdownReason::ChannelClosed;
        while let Some(event) = self.rx.recv().await {
            self.hooks.pre_handle(&event);

            let before = self.dispatcher.mode();
            let control = match &event {
                Event::Input(InputEvent::Key(key)) => self.handle_key(key),
                Event::Input(InputEvent::BufferedKeysTimeout(token)) => self.handle_timeout(*token),
                Event::ConfigChanged => self.handle_config_changed(),
                Event::Shutdown => self.handle_shutdown(),
            };
            self.report_mode_change(before)?;

            match control {
                LoopControl::Break { reason } => {
                    shutdown_reason = reason;
                    break;
                }
                LoopControl::Continue => self.hooks.post_handle(&event),
            }
        }

        self.rx.close();
        self.finalize_shutdown(shutdown_reason).await;
        Ok(())
    }

    fn handle_key(&mut self, key: &str) -> LoopControl {
        if let Err(e) = self.dispatcher.handle_key(key, &mut self.host) {
            self.report_dispatch_error(&e);
        }
        LoopControl::Continue
    }

    fn handle_timeout(&mut self, token: TimeoutToken) -> LoopControl {
        if let Err(e) = self.dispatcher.on_timeout(token, &mut self.host) {
            self.report_dispatch_error(&e);
        }
        LoopControl::Continue
    }

    fn handle_config_changed(&mut self) -> LoopControl {
        match load_from(self.config_path.clone()) {
            Ok(config) => {
                let issues = self.dispatcher.reload(config, &mut self.host);
                info!(
                    target: "config",
                    issues = issues.len(),
                    deferred = self.dispatcher.has_deferred_reload(),
                    "config_reload_requested"
                );
            }
            Err(e) => warn!(target: "config", error = %e, "config_reload_failed"),
        }
        LoopControl::Continue
    }

    /// Input is over: whatever is still buffered resolves now.
    fn handle_shutdown(&mut self) -> LoopControl {
        if let Err(e) = self.dispatcher.flush_pending(&mut self.host) {
            self.report_dispatch_error(&e);
        }
        LoopControl::Break {
            reason: ShutdownReason::ShutdownEvent,
        }
    }

    fn report_dispatch_error(&mut self, e: &DispatchError) {
        if let Err(write_err) = self.host.note(&format!("error: {e}")) {
            warn!(target: "runtime", error = %e, write_error = %write_err, "output_write_failed");
        }
    }

    fn report_mode_change(&mut self, before: core_state::Mode) -> Result<()> {
        let after = self.dispatcher.mode();
        if after != before {
            self.host.note(&format!("-- {after} --"))?;
        }
        Ok(())
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        debug!(target: "runtime.shutdown", reason = reason.as_str(), "shutdown_begin");
        if let Some(tx) = self.tx.take() {
            trace!(
                target: "runtime.shutdown",
                reason = reason.as_str(),
                "dropping_runtime_sender"
            );
            drop(tx);
        }

        while let Some(handle) = self.source_handles.pop() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(_)) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_stopped"
                ),
                Ok(Err(err)) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_cancelled"
                ),
                Ok(Err(err)) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "event_source_task_error"
                ),
                Err(_) => warn!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_timeout"
                ),
            }
        }
        info!(target: "runtime.shutdown", reason = reason.as_str(), "shutdown_complete");
    }
}

fn build_dispatcher(
    config: &Config,
    tx: &mpsc::Sender<Event>,
    plugins: &mut BuiltinPluginHost,
) -> KeyDispatcher {
    let scheduler = TokioTimeoutScheduler::new(tx.clone());
    let (dispatcher, issues) = KeyDispatcher::new(config, plugins.actions(), Box::new(scheduler));
    if !issues.is_empty() {
        warn!(target: "config", issues = issues.len(), "remap_config_issues");
    }
    dispatcher
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = load_from(args.config.clone())?;
    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);

    let mut plugins = BuiltinPluginHost::new(config.file.plugins.clone());
    plugins.load_all()?;
    let dispatcher = build_dispatcher(&config, &tx, &mut plugins);

    let host = PrintingHost::new(std::io::stdout());
    dispatcher.validate_commands(&host);

    let mut registry = EventSourceRegistry::new();
    match args.keys.as_deref() {
        Some(keys) => registry.register(ScriptedKeySource::new(parse_key_notation(keys), true)),
        None => registry.register(LineKeySource::stdin()),
    }
    for source in plugins.event_sources() {
        registry.register_boxed(source);
    }
    let source_handles = registry.spawn_all(&tx);

    let mut runtime = KeyRuntime::new(dispatcher, host, args.config, tx, rx, source_handles);
    runtime.run().await
}

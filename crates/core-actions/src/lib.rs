//! core-actions: key dispatch from raw keys to host execution.
//!
//! The dispatcher owns the mode state machine, the action registry, the
//! remapper set and the recorded state of the command being typed. Keys are
//! resolved strictly one at a time; replays triggered by remaps run to
//! completion before `handle_key` returns.
//!
//! Buffer mutation is not done here: resolved actions are handed to an
//! `EditorHost` as `Invocation`s.

pub mod dispatcher;
pub mod error;
pub mod host;
pub mod recorded;

pub use dispatcher::KeyDispatcher;
pub use error::DispatchError;
pub use host::{EditorHost, Invocation, InvocationKind};
pub use recorded::{MAX_COUNT, RecordedState};

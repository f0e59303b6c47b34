//! core-keymap: key patterns, the wildcard matcher and the action registry.
//!
//! Design principles:
//! - Pure and deterministic: resolution depends only on the typed keys, the
//!   current mode, the pending command length and the configured leader.
//! - Templates are registered once from an explicit descriptor table
//!   (`builtins`) plus whatever plugins contribute afterwards; registration
//!   order is the tie-break.
//! - Ambiguity is surfaced as `KeypressResolution::WaitingOnKeys` when a strict
//!   prefix of one or more templates matches but no template matched fully.
//! - No side effects: logging only at TRACE/DEBUG for traversal steps.

pub mod action;
pub mod builtins;
pub mod matcher;
pub mod notation;
pub mod registry;
pub mod token;

pub use action::{ActionDescriptor, ResolvedAction};
pub use matcher::{KeyMatcher, is_control_key};
pub use notation::{normalize_key, parse_key_notation, substitute_leader};
pub use registry::{ActionRegistry, KeypressResolution};
pub use token::{KeyPattern, KeyView, Token, Wildcard, pattern};

//! core-remap: user remap tables and the engines that apply them.
//!
//! One `RemappingEngine` exists per configured table (mode group × recursion
//! variant). Engines are pure state machines over the pending key list: they
//! match, buffer ambiguous prefixes behind a cancellable timer, recover when a
//! later key breaks an ambiguity, and hand the result back to the dispatcher
//! as a `RemapOutcome`. Executing the outcome is the dispatcher's job.

pub mod engine;
pub mod set;
pub mod table;

pub use engine::{RemapContext, RemapOutcome, RemappingEngine};
pub use set::RemapperSet;
pub use table::{RemapMatch, RemapTable};

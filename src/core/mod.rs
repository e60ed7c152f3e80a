//! Core module: matcher, reconciliation engine, operations, request surface.
//!
//! The engine is the stateful heart of the crate: it owns the registry,
//! reacts to host lifecycle events, and serves the UI's discrete
//! save/delete/undo/open requests. The matcher is the pure predicate the
//! engine reconciles with.

mod engine;
mod matcher;
mod ops;
mod requests;

pub use engine::Engine;
pub use matcher::windows_are_equal;
pub use ops::EngineError;
pub use requests::{Request, Response, DEFAULT_WINDOW_NAME};

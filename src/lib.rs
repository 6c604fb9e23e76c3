//! Time-tracking and to-do list library
//!
//! This library provides functionality for creating, timing, annotating, and
//! reordering named timers, plus a flat to-do list, persisted through a
//! pluggable key-value storage backend.

mod cli;
mod clock;
mod config;
mod errors;
mod helper;
mod storage;
mod timers;
mod todos;
mod types;

// Re-export key components
pub use cli::*;
pub use clock::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use storage::*;
pub use timers::*;
pub use todos::*;
pub use types::*;

//! Error types for the ticklist application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur during timer and to-do list operations.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the ticklist application.
#[derive(Error, Debug)]
pub enum TickError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timer was not found when performing an operation.
    #[error("Timer not found: {id}")]
    TimerNotFound { id: String },

    /// To-do item was not found when performing an operation.
    #[error("To-do item not found: {id}")]
    TodoNotFound { id: String },

    /// A reorder operation referenced a position outside the collection.
    #[error("Index {index} out of range for collection of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A reorder operation supplied an id list that does not match the
    /// stored collection.
    #[error("Reorder rejected: {message}")]
    ReorderMismatch { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// A duration string could not be parsed.
    #[error("Invalid duration: {input} (expected HH:MM:SS or seconds)")]
    InvalidDuration { input: String },
}

//! Core data structures for the ticklist application.
//!
//! This module contains the primary types used throughout the application:
//! the persisted timer and to-do records, the derived timer view, and the
//! CLI command tree.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::{Deserialize, Serialize};

use crate::TickError;

/// A specialized Result type for ticklist operations.
pub type Result<T> = std::result::Result<T, TickError>;

/// A single persisted timer.
///
/// `duration` holds the seconds banked while the timer was previously
/// running; any in-progress interval is represented solely by `started_at`
/// and folded in at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerRecord {
    /// Unique identifier, never reused
    pub id: String,
    /// User-facing label
    pub name: String,
    /// Banked seconds, excluding the in-progress interval
    pub duration: f64,
    /// Start of the current interval; `Some` iff the timer is running
    pub started_at: Option<DateTime<Utc>>,
    /// Free-form notes attached to the timer
    #[serde(default)]
    pub notes: String,
    /// Whether the notes panel is expanded in the UI
    #[serde(default)]
    pub is_expanded: bool,
}

impl TimerRecord {
    /// Creates a paused timer with no banked time.
    pub fn new(id: String, name: String) -> Self {
        TimerRecord {
            id,
            name,
            duration: 0.0,
            started_at: None,
            notes: String::new(),
            is_expanded: false,
        }
    }

    /// Whether the timer is currently running.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Total seconds the timer should display at instant `now`.
    pub fn effective_seconds(&self, now: DateTime<Utc>) -> f64 {
        match self.started_at {
            Some(started_at) => {
                let since_started = (now - started_at).num_milliseconds() as f64 / 1000.0;
                self.duration + since_started
            }
            None => self.duration,
        }
    }
}

/// The derived, UI-facing shape of a timer. Never persisted; recomputed
/// from a [`TimerRecord`] and the current clock on every read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerView {
    pub id: String,
    pub name: String,
    pub is_running: bool,
    /// Banked seconds plus any in-progress interval
    pub effective_seconds: f64,
    pub notes: String,
    pub is_expanded: bool,
    /// Set on a freshly created timer so the UI can focus its name field
    pub request_focus: bool,
}

/// A single persisted to-do item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoRecord {
    /// Unique identifier, never reused
    pub id: String,
    /// Item text
    pub content: String,
}

/// Available subcommands for the ticklist application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new timer
    Create,

    /// List all timers with their current elapsed time
    List {
        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Start a timer
    Start {
        /// ID of the timer to start
        id: String,
    },

    /// Pause a running timer
    Pause {
        /// ID of the timer to pause
        id: String,
    },

    /// Reset a timer to zero
    Reset {
        /// ID of the timer to reset
        id: String,
    },

    /// Rename a timer
    Rename {
        /// ID of the timer to rename
        id: String,

        /// New name (empty allowed)
        name: String,
    },

    /// Set the notes attached to a timer
    Notes {
        /// ID of the timer
        id: String,

        /// Replacement notes text
        text: String,
    },

    /// Toggle the expanded flag of a timer
    Toggle {
        /// ID of the timer
        id: String,
    },

    /// Overwrite a timer's banked time
    SetTime {
        /// ID of the timer
        id: String,

        /// New time as HH:MM:SS or plain seconds
        time: String,
    },

    /// Swap two timers' positions in the display order
    Swap {
        /// First position (zero-based)
        index_a: usize,

        /// Second position (zero-based)
        index_b: usize,
    },

    /// Delete a timer by ID
    Delete {
        /// ID of the timer to delete
        id: String,
    },

    /// Show the total time across all timers
    Total,

    /// To-do list operations
    Todo {
        #[clap(subcommand)]
        command: TodoCommands,
    },
}

/// Subcommands for the to-do list
#[derive(Subcommand)]
pub enum TodoCommands {
    /// Add a new to-do item
    Add {
        /// Item text; a placeholder is used when omitted
        content: Option<String>,
    },

    /// List all to-do items
    List {
        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit the text of a to-do item
    Edit {
        /// ID of the item
        id: String,

        /// Replacement text
        content: String,
    },

    /// Reorder the list by supplying every id in the desired order
    Reorder {
        /// Full id list in the new order
        ids: Vec<String>,
    },

    /// Remove a to-do item
    Done {
        /// ID of the item to remove
        id: String,
    },
}

//! Clock abstraction for elapsed-time computation.
//!
//! The repositories never read the system time directly; they go through a
//! [`Clock`] so tests can control time exactly instead of sleeping.

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock that only moves when told to. Clones share the same instant,
/// so a test can keep one handle and hand another to a repository.
#[cfg(test)]
#[derive(Clone)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<DateTime<Utc>>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            now: std::rc::Rc::new(std::cell::Cell::new(start)),
        }
    }

    pub fn advance_secs(&self, seconds: i64) {
        self.now
            .set(self.now.get() + chrono::Duration::seconds(seconds));
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

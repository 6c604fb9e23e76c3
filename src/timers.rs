//! Timer collection management.
//!
//! [`TimerRepository`] is the sole owner of the persisted timer collection.
//! Every mutating operation is a full read-modify-write of the collection
//! blob and returns the complete, ordered view sequence so callers always
//! render from fresh state.

use log::{debug, info, warn};

use crate::{
    generate_id, Clock, Config, Result, StorageBackend, TickError, TimerRecord, TimerView,
    TIMERS_KEY,
};

/// Manages the storage, retrieval, and lifecycle of timers.
pub struct TimerRepository<S: StorageBackend, C: Clock> {
    /// Storage backend holding the serialized collection
    store: S,

    /// Clock used for interval starts and elapsed-time computation
    clock: C,

    /// Length of generated timer identifiers
    id_length: usize,

    /// Sum of effective seconds over all records, refreshed on every
    /// operation
    total_seconds: f64,
}

impl<S: StorageBackend, C: Clock> TimerRepository<S, C> {
    /// Creates a repository over the given storage backend and clock.
    pub fn new(store: S, clock: C, config: &Config) -> Self {
        TimerRepository {
            store,
            clock,
            id_length: config.id_length,
            total_seconds: 0.0,
        }
    }

    /// Returns the current view of every timer, in stored order, with
    /// elapsed time computed against the clock.
    pub fn list(&mut self) -> Result<Vec<TimerView>> {
        let records = self.load_records()?;
        Ok(self.views(&records, None))
    }

    /// Appends a new paused timer named after the current count and returns
    /// the updated collection. The new timer's view carries `request_focus`
    /// so the UI can put the cursor in its name field.
    pub fn create(&mut self) -> Result<Vec<TimerView>> {
        let mut records = self.load_records()?;

        let id = generate_id(self.id_length);
        let name = format!("Timer {}", records.len() + 1);
        info!("Creating timer '{}' with id {}", name, id);

        records.push(TimerRecord::new(id.clone(), name));
        self.save_records(&records)?;

        Ok(self.views(&records, Some(&id)))
    }

    /// Removes the timer with the given id. Deleting an unknown id is not
    /// an error; the unchanged collection is persisted and returned.
    pub fn delete(&mut self, id: &str) -> Result<Vec<TimerView>> {
        let mut records = self.load_records()?;
        let before = records.len();

        records.retain(|record| record.id != id);
        if records.len() < before {
            info!("Deleted timer {}", id);
        } else {
            debug!("Delete targeted unknown timer {}, nothing removed", id);
        }

        self.save_records(&records)?;
        Ok(self.views(&records, None))
    }

    /// Starts the timer. Starting an already-running timer leaves its
    /// interval start untouched, so no unbanked time is lost.
    pub fn start(&mut self, id: &str) -> Result<Vec<TimerView>> {
        let now = self.clock.now();
        self.update_record(id, |record| {
            if record.started_at.is_none() {
                info!("Starting timer {}", record.id);
                record.started_at = Some(now);
            } else {
                debug!("Timer {} already running, start is a no-op", record.id);
            }
        })
    }

    /// Pauses the timer, folding the in-progress interval into its banked
    /// time. Pausing a paused timer succeeds without changing anything.
    pub fn pause(&mut self, id: &str) -> Result<Vec<TimerView>> {
        let now = self.clock.now();
        self.update_record(id, |record| {
            if let Some(started_at) = record.started_at.take() {
                let elapsed = (now - started_at).num_milliseconds() as f64 / 1000.0;
                record.duration += elapsed;
                info!("Paused timer {} after {:.1}s", record.id, elapsed);
            }
        })
    }

    /// Resets the timer to zero banked time and the paused state,
    /// discarding any in-progress interval.
    pub fn reset(&mut self, id: &str) -> Result<Vec<TimerView>> {
        self.update_record(id, |record| {
            info!("Resetting timer {}", record.id);
            record.started_at = None;
            record.duration = 0.0;
        })
    }

    /// Sets the timer's name verbatim; empty names are allowed.
    pub fn update_name(&mut self, id: &str, name: &str) -> Result<Vec<TimerView>> {
        self.update_record(id, |record| {
            record.name = name.to_string();
        })
    }

    /// Sets the timer's notes verbatim.
    pub fn update_notes(&mut self, id: &str, notes: &str) -> Result<Vec<TimerView>> {
        self.update_record(id, |record| {
            record.notes = notes.to_string();
        })
    }

    /// Flips the timer's expanded flag.
    pub fn toggle_expanded(&mut self, id: &str) -> Result<Vec<TimerView>> {
        self.update_record(id, |record| {
            record.is_expanded = !record.is_expanded;
        })
    }

    /// Overwrites the timer's banked seconds. The interval start is left
    /// alone, so a running timer keeps accruing on top of the new base;
    /// this lets users correct the time without stopping the timer.
    pub fn update_duration(&mut self, id: &str, seconds: f64) -> Result<Vec<TimerView>> {
        self.update_record(id, |record| {
            info!("Setting timer {} to {:.0}s banked", record.id, seconds);
            record.duration = seconds.max(0.0);
        })
    }

    /// Exchanges the records at the two positions in the display order.
    pub fn swap(&mut self, index_a: usize, index_b: usize) -> Result<Vec<TimerView>> {
        let mut records = self.load_records()?;

        for index in [index_a, index_b] {
            if index >= records.len() {
                warn!(
                    "Swap rejected: index {} out of range for {} timers",
                    index,
                    records.len()
                );
                return Err(TickError::IndexOutOfRange {
                    index,
                    len: records.len(),
                });
            }
        }

        records.swap(index_a, index_b);
        self.save_records(&records)?;
        Ok(self.views(&records, None))
    }

    /// The aggregate total published alongside the views: the sum of
    /// effective seconds over all records, as of the last operation.
    pub fn total_seconds(&self) -> f64 {
        self.total_seconds
    }

    /// Applies `mutate` to the record with the given id, persists the
    /// collection, and returns the updated views. Fails with
    /// [`TickError::TimerNotFound`] if no record matches.
    fn update_record<F>(&mut self, id: &str, mutate: F) -> Result<Vec<TimerView>>
    where
        F: FnOnce(&mut TimerRecord),
    {
        let mut records = self.load_records()?;

        match records.iter_mut().find(|record| record.id == id) {
            Some(record) => mutate(record),
            None => {
                debug!("Timer not found: {}", id);
                return Err(TickError::TimerNotFound { id: id.to_string() });
            }
        }

        self.save_records(&records)?;
        Ok(self.views(&records, None))
    }

    /// Loads the persisted collection. A missing key is an empty
    /// collection; a malformed blob is logged and likewise treated as
    /// empty, since there is no schema versioning to migrate from.
    fn load_records(&self) -> Result<Vec<TimerRecord>> {
        let Some(blob) = self.store.get(TIMERS_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&blob) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("Malformed timer collection, starting empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn save_records(&mut self, records: &[TimerRecord]) -> Result<()> {
        let blob = serde_json::to_string(records)?;
        self.store.set(TIMERS_KEY, &blob)
    }

    /// Builds the derived views against the current clock and refreshes the
    /// aggregate total.
    fn views(&mut self, records: &[TimerRecord], focus_id: Option<&str>) -> Vec<TimerView> {
        let now = self.clock.now();
        let mut total = 0.0;

        let views = records
            .iter()
            .map(|record| {
                let effective_seconds = record.effective_seconds(now);
                total += effective_seconds;
                TimerView {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    is_running: record.is_running(),
                    effective_seconds,
                    notes: record.notes.clone(),
                    is_expanded: record.is_expanded,
                    request_focus: focus_id == Some(record.id.as_str()),
                }
            })
            .collect();

        self.total_seconds = total;
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, MemoryStore};
    use chrono::{TimeZone, Utc};

    fn test_repo() -> (TimerRepository<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        let config = Config::with_data_dir(std::path::PathBuf::from("."));
        let repo = TimerRepository::new(MemoryStore::new(), clock.clone(), &config);
        (repo, clock)
    }

    #[test]
    fn test_create_names_by_count() {
        let (mut repo, _clock) = test_repo();

        let views = repo.create().unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].name, "Timer 1");
        assert_eq!(views[0].effective_seconds, 0.0);
        assert!(!views[0].is_running);
        assert!(views[0].request_focus);

        let views = repo.create().unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[1].name, "Timer 2");
        // Only the fresh timer asks for focus
        assert!(!views[0].request_focus);
        assert!(views[1].request_focus);
    }

    #[test]
    fn test_create_generates_unique_ids() {
        let (mut repo, _clock) = test_repo();
        for _ in 0..20 {
            repo.create().unwrap();
        }

        let views = repo.list().unwrap();
        let mut ids: Vec<_> = views.iter().map(|v| v.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_start_then_pause_banks_elapsed_time() {
        let (mut repo, clock) = test_repo();
        let id = repo.create().unwrap()[0].id.clone();

        repo.start(&id).unwrap();
        clock.advance_secs(2);
        let views = repo.pause(&id).unwrap();

        assert!(!views[0].is_running);
        assert_eq!(views[0].effective_seconds, 2.0);
    }

    #[test]
    fn test_running_timer_accrues_at_read_time() {
        let (mut repo, clock) = test_repo();
        let id = repo.create().unwrap()[0].id.clone();

        repo.start(&id).unwrap();
        clock.advance_secs(5);
        let views = repo.list().unwrap();
        assert!(views[0].is_running);
        assert_eq!(views[0].effective_seconds, 5.0);

        // Nothing banked yet, only the in-progress interval
        clock.advance_secs(5);
        assert_eq!(repo.list().unwrap()[0].effective_seconds, 10.0);
    }

    #[test]
    fn test_repeated_cycles_sum_intervals() {
        let (mut repo, clock) = test_repo();
        let id = repo.create().unwrap()[0].id.clone();

        for _ in 0..3 {
            repo.start(&id).unwrap();
            clock.advance_secs(4);
            repo.pause(&id).unwrap();
            clock.advance_secs(100);
        }

        assert_eq!(repo.list().unwrap()[0].effective_seconds, 12.0);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let (mut repo, clock) = test_repo();
        let id = repo.create().unwrap()[0].id.clone();

        repo.start(&id).unwrap();
        clock.advance_secs(3);
        repo.pause(&id).unwrap();

        clock.advance_secs(60);
        let views = repo.pause(&id).unwrap();
        assert_eq!(views[0].effective_seconds, 3.0);
        assert!(!views[0].is_running);
    }

    #[test]
    fn test_start_while_running_keeps_interval_start() {
        let (mut repo, clock) = test_repo();
        let id = repo.create().unwrap()[0].id.clone();

        repo.start(&id).unwrap();
        clock.advance_secs(5);
        // A second start must not discard the 5 unbanked seconds
        repo.start(&id).unwrap();
        clock.advance_secs(2);

        let views = repo.pause(&id).unwrap();
        assert_eq!(views[0].effective_seconds, 7.0);
    }

    #[test]
    fn test_reset_zeroes_state_from_either_state() {
        let (mut repo, clock) = test_repo();
        let id = repo.create().unwrap()[0].id.clone();

        repo.start(&id).unwrap();
        clock.advance_secs(30);
        let views = repo.reset(&id).unwrap();
        assert!(!views[0].is_running);
        assert_eq!(views[0].effective_seconds, 0.0);

        // And again from paused with banked time
        repo.update_duration(&id, 500.0).unwrap();
        let views = repo.reset(&id).unwrap();
        assert_eq!(views[0].effective_seconds, 0.0);
    }

    #[test]
    fn test_update_duration_keeps_running_accrual() {
        let (mut repo, clock) = test_repo();
        let id = repo.create().unwrap()[0].id.clone();

        repo.start(&id).unwrap();
        clock.advance_secs(10);
        // Editing the time while running rebases the banked part only
        repo.update_duration(&id, 3600.0).unwrap();
        clock.advance_secs(2);

        let views = repo.pause(&id).unwrap();
        assert_eq!(views[0].effective_seconds, 3612.0);
    }

    #[test]
    fn test_rename_notes_and_toggle() {
        let (mut repo, _clock) = test_repo();
        let id = repo.create().unwrap()[0].id.clone();

        let views = repo.update_name(&id, "Deep work").unwrap();
        assert_eq!(views[0].name, "Deep work");

        let views = repo.update_name(&id, "").unwrap();
        assert_eq!(views[0].name, "");

        let views = repo.update_notes(&id, "standup overran").unwrap();
        assert_eq!(views[0].notes, "standup overran");

        let views = repo.toggle_expanded(&id).unwrap();
        assert!(views[0].is_expanded);
        let views = repo.toggle_expanded(&id).unwrap();
        assert!(!views[0].is_expanded);
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let (mut repo, _clock) = test_repo();
        repo.create().unwrap();

        for result in [
            repo.start("nope"),
            repo.pause("nope"),
            repo.reset("nope"),
            repo.update_name("nope", "x"),
            repo.update_notes("nope", "x"),
            repo.toggle_expanded("nope"),
            repo.update_duration("nope", 1.0),
        ] {
            assert!(matches!(result, Err(TickError::TimerNotFound { .. })));
        }
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let (mut repo, _clock) = test_repo();
        repo.create().unwrap();
        repo.create().unwrap();
        let views = repo.create().unwrap();
        let ids: Vec<_> = views.iter().map(|v| v.id.clone()).collect();

        let views = repo.delete(&ids[1]).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].id, ids[0]);
        assert_eq!(views[1].id, ids[2]);

        // Unknown id: nothing removed, no error
        let views = repo.delete("nope").unwrap();
        assert_eq!(views.len(), 2);
    }

    #[test]
    fn test_swap_is_a_permutation() {
        let (mut repo, _clock) = test_repo();
        repo.create().unwrap();
        repo.create().unwrap();
        let before = repo.create().unwrap();

        let after = repo.swap(0, 2).unwrap();
        assert_eq!(after[0].id, before[2].id);
        assert_eq!(after[1].id, before[1].id);
        assert_eq!(after[2].id, before[0].id);

        // Same multiset of ids
        let mut sorted_before: Vec<_> = before.iter().map(|v| v.id.clone()).collect();
        let mut sorted_after: Vec<_> = after.iter().map(|v| v.id.clone()).collect();
        sorted_before.sort();
        sorted_after.sort();
        assert_eq!(sorted_before, sorted_after);
    }

    #[test]
    fn test_swap_bounds_checked() {
        let (mut repo, _clock) = test_repo();
        repo.create().unwrap();

        let result = repo.swap(0, 3);
        assert!(matches!(
            result,
            Err(TickError::IndexOutOfRange { index: 3, len: 1 })
        ));

        // Collection untouched by the rejected swap
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn test_total_tracks_every_operation() {
        let (mut repo, clock) = test_repo();
        let first = repo.create().unwrap()[0].id.clone();
        assert_eq!(repo.total_seconds(), 0.0);

        repo.start(&first).unwrap();
        clock.advance_secs(2);
        repo.pause(&first).unwrap();
        assert_eq!(repo.total_seconds(), 2.0);

        let views = repo.create().unwrap();
        let second = views[1].id.clone();
        repo.update_duration(&second, 3600.0).unwrap();
        assert_eq!(repo.total_seconds(), 3602.0);

        repo.delete(&first).unwrap();
        assert_eq!(repo.total_seconds(), 3600.0);

        repo.reset(&second).unwrap();
        assert_eq!(repo.total_seconds(), 0.0);
    }

    #[test]
    fn test_total_includes_running_interval() {
        let (mut repo, clock) = test_repo();
        let id = repo.create().unwrap()[0].id.clone();

        repo.start(&id).unwrap();
        clock.advance_secs(7);
        let views = repo.list().unwrap();

        let sum: f64 = views.iter().map(|v| v.effective_seconds).sum();
        assert_eq!(repo.total_seconds(), sum);
        assert_eq!(sum, 7.0);
    }

    #[test]
    fn test_malformed_blob_resets_to_empty() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        let config = Config::with_data_dir(std::path::PathBuf::from("."));
        let mut store = MemoryStore::new();
        store.set(TIMERS_KEY, "this is not json").unwrap();

        let mut repo = TimerRepository::new(store, clock, &config);
        assert!(repo.list().unwrap().is_empty());

        // The next mutation writes a clean collection
        let views = repo.create().unwrap();
        assert_eq!(views[0].name, "Timer 1");
    }

    #[test]
    fn test_legacy_records_without_notes_still_parse() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        let config = Config::with_data_dir(std::path::PathBuf::from("."));
        let mut store = MemoryStore::new();
        // Blob from before notes/is_expanded existed
        store
            .set(
                TIMERS_KEY,
                r#"[{"id":"abcd1234","name":"Timer 1","duration":90.0,"started_at":null}]"#,
            )
            .unwrap();

        let mut repo = TimerRepository::new(store, clock, &config);
        let views = repo.list().unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].effective_seconds, 90.0);
        assert_eq!(views[0].notes, "");
        assert!(!views[0].is_expanded);
    }

    #[test]
    fn test_state_survives_reload_through_store() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        let config = Config::with_data_dir(std::path::PathBuf::from("."));
        let mut repo = TimerRepository::new(MemoryStore::new(), clock.clone(), &config);

        let id = repo.create().unwrap()[0].id.clone();
        repo.start(&id).unwrap();
        clock.advance_secs(4);

        // A second repository over the same store sees the running timer
        let store = repo.store;
        let mut reopened = TimerRepository::new(store, clock, &config);
        let views = reopened.list().unwrap();
        assert!(views[0].is_running);
        assert_eq!(views[0].effective_seconds, 4.0);
    }
}

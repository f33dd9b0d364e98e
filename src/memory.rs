use crate::{EntryId, EntryLevelData, Logbook, Severity};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Row returned by [`InMemoryLogbook::entries`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShortEntry {
    pub id: EntryId,
    pub time_millis: u64,
    pub level: Severity,
    pub title: String,
}

/// Row returned by [`InMemoryLogbook::details`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FullEntry {
    pub id: EntryId,
    pub time_millis: u64,
    pub level: Severity,
    pub title: String,
    pub details: String,
}

struct Entry {
    time_millis: u64,
    data: EntryLevelData,
}

/// Backend keeping entries in a mutex-guarded list.
///
/// The reference implementation of the [`Logbook`] contract: entry ids are
/// list indices, every operation serializes on one coarse lock, and nothing
/// waits on I/O while the lock is held. Suited for tests and for short-lived
/// in-app log viewers, not as a telemetry pipeline.
pub struct InMemoryLogbook {
    threshold: Severity,
    entries: Mutex<Vec<Entry>>,
}

impl InMemoryLogbook {
    /// Creates a backend admitting entries at `threshold` and above.
    pub fn new(threshold: Severity) -> InMemoryLogbook {
        InMemoryLogbook {
            threshold,
            entries: Mutex::new(Vec::new()),
        }
    }

    // A poisoned lock only means another writer panicked mid-append; the
    // list itself is still a valid Vec, so keep serving it.
    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all kept entries, most recent first.
    pub fn entries(&self) -> Vec<ShortEntry> {
        self.lock()
            .iter()
            .enumerate()
            .rev()
            .map(|(index, entry)| ShortEntry {
                id: EntryId::from_index(index),
                time_millis: entry.time_millis,
                level: entry.data.level,
                title: entry.data.title.clone(),
            })
            .collect()
    }

    /// Full record of one entry, or `None` for unknown ids.
    pub fn details(&self, id: EntryId) -> Option<FullEntry> {
        let index = id.index()?;
        self.lock().get(index).map(|entry| FullEntry {
            id,
            time_millis: entry.time_millis,
            level: entry.data.level,
            title: entry.data.title.clone(),
            details: entry.data.details.clone(),
        })
    }

    /// Empties the backing list.
    ///
    /// Outstanding [`EntryId`]s dangle after this; updates keyed by them are
    /// silently dropped.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Logbook for InMemoryLogbook {
    fn check_level(&self, level: Severity) -> bool {
        level >= self.threshold
    }

    fn log(&self, level: Severity, title: &str, details: &str) {
        self.log_instant(level, title, details);
    }

    fn log_instant(&self, level: Severity, title: &str, details: &str) -> EntryId {
        if !self.check_level(level) {
            return EntryId::NONE;
        }
        let entry = Entry {
            time_millis: now_millis(),
            data: EntryLevelData {
                level,
                title: title.to_owned(),
                details: details.to_owned(),
            },
        };
        let mut entries = self.lock();
        let id = EntryId::from_index(entries.len());
        entries.push(entry);
        id
    }

    fn update_log_instant(&self, id: EntryId, update: &dyn Fn(EntryLevelData) -> EntryLevelData) {
        let Some(index) = id.index() else {
            return;
        };
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(index) {
            entry.data = update(entry.data.clone());
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admitted_write_is_visible() {
        let logbook = InMemoryLogbook::new(Severity::Debug);

        logbook.log(Severity::Debug, "title", "details");

        let entries = logbook.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Severity::Debug);
        assert_eq!(entries[0].title, "title");
        let entry = logbook.details(entries[0].id).unwrap();
        assert_eq!(entry.details, "details");
    }

    #[test]
    fn write_below_threshold_is_suppressed() {
        let logbook = InMemoryLogbook::new(Severity::Debug);

        assert!(!logbook.check_level(Severity::Verbose));
        logbook.log(Severity::Verbose, "title", "details");

        assert!(logbook.entries().is_empty());
    }

    #[test]
    fn log_instant_returns_sentinel_below_threshold() {
        // The concrete scenario: threshold DEBUG, a VERBOSE write yields the
        // sentinel and no entry, the next DEBUG write gets id 0.
        let logbook = InMemoryLogbook::new(Severity::Debug);

        let suppressed = logbook.log_instant(Severity::Verbose, "t", "d");
        assert!(suppressed.is_none());
        assert!(logbook.entries().is_empty());

        let id = logbook.log_instant(Severity::Debug, "t", "d");
        assert_eq!(id, EntryId::from_index(0));
        let entries = logbook.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Severity::Debug);
        assert_eq!(entries[0].title, "t");
        assert_eq!(logbook.details(id).unwrap().details, "d");
    }

    #[test]
    fn update_rewrites_the_entry_in_place() {
        let logbook = InMemoryLogbook::new(Severity::Debug);
        let id = logbook.log_instant(Severity::Debug, "title", "details");

        logbook.update_log_instant(id, &|entry| EntryLevelData {
            level: Severity::Warn,
            title: format!("updated {}", entry.title),
            details: format!("updated {}", entry.details),
        });

        let entry = logbook.details(id).unwrap();
        assert_eq!(entry.level, Severity::Warn);
        assert_eq!(entry.title, "updated title");
        assert_eq!(entry.details, "updated details");
    }

    #[test]
    fn update_with_sentinel_is_ignored() {
        let logbook = InMemoryLogbook::new(Severity::Debug);
        let id = logbook.log_instant(Severity::Verbose, "title", "details");

        logbook.update_log_instant(id, &|entry| EntryLevelData {
            level: Severity::Warn,
            ..entry
        });

        assert!(logbook.entries().is_empty());
    }

    #[test]
    fn update_with_unknown_id_is_ignored() {
        let logbook = InMemoryLogbook::new(Severity::Debug);
        logbook.log_instant(Severity::Debug, "t", "d");

        logbook.update_log_instant(EntryId::from_index(17), &|entry| EntryLevelData {
            title: "changed".to_string(),
            ..entry
        });

        assert_eq!(logbook.details(EntryId::from_index(0)).unwrap().title, "t");
    }

    #[test]
    fn admitted_entry_stays_visible_after_downgrade() {
        let logbook = InMemoryLogbook::new(Severity::Warn);
        let id = logbook.log_instant(Severity::Warn, "t", "d");

        logbook.update_log_instant(id, &|entry| EntryLevelData {
            level: Severity::Verbose,
            ..entry
        });

        let entries = logbook.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Severity::Verbose);
    }

    #[test]
    fn entries_are_most_recent_first() {
        let logbook = InMemoryLogbook::new(Severity::Debug);
        logbook.log_instant(Severity::Debug, "first", "d");
        logbook.log_instant(Severity::Debug, "second", "d");

        let entries = logbook.entries();
        assert_eq!(entries[0].title, "second");
        assert_eq!(entries[1].title, "first");
    }

    #[test]
    fn clear_empties_the_list_and_dangles_ids() {
        let logbook = InMemoryLogbook::new(Severity::Debug);
        let id = logbook.log_instant(Severity::Debug, "title", "details");
        assert_eq!(logbook.entries().len(), 1);

        logbook.clear();

        assert!(logbook.entries().is_empty());
        assert_eq!(logbook.details(id), None);
        // Updates keyed by a dangling id must not panic.
        logbook.update_log_instant(id, &|entry| entry);
    }
}

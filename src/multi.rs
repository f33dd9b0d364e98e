use crate::{EntryId, EntryLevelData, Logbook, Severity};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Fan-out backend composing several children into one.
///
/// Admission is the broadest of the children: a message kept by even one
/// destination counts as kept. Instant writes are forwarded to every child
/// unconditionally (each applies its own threshold); the per-child ids are
/// remembered so later updates reach exactly the children that accepted the
/// original write, each under its own id. The id map is append-only.
pub struct MultiLogbook {
    children: Vec<Box<dyn Logbook + Send + Sync>>,
    instant_ids: Mutex<Vec<Vec<EntryId>>>,
}

impl MultiLogbook {
    /// Creates a composite over `children`, kept in the given order.
    pub fn new(children: Vec<Box<dyn Logbook + Send + Sync>>) -> MultiLogbook {
        MultiLogbook {
            children,
            instant_ids: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<EntryId>>> {
        self.instant_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Logbook for MultiLogbook {
    fn check_level(&self, level: Severity) -> bool {
        self.children.iter().any(|child| child.check_level(level))
    }

    fn log(&self, level: Severity, title: &str, details: &str) {
        for child in &self.children {
            child.log(level, title, details);
        }
    }

    fn log_instant(&self, level: Severity, title: &str, details: &str) -> EntryId {
        let ids: Vec<EntryId> = self
            .children
            .iter()
            .map(|child| child.log_instant(level, title, details))
            .collect();
        if ids.iter().all(|id| id.is_none()) {
            return EntryId::NONE;
        }
        let mut records = self.lock();
        let id = EntryId::from_index(records.len());
        records.push(ids);
        id
    }

    fn update_log_instant(&self, id: EntryId, update: &dyn Fn(EntryLevelData) -> EntryLevelData) {
        let Some(index) = id.index() else {
            return;
        };
        // Clone the record so no child runs while the map is locked.
        let ids = match self.lock().get(index) {
            Some(ids) => ids.clone(),
            None => return,
        };
        for (child, child_id) in self.children.iter().zip(ids) {
            if child_id.is_some() {
                child.update_log_instant(child_id, update);
            }
        }
    }
}

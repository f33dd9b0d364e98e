use crate::{EntryId, EntryLevelData, Logbook, Severity};

/// Backend that keeps nothing.
///
/// `check_level` is always false, so callers skip message construction
/// entirely; suppressed writes return the sentinel and updates are no-ops.
/// This is the default for states where no real backend has been configured,
/// guaranteeing zero cost and zero storage pressure.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogbook;

impl Logbook for NoopLogbook {
    fn check_level(&self, _level: Severity) -> bool {
        false
    }

    fn log(&self, _level: Severity, _title: &str, _details: &str) {}

    fn log_instant(&self, _level: Severity, _title: &str, _details: &str) -> EntryId {
        EntryId::NONE
    }

    fn update_log_instant(&self, _id: EntryId, _update: &dyn Fn(EntryLevelData) -> EntryLevelData) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_is_suppressed() {
        let logbook = NoopLogbook;

        assert!(!logbook.check_level(Severity::Assert));
        logbook.log(Severity::Assert, "title", "details");
        let id = logbook.log_instant(Severity::Assert, "title", "details");
        assert_eq!(id, EntryId::NONE);
        logbook.update_log_instant(id, &|entry| entry);
    }
}

use crate::{EntryId, Severity};
use std::error::Error;
use std::sync::Arc;

/// A recorded line, minus its level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryData {
    pub title: String,
    pub details: String,
}

/// The mutable portion of a recorded entry, as seen by update closures.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryLevelData {
    pub level: Severity,
    pub title: String,
    pub details: String,
}

/// Capability contract shared by every backend.
///
/// Backends are internally synchronized; all methods take `&self` and may be
/// called from any thread. Components that want to log receive a `Logbook`
/// value through their constructor; a single composition point (application
/// start-up) picks the concrete backend, with [`NoopLogbook`] as the safe
/// default for uninitialized states.
///
/// [`NoopLogbook`]: crate::NoopLogbook
pub trait Logbook {
    /// Admission predicate: would an entry at `level` be kept?
    ///
    /// Pure and side-effect-free. Callers use it to skip expensive message
    /// construction; see also the lazy helpers on [`LogbookExt`].
    fn check_level(&self, level: Severity) -> bool;

    /// Fire-and-forget write, recorded only if [`check_level`] passes.
    ///
    /// [`check_level`]: Logbook::check_level
    fn log(&self, level: Severity, title: &str, details: &str);

    /// Write now, enrich later.
    ///
    /// Same admission rule as [`log`], but returns a handle for later
    /// mutation: [`EntryId::NONE`] when the write was suppressed, a fresh id
    /// otherwise. This is the primitive behind patterns like logging an HTTP
    /// request before its response is known.
    ///
    /// [`log`]: Logbook::log
    fn log_instant(&self, level: Severity, title: &str, details: &str) -> EntryId;

    /// Read-modify-write of the entry at `id`.
    ///
    /// Sentinel, unknown and dangling ids are ignored without error. The
    /// admission decision is not re-evaluated: an admitted entry stays
    /// visible even if `update` lowers its level below the threshold.
    fn update_log_instant(&self, id: EntryId, update: &dyn Fn(EntryLevelData) -> EntryLevelData);
}

impl<L: Logbook + ?Sized> Logbook for &L {
    fn check_level(&self, level: Severity) -> bool {
        (**self).check_level(level)
    }

    fn log(&self, level: Severity, title: &str, details: &str) {
        (**self).log(level, title, details)
    }

    fn log_instant(&self, level: Severity, title: &str, details: &str) -> EntryId {
        (**self).log_instant(level, title, details)
    }

    fn update_log_instant(&self, id: EntryId, update: &dyn Fn(EntryLevelData) -> EntryLevelData) {
        (**self).update_log_instant(id, update)
    }
}

impl<L: Logbook + ?Sized> Logbook for Box<L> {
    fn check_level(&self, level: Severity) -> bool {
        (**self).check_level(level)
    }

    fn log(&self, level: Severity, title: &str, details: &str) {
        (**self).log(level, title, details)
    }

    fn log_instant(&self, level: Severity, title: &str, details: &str) -> EntryId {
        (**self).log_instant(level, title, details)
    }

    fn update_log_instant(&self, id: EntryId, update: &dyn Fn(EntryLevelData) -> EntryLevelData) {
        (**self).update_log_instant(id, update)
    }
}

impl<L: Logbook + ?Sized> Logbook for Arc<L> {
    fn check_level(&self, level: Severity) -> bool {
        (**self).check_level(level)
    }

    fn log(&self, level: Severity, title: &str, details: &str) {
        (**self).log(level, title, details)
    }

    fn log_instant(&self, level: Severity, title: &str, details: &str) -> EntryId {
        (**self).log_instant(level, title, details)
    }

    fn update_log_instant(&self, id: EntryId, update: &dyn Fn(EntryLevelData) -> EntryLevelData) {
        (**self).update_log_instant(id, update)
    }
}

/// Convenience layer over the four [`Logbook`] primitives.
///
/// Pure composition, no new state; blanket-implemented for every backend.
/// The lazy variants invoke their producers at most once, and only when the
/// level check passes.
pub trait LogbookExt: Logbook {
    /// Eager title-only write; the title doubles as the details.
    fn log_message(&self, level: Severity, title: &str) {
        self.log(level, title, title);
    }

    /// Lazy title-only write.
    fn log_title<F>(&self, level: Severity, title: F)
    where
        F: FnOnce() -> String,
    {
        if self.check_level(level) {
            let title = title();
            self.log(level, &title, &title);
        }
    }

    /// Lazy write with separate title and details producers.
    fn log_lazy<T, D>(&self, level: Severity, title: T, details: D)
    where
        T: FnOnce() -> String,
        D: FnOnce() -> String,
    {
        if self.check_level(level) {
            self.log(level, &title(), &details());
        }
    }

    /// Lazy write producing both fields at once.
    fn log_entry<F>(&self, level: Severity, entry: F)
    where
        F: FnOnce() -> EntryData,
    {
        if self.check_level(level) {
            let entry = entry();
            self.log(level, &entry.title, &entry.details);
        }
    }

    /// Records `error` with its full source chain as the details.
    fn log_error(&self, level: Severity, title: &str, error: &(dyn Error + 'static)) {
        if self.check_level(level) {
            self.log(level, title, &error_trace(error));
        }
    }

    /// Runs `op`, recording a single entry if it fails.
    ///
    /// The operation runs exactly once either way and its error is returned
    /// unchanged; logging never replaces or suppresses the failure.
    fn log_failure<T, E, F>(&self, level: Severity, op: F) -> Result<T, E>
    where
        E: Error + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        if !self.check_level(level) {
            return op();
        }
        match op() {
            Ok(value) => Ok(value),
            Err(error) => {
                self.log(level, &error.to_string(), &error_trace(&error));
                Err(error)
            }
        }
    }

    /// [`update_log_instant`] shorthand replacing only the level.
    ///
    /// [`update_log_instant`]: Logbook::update_log_instant
    fn set_severity_instant(&self, id: EntryId, level: Severity) {
        self.update_log_instant(id, &move |entry| EntryLevelData { level, ..entry });
    }

    /// [`update_log_instant`] shorthand concatenating onto the details.
    ///
    /// [`update_log_instant`]: Logbook::update_log_instant
    fn append_log_instant(&self, id: EntryId, more_details: &str) {
        self.update_log_instant(id, &|entry| EntryLevelData {
            details: entry.details + more_details,
            ..entry
        });
    }
}

impl<L: Logbook + ?Sized> LogbookExt for L {}

/// Renders an error and its source chain, this crate's stand-in for a stack
/// trace.
pub fn error_trace(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str("\nCaused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

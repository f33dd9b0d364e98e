/// Opaque handle to an entry previously written with
/// [`Logbook::log_instant`](crate::Logbook::log_instant).
///
/// Handles are unique per backend and stable for the lifetime of the entry.
/// A suppressed write yields [`EntryId::NONE`]; every mutation keyed by that
/// sentinel is silently dropped.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct EntryId(i64);

impl EntryId {
    /// The sentinel signaling that no entry was written.
    pub const NONE: EntryId = EntryId(-1);

    pub(crate) const fn from_index(index: usize) -> EntryId {
        EntryId(index as i64)
    }

    pub(crate) fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    /// True if this handle refers to no entry.
    pub const fn is_none(self) -> bool {
        self.0 < 0
    }

    /// True if this handle was issued for an admitted write.
    pub const fn is_some(self) -> bool {
        !self.is_none()
    }
}

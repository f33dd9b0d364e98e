use std::fmt;

/// Severity of a single entry, on the ascending numeric scale used by the
/// Android platform logger.
///
/// Larger values are more severe. The admission rule everywhere in this
/// crate is `level >= threshold` over this ordering.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Severity {
    Verbose = 2,
    Debug = 3,
    Info = 4,
    Warn = 5,
    Error = 6,
    /// "What a Terrible Failure", the top of the scale.
    Assert = 7,
}

impl Severity {
    /// Numeric value of this level.
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Inverse of [`as_i32`](Self::as_i32), for values coming from a
    /// platform convention.
    pub const fn from_i32(value: i32) -> Option<Severity> {
        match value {
            2 => Some(Severity::Verbose),
            3 => Some(Severity::Debug),
            4 => Some(Severity::Info),
            5 => Some(Severity::Warn),
            6 => Some(Severity::Error),
            7 => Some(Severity::Assert),
            _ => None,
        }
    }
}

/// Error of the [`Severity`] `TryFrom<i32>` conversion, for values outside
/// `2..=7`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidSeverity(pub i32);

impl fmt::Display for InvalidSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a severity value: {}", self.0)
    }
}

impl std::error::Error for InvalidSeverity {}

impl TryFrom<i32> for Severity {
    type Error = InvalidSeverity;

    fn try_from(value: i32) -> Result<Severity, InvalidSeverity> {
        Severity::from_i32(value).ok_or(InvalidSeverity(value))
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Severity {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warn,
            log::Level::Info => Severity::Info,
            log::Level::Debug => Severity::Debug,
            log::Level::Trace => Severity::Verbose,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Verbose => "VERBOSE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Assert => "ASSERT",
        })
    }
}

use crate::FormatFn;
use log::{LevelFilter, Record};
use std::fmt;

/// Configuration for the `log` facade bridge.
#[derive(Default)]
pub struct Config {
    pub(crate) max_level: Option<LevelFilter>,
    pub(crate) filter: Option<env_filter::Filter>,
    pub(crate) tag: Option<String>,
    pub(crate) custom_format: Option<FormatFn>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("max_level", &self.max_level)
            .field("filter", &self.filter)
            .field("tag", &self.tag)
            .field(
                "custom_format",
                match &self.custom_format {
                    Some(_) => &"Some(_)",
                    None => &"None",
                },
            )
            .finish()
    }
}

impl Config {
    /// Changes the maximum log level forwarded through the facade.
    ///
    /// Note, that `Trace` is the maximum level, because it provides the
    /// maximum amount of detail in the emitted logs. If `Off` level is
    /// provided, then nothing is logged at all.
    ///
    /// This only caps what the `log` macros hand over; the configured
    /// logbook still applies its own threshold to every record.
    pub fn with_max_level(mut self, level: LevelFilter) -> Self {
        self.max_level = Some(level);
        self
    }

    pub(crate) fn filter_matches(&self, record: &Record) -> bool {
        if let Some(ref filter) = self.filter {
            filter.matches(record)
        } else {
            true
        }
    }

    pub fn with_filter(mut self, filter: env_filter::Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Entry title prefix used instead of the record target.
    pub fn with_tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets the format function used to render a record into entry details.
    /// ```
    /// # use logbook::{Config, InMemoryLogbook, Severity};
    /// # use std::sync::Arc;
    /// logbook::init_once(
    ///     Arc::new(InMemoryLogbook::new(Severity::Debug)),
    ///     Config::default()
    ///         .with_max_level(log::LevelFilter::Trace)
    ///         .format(|record| format!("my_app: {}", record.args())),
    /// )
    /// ```
    pub fn format<F>(mut self, format: F) -> Self
    where
        F: Fn(&Record) -> String + Sync + Send + 'static,
    {
        self.custom_format = Some(Box::new(format));
        self
    }
}

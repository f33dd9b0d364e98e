// Copyright 2019 The logbook Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! An embeddable leveled log-entry store with update-by-id.
//!
//! Entries carry a [`Severity`], a short title and long-form details, and are
//! kept by a [`Logbook`] backend: [`InMemoryLogbook`] for real storage,
//! [`NoopLogbook`] for the unconfigured state, [`MultiLogbook`] to fan out to
//! several destinations at once. [`Logbook::log_instant`] returns an
//! [`EntryId`] so an entry can be enriched after the fact, which is what
//! [`HttpInterceptor`] does around an HTTP call: log the request as a curl
//! transcript first, patch in the outcome once the response (or failure)
//! arrives.
//!
//! ## Example
//!
//! ```
//! use logbook::{InMemoryLogbook, Logbook, LogbookExt, Severity};
//!
//! let logbook = InMemoryLogbook::new(Severity::Debug);
//!
//! logbook.log(Severity::Info, "startup", "cache warmed in 12ms");
//!
//! let id = logbook.log_instant(Severity::Info, "sync started", "pending\n");
//! // ... later, once the outcome is known:
//! logbook.set_severity_instant(id, Severity::Warn);
//! logbook.append_log_instant(id, "retried twice\n");
//! ```
//!
//! ## Example with the `log` facade
//!
//! Records emitted through the `log` macros can be captured into a backend.
//! Components should still prefer receiving a [`Logbook`] value directly;
//! `init_once` is the single composition point for code that only speaks
//! `log`:
//!
//! ```
//! use logbook::{Config, InMemoryLogbook, Logbook, Severity};
//! use std::sync::Arc;
//!
//! let logbook: Arc<dyn Logbook + Send + Sync> =
//!     Arc::new(InMemoryLogbook::new(Severity::Debug));
//! logbook::init_once(Arc::clone(&logbook), Config::default().with_tag("my_app"));
//!
//! log::warn!("disk almost full");
//! ```

use log::{Log, Metadata, Record};
use std::fmt;
use std::sync::{Arc, OnceLock};

pub use config::Config;
pub use curl::to_curl;
pub use env_filter::{Builder as FilterBuilder, Filter};
pub use id::EntryId;
pub use interceptor::{HttpInterceptor, Transport, DEFAULT_BODY_LIMIT};
pub use logbook::{error_trace, EntryData, EntryLevelData, Logbook, LogbookExt};
pub use memory::{FullEntry, InMemoryLogbook, ShortEntry};
pub use multi::MultiLogbook;
pub use noop::NoopLogbook;
pub use severity::{InvalidSeverity, Severity};

pub(crate) type FormatFn = Box<dyn Fn(&Record) -> String + Sync + Send>;

mod config;
mod curl;
mod id;
mod interceptor;
mod logbook;
mod memory;
mod multi;
mod noop;
mod severity;

// Longer titles are truncated; details keep the full text.
const TITLE_MAX_LEN: usize = 100;

/// Forwards `log` facade records into a [`Logbook`] backend.
pub struct LogbookLogger {
    logbook: Arc<dyn Logbook + Send + Sync>,
    config: OnceLock<Config>,
}

impl Default for LogbookLogger {
    fn default() -> LogbookLogger {
        LogbookLogger {
            logbook: Arc::new(NoopLogbook),
            config: OnceLock::new(),
        }
    }
}

impl fmt::Debug for LogbookLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogbookLogger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LogbookLogger {
    /// Create new logger instance over a backend.
    pub fn new(logbook: Arc<dyn Logbook + Send + Sync>, config: Config) -> LogbookLogger {
        LogbookLogger {
            logbook,
            config: OnceLock::from(config),
        }
    }

    /// The backend this logger writes to, for composing it elsewhere (for
    /// example handing the same logbook to an [`HttpInterceptor`]).
    pub fn logbook(&self) -> Arc<dyn Logbook + Send + Sync> {
        Arc::clone(&self.logbook)
    }

    fn config(&self) -> &Config {
        self.config.get_or_init(Config::default)
    }
}

impl Log for LogbookLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.logbook.check_level(Severity::from(metadata.level()))
    }

    fn log(&self, record: &Record) {
        let config = self.config();

        if !self.enabled(record.metadata()) {
            return;
        }

        // this also checks the level, but only if a filter was
        // installed.
        if !config.filter_matches(record) {
            return;
        }

        let level = Severity::from(record.level());
        let message = record.args().to_string();

        // If no tag was specified, use the record target.
        let tag = config.tag.as_deref().unwrap_or_else(|| record.target());
        let first_line = message.lines().next().unwrap_or_default();
        let title = format!("{tag}: {first_line}");
        let title = limit(&title, TITLE_MAX_LEN);

        let details = match &config.custom_format {
            Some(format) => format(record),
            None => {
                let mut details = message.clone();
                if let Some(module_path) = record.module_path() {
                    details.push_str("\n\nmodule: ");
                    details.push_str(module_path);
                }
                if let (Some(file), Some(line)) = (record.file(), record.line()) {
                    details.push_str(&format!("\nlocation: {file}:{line}"));
                }
                details
            }
        };

        self.logbook.log(level, title, &details);
    }

    fn flush(&self) {}
}

// Truncates on a char boundary at or below `max_bytes`.
fn limit(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

static LOGBOOK_LOGGER: OnceLock<LogbookLogger> = OnceLock::new();

/// Send a log record to the installed backend.
///
/// This action does not require initialization. However, without
/// initialization the record goes to the no-op backend and is dropped.
pub fn log(record: &Record) {
    LOGBOOK_LOGGER
        .get_or_init(LogbookLogger::default)
        .log(record)
}

/// Installs `logbook` behind the global `log` facade.
///
/// This can be called many times, but will only initialize logging once,
/// and will not replace any other previously initialized logger.
///
/// Sets [`log::max_level`] from the config's max level, the filter's level,
/// or `Trace` as the fallback, so the logbook's own threshold stays the
/// effective gate.
pub fn init_once(logbook: Arc<dyn Logbook + Send + Sync>, config: Config) {
    let max_level = config
        .max_level
        .or_else(|| config.filter.as_ref().map(|filter| filter.filter()))
        .unwrap_or(log::LevelFilter::Trace);
    let logger = LOGBOOK_LOGGER.get_or_init(|| LogbookLogger::new(logbook, config));

    if let Err(err) = log::set_logger(logger) {
        log::debug!("logbook: log::set_logger failed: {}", err);
    } else {
        log::set_max_level(max_level);
    }
}

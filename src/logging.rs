//! Log output for the job.
//!
//! Records are written as `<LEVEL> :: <message>`. The coordinator writes to stdout at
//! the configured level, every other rank only reports errors, on stderr.
use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

use crate::types::{Error, Rank, Result};

/// A logger for one process of the group.
#[derive(Debug)]
pub struct RankLogger {
    level: LevelFilter,
    coordinator: bool,
}

impl RankLogger {
    /// Create the logger of `rank`. Only `root` logs below the error level.
    pub fn new(rank: Rank, root: Rank, level: LevelFilter) -> Self {
        let coordinator = rank == root;
        Self {
            level: if coordinator {
                level
            } else {
                level.min(LevelFilter::Error)
            },
            coordinator,
        }
    }

    /// The most verbose level this logger emits.
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Render a record the way it is written.
    pub fn format(record: &Record) -> String {
        format!("{} :: {}", record.level(), record.args())
    }

    /// Install this logger as the global logger.
    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))
            .map_err(|e| Error::Initialisation(e.to_string()))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for RankLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = RankLogger::format(record);
        // Logging must never take the job down, write failures are dropped.
        if self.coordinator {
            let _ = writeln!(std::io::stdout().lock(), "{line}");
        } else {
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }
}

/// Install the logger of `rank` with the given verbosity.
pub fn init(rank: Rank, root: Rank, level: LevelFilter) -> Result<()> {
    RankLogger::new(rank, root, level).install()
}

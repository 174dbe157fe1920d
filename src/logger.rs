//! Logger.
//!
//! Colored, timestamped backend for the [`log`] facade. It writes to stderr, leaving stdout to the
//! shader output.

use chrono::{Datelike, Local, Timelike};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TermLogger {
  level: LevelFilter,
}

impl TermLogger {
  pub fn new(level: LevelFilter) -> Self {
    TermLogger { level }
  }
}

impl Log for TermLogger {
  fn enabled(&self, metadata: &Metadata) -> bool {
    metadata.level() <= self.level
  }

  fn log(&self, record: &Record) {
    if !self.enabled(record.metadata()) {
      return;
    }

    eprintln!("\x1b[90m{} {}> {}\x1b[0m", now(), color(record.level()), record.args());
  }

  fn flush(&self) {}
}

/// Install a [`TermLogger`] as the global logger.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
  log::set_boxed_logger(Box::new(TermLogger::new(level)))?;
  log::set_max_level(level);
  Ok(())
}

/// Verbosity level out of a count of `-v` flags.
pub fn level_from_verbosity(verbosity: u64) -> LevelFilter {
  match verbosity {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  }
}

fn color(level: Level) -> &'static str {
  match level {
    Level::Error => "\x1b[1;31m",
    Level::Warn => "\x1b[33m",
    Level::Info => "\x1b[34m",
    Level::Debug => "\x1b[36m",
    Level::Trace => "\x1b[90m",
  }
}

pub fn now() -> String {
  let t = Local::now();

  format!(
    "{month:0>2}/{day:0>2}/{year} {hour:0>2}:{min:0>2}:{secs:0>2}:{nsecs:0>9}",
    month = t.month(),
    day = t.day(),
    year = t.year(),
    hour = t.hour(),
    min = t.minute(),
    secs = t.second(),
    nsecs = t.nanosecond()
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn verbosity_levels() {
    assert_eq!(level_from_verbosity(0), LevelFilter::Warn);
    assert_eq!(level_from_verbosity(2), LevelFilter::Debug);
    assert_eq!(level_from_verbosity(7), LevelFilter::Trace);
  }

  #[test]
  fn filters_by_level() {
    let logger = TermLogger::new(LevelFilter::Info);

    assert!(logger.enabled(&Metadata::builder().level(Level::Error).build()));
    assert!(logger.enabled(&Metadata::builder().level(Level::Info).build()));
    assert!(!logger.enabled(&Metadata::builder().level(Level::Debug).build()));
  }

  #[test]
  fn timestamp_shape() {
    let t = now();

    // MM/DD/YYYY hh:mm:ss:nnnnnnnnn
    assert_eq!(t.len(), 29);
    assert_eq!(&t[2..3], "/");
    assert_eq!(&t[10..11], " ");
  }
}

//! Where shader sources are read from.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};

/// Class of types that can hand out shader sources by path.
///
/// Paths are plain strings: they come verbatim (after resource-root substitution) from the entry
/// point and from `#include` directives.
pub trait SourceLoader {
  fn open<'a>(&'a self, path: &str) -> io::Result<Box<dyn BufRead + 'a>>;
}

/// Read sources from the file system.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
  fn open<'a>(&'a self, path: &str) -> io::Result<Box<dyn BufRead + 'a>> {
    let fh = File::open(path)?;
    Ok(Box::new(BufReader::new(fh)))
  }
}

/// Serve sources from memory, keyed by path.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryLoader {
  files: HashMap<String, String>,
}

impl MemoryLoader {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a file, replacing any previous one at the same path.
  pub fn insert<P, S>(&mut self, path: P, source: S)
  where
    P: Into<String>,
    S: Into<String>,
  {
    self.files.insert(path.into(), source.into());
  }

  /// Builder flavor of [`MemoryLoader::insert`].
  pub fn with<P, S>(mut self, path: P, source: S) -> Self
  where
    P: Into<String>,
    S: Into<String>,
  {
    self.insert(path, source);
    self
  }
}

impl SourceLoader for MemoryLoader {
  fn open<'a>(&'a self, path: &str) -> io::Result<Box<dyn BufRead + 'a>> {
    match self.files.get(path) {
      Some(source) => Ok(Box::new(Cursor::new(source.as_bytes()))),
      None => Err(io::Error::new(io::ErrorKind::NotFound, format!("no such source: {}", path))),
    }
  }
}

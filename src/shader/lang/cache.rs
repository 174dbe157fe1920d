//! State shared by every parser of one include chain.

use std::collections::{HashMap, HashSet};

/// Include set and struct table of one top-level parse.
///
/// A cache is handed by `&mut` to the top-level parser and re-borrowed by every parser it spawns
/// for `#include`. It is never cleared behind your back: drop it or call [`ParseCache::clear`]
/// once the program it was built for is done. Two unrelated programs must not share a cache,
/// otherwise a file consumed for the first one is silently skipped for the second one.
#[derive(Clone, Debug, Default)]
pub struct ParseCache {
  // registration order, for dependency reporting
  includes: Vec<String>,
  included: HashSet<String>,
  structs: HashMap<String, Vec<String>>,
}

impl ParseCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a path; returns `false` if it was already there.
  ///
  /// This must happen before the file is opened so that self and cyclic includes are caught
  /// without reading the file again.
  pub fn register_include<P>(&mut self, path: P) -> bool
  where
    P: Into<String>,
  {
    let path = path.into();

    if self.included.contains(&path) {
      return false;
    }

    self.included.insert(path.clone());
    self.includes.push(path);
    true
  }

  pub fn is_included(&self, path: &str) -> bool {
    self.included.contains(path)
  }

  /// Every registered path, in registration order.
  pub fn includes(&self) -> impl Iterator<Item = &str> {
    self.includes.iter().map(String::as_str)
  }

  /// Store the ordered member paths of a struct. Last write wins.
  pub fn register_struct<N>(&mut self, name: N, members: Vec<String>)
  where
    N: Into<String>,
  {
    self.structs.insert(name.into(), members);
  }

  pub fn lookup_struct(&self, name: &str) -> Option<&[String]> {
    self.structs.get(name).map(Vec::as_slice)
  }

  pub fn clear(&mut self) {
    self.includes.clear();
    self.included.clear();
    self.structs.clear();
  }
}

//! Preprocessor configuration.
//!
//! Every field has a default, so a configuration file only needs to mention what it overrides:
//!
//! ```json
//! { "res_path": "/opt/engine/res" }
//! ```

use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::shader::lang::lines::DEFAULT_COMMENT_MARKER;

include!(concat!(env!("OUT_DIR"), "/res_path.rs"));

/// Token substituted by the resource root when it starts a path.
pub const DEFAULT_RES_PATH_TOKEN: &str = "ENGINE_RES_PATH";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Config {
  /// Single-line comment marker; everything after it is dropped before directives are read.
  pub comment_marker: String,
  /// Reserved path prefix standing for the engine resource root.
  pub res_path_token: String,
  /// Engine resource root.
  pub res_path: String,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      comment_marker: DEFAULT_COMMENT_MARKER.to_owned(),
      res_path_token: DEFAULT_RES_PATH_TOKEN.to_owned(),
      res_path: ENGINE_RES_PATH.to_owned(),
    }
  }
}

impl Config {
  pub fn from_json_file<P>(path: P) -> Result<Self, ConfigError>
  where
    P: AsRef<Path>,
  {
    let path = path.as_ref();
    let fh = File::open(path).map_err(|e| ConfigError::CannotOpen(path.to_owned(), e.to_string()))?;

    serde_json::from_reader(BufReader::new(fh)).map_err(|e| ConfigError::Malformed(path.to_owned(), e.to_string()))
  }

  /// Substitute the resource root for the reserved token if `path` starts with it.
  pub fn resolve(&self, path: &str) -> String {
    if self.res_path_token.is_empty() {
      return path.to_owned();
    }

    match path.strip_prefix(self.res_path_token.as_str()) {
      Some(rest) => format!("{}{}", self.res_path, rest),
      None => path.to_owned(),
    }
  }
}

/// Error that might occur while loading a configuration file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
  CannotOpen(PathBuf, String),
  Malformed(PathBuf, String),
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match self {
      ConfigError::CannotOpen(path, reason) => write!(f, "cannot open configuration {}: {}", path.display(), reason),
      ConfigError::Malformed(path, reason) => write!(f, "malformed configuration {}: {}", path.display(), reason),
    }
  }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(res_path: &str) -> Config {
    Config {
      res_path: res_path.to_owned(),
      ..Config::default()
    }
  }

  #[test]
  fn resolve_prefix_only() {
    let config = config("/opt/res");

    assert_eq!(config.resolve("ENGINE_RES_PATH/shaders/light.glsl"), "/opt/res/shaders/light.glsl");
    assert_eq!(config.resolve("shaders/ENGINE_RES_PATH.glsl"), "shaders/ENGINE_RES_PATH.glsl");
    assert_eq!(config.resolve("local.glsl"), "local.glsl");
  }

  #[test]
  fn empty_token_disables_substitution() {
    let config = Config {
      res_path_token: String::new(),
      ..config("/opt/res")
    };

    assert_eq!(config.resolve("ENGINE_RES_PATH/a.glsl"), "ENGINE_RES_PATH/a.glsl");
  }

  #[test]
  fn partial_json_keeps_defaults() {
    let config: Config = serde_json::from_str(r#"{ "res_path": "/srv/res" }"#).unwrap();

    assert_eq!(config.res_path, "/srv/res");
    assert_eq!(config.comment_marker, "//");
    assert_eq!(config.res_path_token, "ENGINE_RES_PATH");
  }

  #[test]
  fn missing_file() {
    match Config::from_json_file("/definitely/not/here.json") {
      Err(ConfigError::CannotOpen(..)) => (),
      r => panic!("unexpected result: {:?}", r),
    }
  }
}

//! Errors that might occur while resolving shader sources.

use std::error::Error;
use std::fmt;
use std::io;

/// Error that might occur while parsing a shader source tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
  /// A source file (entry point or include) couldn’t be opened.
  CannotOpen { path: String, reason: String },
  /// A source file couldn’t be read to its end.
  Io { path: String, line: usize, reason: String },
  /// A directive couldn’t be understood.
  Directive {
    path: String,
    line: usize,
    text: String,
    kind: DirectiveError,
  },
}

impl ParseError {
  pub(crate) fn cannot_open(path: &str, err: &io::Error) -> Self {
    ParseError::CannotOpen {
      path: path.to_owned(),
      reason: err.to_string(),
    }
  }

  /// File the error comes from.
  pub fn path(&self) -> &str {
    match self {
      ParseError::CannotOpen { path, .. } => path,
      ParseError::Io { path, .. } => path,
      ParseError::Directive { path, .. } => path,
    }
  }
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match self {
      ParseError::CannotOpen { path, reason } => write!(f, "cannot open shader source {}: {}", path, reason),

      ParseError::Io { path, line, reason } => write!(f, "cannot read {} after line {}: {}", path, line, reason),

      ParseError::Directive { path, line, text, kind } => {
        write!(f, "{}:{}: {} [LINE SOURCE]: {}", path, line, kind, text)
      }
    }
  }
}

impl Error for ParseError {}

/// Reason a directive was rejected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DirectiveError {
  /// `#shader` names a stage that doesn’t exist.
  UnknownStage(String),
  /// `#shader` without a stage name.
  MissingStage,
  /// `#include` without a path.
  MissingIncludePath,
  /// `uniform` not followed by a type and a name.
  MalformedUniform,
  /// `struct` without a name.
  MissingStructName,
  /// A struct-typed uniform array whose size isn’t a literal number.
  UnsizedStructArray(String),
  /// The input ended before the closing brace of a struct.
  UnterminatedStruct(String),
}

impl fmt::Display for DirectiveError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match self {
      DirectiveError::UnknownStage(name) => write!(f, "could not deduce shader type from “{}”.", name),
      DirectiveError::MissingStage => f.write_str("missing shader type."),
      DirectiveError::MissingIncludePath => f.write_str("missing include path."),
      DirectiveError::MalformedUniform => f.write_str("malformed uniform declaration."),
      DirectiveError::MissingStructName => f.write_str("missing struct name."),
      DirectiveError::UnsizedStructArray(name) => write!(f, "struct array {} needs a literal size.", name),
      DirectiveError::UnterminatedStruct(name) => write!(f, "struct {} is never closed.", name),
    }
  }
}

impl Error for DirectiveError {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn directive_error_display() {
    let err = ParseError::Directive {
      path: "lit.glsl".to_owned(),
      line: 4,
      text: "#shader geometry".to_owned(),
      kind: DirectiveError::UnknownStage("geometry".to_owned()),
    };

    assert_eq!(
      err.to_string(),
      "lit.glsl:4: could not deduce shader type from “geometry”. [LINE SOURCE]: #shader geometry"
    );
    assert_eq!(err.path(), "lit.glsl");
  }
}

//! Physical line reader.
//!
//! Lines are read lazily from any [`BufRead`] and handed back with their single-line comment
//! removed. Blank lines are kept: the tokenizer is the one that sees them as empty.

use std::io::{self, BufRead, Lines};

/// Comment marker recognized by default.
pub const DEFAULT_COMMENT_MARKER: &str = "//";

/// Lazy, non-restartable sequence of comment-stripped lines.
pub struct LineReader<R> {
  lines: Lines<R>,
  marker: String,
  line_nb: usize,
}

impl<R> LineReader<R>
where
  R: BufRead,
{
  pub fn new<M>(reader: R, marker: M) -> Self
  where
    M: Into<String>,
  {
    LineReader {
      lines: reader.lines(),
      marker: marker.into(),
      line_nb: 0,
    }
  }

  /// Number of the last line handed out (1-based); `0` before the first read.
  pub fn line_nb(&self) -> usize {
    self.line_nb
  }
}

impl<R> Iterator for LineReader<R>
where
  R: BufRead,
{
  type Item = io::Result<String>;

  fn next(&mut self) -> Option<Self::Item> {
    let line = self.lines.next()?;
    self.line_nb += 1;

    Some(line.map(|line| strip_comment(line, &self.marker)))
  }
}

/// Remove everything from the first occurrence of `marker` to the end of the line.
pub fn strip_comment(mut line: String, marker: &str) -> String {
  if marker.is_empty() {
    return line;
  }

  if let Some(start) = line.find(marker) {
    line.truncate(start);
  }

  line
}

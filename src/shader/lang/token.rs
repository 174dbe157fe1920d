//! Line tokenizer.

/// Delimiters used to split a line: ASCII whitespace and `;`.
pub const DEFAULT_DELIMITERS: &[char] = &[' ', '\t', '\n', '\r', '\x0C', '\x0B', ';'];

/// A non-empty slice of a line, along with its byte offset in that line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Token<'a> {
  pub text: &'a str,
  pub offset: usize,
}

impl<'a> Token<'a> {
  /// Byte offset right after the token.
  pub fn end(&self) -> usize {
    self.offset + self.text.len()
  }
}

/// Iterator over the tokens of a line.
#[derive(Clone, Debug)]
pub struct Tokens<'a, 'd> {
  line: &'a str,
  cursor: usize,
  delimiters: &'d [char],
}

impl<'a, 'd> Iterator for Tokens<'a, 'd> {
  type Item = Token<'a>;

  fn next(&mut self) -> Option<Self::Item> {
    let line = self.line;
    let delimiters = self.delimiters;
    let start = self.cursor + line[self.cursor..].find(|c: char| !delimiters.contains(&c))?;
    let len = line[start..]
      .find(|c: char| delimiters.contains(&c))
      .unwrap_or(line.len() - start);

    self.cursor = start + len;

    Some(Token {
      text: &line[start..start + len],
      offset: start,
    })
  }
}

/// Split `line` with [`DEFAULT_DELIMITERS`].
pub fn tokenize(line: &str) -> Tokens<'_, 'static> {
  tokenize_with(line, DEFAULT_DELIMITERS)
}

/// Split `line` on any of `delimiters`, skipping runs of them.
pub fn tokenize_with<'a, 'd>(line: &'a str, delimiters: &'d [char]) -> Tokens<'a, 'd> {
  Tokens {
    line,
    cursor: 0,
    delimiters,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn texts(line: &str) -> Vec<&str> {
    tokenize(line).map(|t| t.text).collect()
  }

  #[test]
  fn empty_line() {
    assert!(texts("").is_empty());
    assert!(texts(" \t ;; ").is_empty());
  }

  #[test]
  fn splits_on_whitespace_and_semicolons() {
    assert_eq!(texts("uniform mat4 u_model;"), vec!["uniform", "mat4", "u_model"]);
    assert_eq!(texts("  a;b\t\tc ;"), vec!["a", "b", "c"]);
  }

  #[test]
  fn keeps_offsets() {
    let line = "  #include  foo.glsl";
    let tokens = tokenize(line).collect::<Vec<_>>();

    assert_eq!(tokens[0], Token { text: "#include", offset: 2 });
    assert_eq!(tokens[1], Token { text: "foo.glsl", offset: 12 });
    assert_eq!(&line[tokens[1].offset..tokens[1].end()], "foo.glsl");
  }

  #[test]
  fn custom_delimiters() {
    let tokens = tokenize_with("a,b;,c", &[',']).map(|t| t.text).collect::<Vec<_>>();
    assert_eq!(tokens, vec!["a", "b;", "c"]);
  }
}

//! Stage driver and directive processor.
//!
//! A [`Parser`] reads one file and hands back one stage per call, stopping at each `#shader`
//! boundary so that a multi-stage file is consumed one stage at a time. `#include` recurses by
//! spawning a parser for the included file, sharing the same [`ParseCache`]: the recursion is
//! the include stack.
//!
//! Recognized directives, one per line at most:
//!
//! - `#shader vertex` / `#shader fragment`: starts a stage (stripped from the output);
//! - `#include <path>`: splices the file in place (stripped from the output), once per parse;
//! - `uniform <type> <name>;`: records the uniform, flattening struct types;
//! - `struct <Name> { <member>; … }`: records the member list of `Name`.

use log::{debug, error, warn};
use std::io::{self, BufRead};

use crate::config::Config;
use crate::shader::error::{DirectiveError, ParseError};
use crate::shader::lang::cache::ParseCache;
use crate::shader::lang::lines::LineReader;
use crate::shader::lang::token::{tokenize, Token};
use crate::shader::loader::SourceLoader;
use crate::shader::source::{Source, StageKind, Uniform};

const SHADER: &str = "#shader";
const INCLUDE: &str = "#include";
const UNIFORM: &str = "uniform";
const STRUCT: &str = "struct";

const PRECISION_QUALIFIERS: &[&str] = &["lowp", "mediump", "highp"];

/// Resumable stage reader over one shader source file.
pub struct Parser<'a> {
  path: String,
  lines: LineReader<Box<dyn BufRead + 'a>>,
  cache: &'a mut ParseCache,
  loader: &'a dyn SourceLoader,
  config: &'a Config,
  // stage announced by the `#shader` line that ended the previous call
  pending_stage: Option<StageKind>,
  exhausted: bool,
  fused: bool,
}

// What a single call gathers. Included files usually have no stage of their own.
struct Chunk {
  stage: Option<StageKind>,
  text: String,
  uniforms: Vec<Uniform>,
}

impl Chunk {
  fn push_line(&mut self, line: &str) {
    self.text.push_str(line);
    self.text.push('\n');
  }
}

enum Flow {
  Continue,
  Boundary,
}

impl<'a> Parser<'a> {
  /// Open the entry point of an include chain.
  ///
  /// The path (after resource-root substitution) is registered in `cache` before it gets opened,
  /// so a file including itself is seen as already included.
  pub fn open(
    path: &str,
    loader: &'a dyn SourceLoader,
    config: &'a Config,
    cache: &'a mut ParseCache,
  ) -> Result<Self, ParseError> {
    let path = config.resolve(path);

    if !cache.register_include(path.as_str()) {
      debug!("{} is already in the parse cache", path);
    }

    let reader = loader.open(&path).map_err(|e| {
      error!("invalid shader source path {}: {}", path, e);
      ParseError::cannot_open(&path, &e)
    })?;

    Ok(Self::new(path, reader, loader, config, cache))
  }

  fn new(
    path: String,
    reader: Box<dyn BufRead + 'a>,
    loader: &'a dyn SourceLoader,
    config: &'a Config,
    cache: &'a mut ParseCache,
  ) -> Self {
    Parser {
      lines: LineReader::new(reader, config.comment_marker.as_str()),
      path,
      cache,
      loader,
      config,
      pending_stage: None,
      exhausted: false,
      fused: false,
    }
  }

  /// Resolved path of the file this parser reads.
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Read the next stage.
  ///
  /// `Ok(None)` means the file has no more stages. On `Err`, the stage being read is lost but
  /// the parser remains usable: the next call resumes after the failing stage.
  pub fn next_stage(&mut self) -> Result<Option<Source>, ParseError> {
    match self.step()? {
      Some(Chunk {
        stage: Some(stage),
        text,
        uniforms,
      }) => {
        debug!("{}: {} stage with {} uniform(s)", self.path, stage, uniforms.len());
        Ok(Some(Source::new(stage, text, uniforms)))
      }

      Some(chunk) => {
        if !chunk.text.trim().is_empty() {
          warn!("{}: ignoring content outside of any #shader stage", self.path);
        }

        Ok(None)
      }

      None => Ok(None),
    }
  }

  // Gather lines up to the next stage boundary or the end of the file. `None` once nothing is
  // left to read.
  fn step(&mut self) -> Result<Option<Chunk>, ParseError> {
    if self.exhausted {
      return Ok(None);
    }

    let mut chunk = Chunk {
      stage: self.pending_stage.take(),
      text: String::new(),
      uniforms: Vec::new(),
    };
    let mut read_any = chunk.stage.is_some();
    let mut failure = None;

    while let Some(line) = self.lines.next() {
      let line = line.map_err(|e| self.io_error(&e))?;
      read_any = true;

      let tokens = tokenize(&line).collect::<Vec<_>>();

      // a lone directive still goes through directive handling so that it can fail
      let plain = match tokens.as_slice() {
        [] => true,
        [token] => !is_directive(token.text),
        _ => false,
      };

      if plain {
        chunk.push_line(&line);
        continue;
      }

      if let Flow::Boundary = self.process_line(&line, &tokens, &mut chunk, &mut failure)? {
        return finish(chunk, failure);
      }
    }

    self.exhausted = true;

    if !read_any {
      return Ok(None);
    }

    finish(chunk, failure)
  }

  // Scan for the first directive of the line and apply it; the line (possibly stripped) ends up
  // in the chunk unless it starts the next stage.
  fn process_line(
    &mut self,
    line: &str,
    tokens: &[Token],
    chunk: &mut Chunk,
    failure: &mut Option<ParseError>,
  ) -> Result<Flow, ParseError> {
    for (i, token) in tokens.iter().enumerate() {
      let args = &tokens[i + 1..];

      match token.text {
        SHADER => return self.shader_directive(line, args, chunk),

        INCLUDE => {
          self.include_directive(line, token, args, chunk, failure)?;
          return Ok(Flow::Continue);
        }

        UNIFORM => {
          self.uniform_directive(line, args, chunk, failure);
          chunk.push_line(line);
          return Ok(Flow::Continue);
        }

        STRUCT => {
          self.struct_directive(line, args, chunk, failure)?;
          return Ok(Flow::Continue);
        }

        _ => (),
      }
    }

    chunk.push_line(line);
    Ok(Flow::Continue)
  }

  fn shader_directive(&mut self, line: &str, args: &[Token], chunk: &mut Chunk) -> Result<Flow, ParseError> {
    let name = match args.first() {
      Some(arg) => arg.text,
      None => return Err(self.fail(line, DirectiveError::MissingStage)),
    };

    let stage = name
      .parse::<StageKind>()
      .map_err(|e| self.fail(line, DirectiveError::UnknownStage(e.0)))?;

    if chunk.stage.is_some() {
      // the line announcing the next stage belongs to no stage
      self.pending_stage = Some(stage);
      return Ok(Flow::Boundary);
    }

    chunk.stage = Some(stage);
    chunk.push_line(&strip_words(line, &[SHADER, name]));

    Ok(Flow::Continue)
  }

  fn include_directive(
    &mut self,
    line: &str,
    directive: &Token,
    args: &[Token],
    chunk: &mut Chunk,
    failure: &mut Option<ParseError>,
  ) -> Result<(), ParseError> {
    let arg = match args.first() {
      Some(arg) => arg.text,
      None => {
        record(failure, self.fail(line, DirectiveError::MissingIncludePath));
        chunk.push_line(line);
        return Ok(());
      }
    };

    let path = self.config.resolve(unquote(arg));
    let stripped = strip_words(line, &[directive.text, arg]);

    if !self.cache.register_include(path.as_str()) {
      debug!("{}:{}: {} already included", self.path, self.lines.line_nb(), path);
      chunk.push_line(&stripped);
      return Ok(());
    }

    debug!("{}:{}: including {}", self.path, self.lines.line_nb(), path);

    let reader = self.loader.open(&path).map_err(|e| {
      error!("{}:{}: invalid include path {}: {}", self.path, self.lines.line_nb(), path, e);
      ParseError::cannot_open(&path, &e)
    })?;

    let mut included = Parser::new(path, reader, self.loader, self.config, &mut *self.cache);

    while let Some(sub) = included.step()? {
      chunk.text.push_str(&sub.text);
      chunk.uniforms.extend(sub.uniforms);
    }

    chunk.push_line(&stripped);
    Ok(())
  }

  fn uniform_directive(
    &mut self,
    line: &str,
    args: &[Token],
    chunk: &mut Chunk,
    failure: &mut Option<ParseError>,
  ) {
    let args = skip_qualifiers(args, |t| t.text);

    let ty = match args {
      [ty, _, ..] => ty,
      _ => {
        record(failure, self.fail(line, DirectiveError::MalformedUniform));
        return;
      }
    };

    // declarators live between the type and the end of the statement
    let declarators = line[ty.end()..].split(';').next().unwrap_or("");
    let members = self.cache.lookup_struct(ty.text);

    for declarator in declarators.split(',') {
      match parse_declarator(declarator) {
        Some((name, None)) if members.is_some() && declarator.contains('[') => {
          let err = self.fail(line, DirectiveError::UnsizedStructArray(name.to_owned()));
          record(failure, err);
        }

        Some((name, array_len)) => {
          chunk
            .uniforms
            .extend(flatten(name, array_len, members).into_iter().map(Uniform::new));
        }

        None => warn!(
          "{}:{}: cannot make a uniform name out of “{}”",
          self.path,
          self.lines.line_nb(),
          declarator.trim()
        ),
      }
    }
  }

  fn struct_directive(
    &mut self,
    line: &str,
    args: &[Token],
    chunk: &mut Chunk,
    failure: &mut Option<ParseError>,
  ) -> Result<(), ParseError> {
    chunk.push_line(line);

    let name_token = match args.first() {
      Some(token) => token,
      None => {
        record(failure, self.fail(line, DirectiveError::MissingStructName));
        return Ok(());
      }
    };
    let name = name_token.text.split('{').next().unwrap_or("");

    if name.is_empty() {
      record(failure, self.fail(line, DirectiveError::MissingStructName));
      return Ok(());
    }

    let mut body = line[name_token.offset + name.len()..].to_owned();

    let end = loop {
      if let Some(end) = body.find('}') {
        break end;
      }

      match self.lines.next() {
        Some(next) => {
          let next = next.map_err(|e| self.io_error(&e))?;
          chunk.push_line(&next);
          body.push('\n');
          body.push_str(&next);
        }

        None => return Err(self.fail(line, DirectiveError::UnterminatedStruct(name.to_owned()))),
      }
    };

    let members = self.struct_members(&body[..end]);
    debug!("{}: struct {} {{ {} }}", self.path, name, members.join(", "));

    self.cache.register_struct(name, members);
    Ok(())
  }

  // Member paths of a struct body, nested structs already flattened.
  fn struct_members(&self, body: &str) -> Vec<String> {
    let mut members = Vec::new();

    for statement in body.split(';') {
      let words = statement
        .split(|c: char| c.is_whitespace() || c == '{')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>();

      let (ty, declarators) = match skip_qualifiers(&words, |w| *w) {
        [] => continue,
        [name] => (None, name.to_string()),
        [ty, rest @ ..] => (Some(*ty), rest.concat()),
      };

      let nested = ty.and_then(|ty| self.cache.lookup_struct(ty));

      for declarator in declarators.split(',') {
        match parse_declarator(declarator) {
          Some((name, None)) if nested.is_some() && declarator.contains('[') => {
            warn!("{}: struct array member {} has no literal size, skipping it", self.path, name)
          }

          Some((name, array_len)) => members.extend(flatten(name, array_len, nested)),
          None => warn!("{}: cannot make a struct member out of “{}”", self.path, declarator),
        }
      }
    }

    members
  }

  fn fail(&self, line: &str, kind: DirectiveError) -> ParseError {
    let err = ParseError::Directive {
      path: self.path.clone(),
      line: self.lines.line_nb(),
      text: line.to_owned(),
      kind,
    };

    error!("failed to parse shader source: {}", err);
    err
  }

  fn io_error(&self, err: &io::Error) -> ParseError {
    let err = ParseError::Io {
      path: self.path.clone(),
      line: self.lines.line_nb(),
      reason: err.to_string(),
    };

    error!("{}", err);
    err
  }
}

impl<'a> Iterator for Parser<'a> {
  type Item = Result<Source, ParseError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.fused {
      return None;
    }

    match self.next_stage() {
      Ok(Some(source)) => Some(Ok(source)),

      Ok(None) => {
        self.fused = true;
        None
      }

      Err(err) => {
        self.fused = true;
        Some(Err(err))
      }
    }
  }
}

fn finish(chunk: Chunk, failure: Option<ParseError>) -> Result<Option<Chunk>, ParseError> {
  match failure {
    Some(err) => Err(err),
    None => Ok(Some(chunk)),
  }
}

// Keep the first best-effort failure of a chunk.
fn record(failure: &mut Option<ParseError>, err: ParseError) {
  if failure.is_none() {
    *failure = Some(err);
  }
}

fn is_directive(word: &str) -> bool {
  [SHADER, INCLUDE, UNIFORM, STRUCT].iter().any(|directive| *directive == word)
}

fn skip_qualifiers<T, F>(items: &[T], text: F) -> &[T]
where
  F: Fn(&T) -> &str,
{
  let skipped = items
    .iter()
    .take_while(|item| PRECISION_QUALIFIERS.iter().any(|q| *q == text(*item)))
    .count();

  &items[skipped..]
}

// Remove the first occurrence of each word.
fn strip_words(line: &str, words: &[&str]) -> String {
  let mut stripped = line.to_owned();

  for word in words {
    stripped = stripped.replacen(*word, "", 1);
  }

  stripped.trim_end().to_owned()
}

fn unquote(path: &str) -> &str {
  let quoted = path.len() >= 2
    && ((path.starts_with('"') && path.ends_with('"')) || (path.starts_with('<') && path.ends_with('>')));

  if quoted {
    &path[1..path.len() - 1]
  } else {
    path
  }
}

// `name`, `name[4]` or `name = value`; returns the bare name and the literal array length, if
// any.
fn parse_declarator(declarator: &str) -> Option<(&str, Option<usize>)> {
  let declarator = declarator.split('=').next().unwrap_or("").trim();

  let (name, array_len) = match declarator.find('[') {
    Some(open) => {
      let len = declarator[open + 1..]
        .split(']')
        .next()
        .and_then(|len| len.trim().parse::<usize>().ok());
      (declarator[..open].trim(), len)
    }

    None => (declarator, None),
  };

  if is_identifier(name) {
    Some((name, array_len))
  } else {
    None
  }
}

fn is_identifier(s: &str) -> bool {
  let mut chars = s.chars();

  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
    _ => false,
  }
}

// Uniform paths a declaration stands for. Struct types expand to one path per member; arrays of
// structs expand per element.
fn flatten(name: &str, array_len: Option<usize>, members: Option<&[String]>) -> Vec<String> {
  match (members, array_len) {
    (Some(members), Some(len)) => (0..len)
      .flat_map(|i| members.iter().map(move |member| format!("{}[{}].{}", name, i, member)))
      .collect(),

    (Some(members), None) => members.iter().map(|member| format!("{}.{}", name, member)).collect(),

    (None, _) => vec![name.to_owned()],
  }
}

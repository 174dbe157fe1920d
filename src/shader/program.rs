//! Shader programs.
//!
//! A program is built out of the stages a parser hands back: each stage is compiled, all of them
//! are linked, then every uniform name the stages declared is resolved to a location. The GPU side
//! is abstracted by [`Backend`].

use log::{debug, error, trace};
use std::error::Error;
use std::fmt;

use crate::shader::error::ParseError;
use crate::shader::source::{Source, StageKind, Uniform};

/// Class of types that can compile, link and reflect shader programs.
pub trait Backend {
  /// Compiled stage.
  type Stage;
  /// Linked program.
  type Program;
  /// Compilation or link error (typically the info log of the driver).
  type Error;

  fn compile_stage(&mut self, stage: StageKind, source: &str) -> Result<Self::Stage, Self::Error>;

  fn link(&mut self, stages: Vec<Self::Stage>) -> Result<Self::Program, Self::Error>;

  /// Location of a uniform in a linked program, if the program knows it.
  fn uniform_location(&mut self, program: &Self::Program, name: &str) -> Option<i32>;
}

/// Errors that can be risen while building a program.
#[derive(Debug, Eq, PartialEq)]
pub enum ProgramError<E> {
  /// A stage couldn’t be resolved.
  Parse(ParseError),
  /// The source tree has no stage at all.
  NoStage,
  Compile { stage: StageKind, error: E },
  Link(E),
  /// A declared uniform is unknown to the linked program.
  UnresolvedUniform(String),
}

impl<E> fmt::Display for ProgramError<E>
where
  E: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match self {
      ProgramError::Parse(err) => write!(f, "cannot resolve shader source: {}", err),
      ProgramError::NoStage => f.write_str("no shader stage to build a program from"),
      ProgramError::Compile { stage, error } => write!(f, "{} stage compilation failed: {}", stage, error),
      ProgramError::Link(err) => write!(f, "program link failed: {}", err),
      ProgramError::UnresolvedUniform(name) => write!(f, "could not locate uniform {}", name),
    }
  }
}

impl<E> Error for ProgramError<E>
where
  E: fmt::Debug + fmt::Display,
{
}

/// A linked program along with its resolved uniforms.
#[derive(Debug)]
pub struct Program<P> {
  program: P,
  uniforms: Vec<Uniform>,
}

impl<P> Program<P> {
  /// Build a program out of `stages`, usually a [`Parser`](crate::shader::Parser).
  ///
  /// Any stage error fails the whole build: nothing gets compiled for a stage whose kind couldn’t
  /// be determined.
  pub fn build<B, S>(backend: &mut B, stages: S) -> Result<Self, ProgramError<B::Error>>
  where
    B: Backend<Program = P>,
    S: IntoIterator<Item = Result<Source, ParseError>>,
  {
    let mut compiled = Vec::new();
    let mut uniforms = Vec::new();

    for source in stages {
      let source = source.map_err(ProgramError::Parse)?;
      let (stage, text, stage_uniforms) = source.into_parts();

      debug!("{} shader", stage);
      annotate_shader(&text);

      let stage_object = backend.compile_stage(stage, &text).map_err(|error| {
        error!("{} stage compilation failed", stage);
        ProgramError::Compile { stage, error }
      })?;

      compiled.push(stage_object);
      uniforms.extend(stage_uniforms);
    }

    if compiled.is_empty() {
      return Err(ProgramError::NoStage);
    }

    let program = backend.link(compiled).map_err(ProgramError::Link)?;

    for uniform in &mut uniforms {
      match backend.uniform_location(&program, uniform.name()) {
        Some(location) => uniform.locate(location),
        None => {
          error!("could not locate uniform of name: {}", uniform.name());
          return Err(ProgramError::UnresolvedUniform(uniform.name().to_owned()));
        }
      }
    }

    Ok(Program { program, uniforms })
  }

  pub fn handle(&self) -> &P {
    &self.program
  }

  pub fn into_handle(self) -> P {
    self.program
  }

  /// Uniforms in declaration order; every one of them is located.
  pub fn uniforms(&self) -> &[Uniform] {
    &self.uniforms
  }

  /// First uniform declared with that name.
  pub fn uniform(&self, name: &str) -> Option<&Uniform> {
    self.uniforms.iter().find(|uniform| uniform.name() == name)
  }

  pub fn location(&self, name: &str) -> Option<i32> {
    self.uniform(name).and_then(Uniform::location)
  }
}

fn annotate_shader(s: &str) {
  for (i, line) in s.lines().enumerate() {
    trace!("{:3}: {}", i + 1, line);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Config;
  use crate::shader::{MemoryLoader, Preprocessor};
  use std::collections::HashMap;

  // Records what it’s asked to do; knows the uniforms listed in `known`.
  #[derive(Default)]
  struct Recorder {
    compiled: Vec<(StageKind, String)>,
    linked: usize,
    known: HashMap<String, i32>,
    reject: Option<StageKind>,
  }

  impl Backend for Recorder {
    type Stage = usize;
    type Program = Vec<usize>;
    type Error = String;

    fn compile_stage(&mut self, stage: StageKind, source: &str) -> Result<Self::Stage, Self::Error> {
      if self.reject == Some(stage) {
        return Err("syntax error".to_owned());
      }

      self.compiled.push((stage, source.to_owned()));
      Ok(self.compiled.len() - 1)
    }

    fn link(&mut self, stages: Vec<Self::Stage>) -> Result<Self::Program, Self::Error> {
      self.linked += 1;
      Ok(stages)
    }

    fn uniform_location(&mut self, _: &Self::Program, name: &str) -> Option<i32> {
      self.known.get(name).cloned()
    }
  }

  fn recorder(known: &[(&str, i32)]) -> Recorder {
    Recorder {
      known: known.iter().map(|&(name, loc)| (name.to_owned(), loc)).collect(),
      ..Recorder::default()
    }
  }

  fn preprocessor() -> Preprocessor<MemoryLoader> {
    let loader = MemoryLoader::new()
      .with(
        "lit.glsl",
        "#shader vertex\nuniform mat4 model;\n#shader fragment\n#include light.glsl\nuniform Light light;\nuniform mat4 model;\n",
      )
      .with("light.glsl", "struct Light { vec3 dir; vec3 color; };\n")
      .with("broken.glsl", "#shader vertex\nuniform mat4 model;\n#shader hull\n")
      .with("lib.glsl", "float square(float x) { return x * x; }\n");

    Preprocessor::with_loader(loader, Config::default())
  }

  #[test]
  fn build_locates_every_uniform() {
    let mut backend = recorder(&[("model", 0), ("light.dir", 1), ("light.color", 2)]);
    let program = preprocessor().build_program(&mut backend, "lit.glsl").unwrap();

    assert_eq!(backend.compiled.len(), 2);
    assert_eq!(backend.compiled[0].0, StageKind::Vertex);
    assert_eq!(backend.compiled[1].0, StageKind::Fragment);
    assert!(backend.compiled[1].1.contains("struct Light"));
    assert_eq!(backend.linked, 1);
    assert_eq!(program.handle(), &vec![0, 1]);

    let names = program.uniforms().iter().map(Uniform::name).collect::<Vec<_>>();
    assert_eq!(names, vec!["model", "light.dir", "light.color", "model"]);
    assert!(program.uniforms().iter().all(|u| u.location().is_some()));
    assert_eq!(program.location("light.color"), Some(2));
    assert_eq!(program.location("light"), None);
  }

  #[test]
  fn unresolved_uniform_fails_the_build() {
    let mut backend = recorder(&[("model", 0), ("light.dir", 1)]);
    let err = preprocessor().build_program(&mut backend, "lit.glsl").err().unwrap();

    assert_eq!(err, ProgramError::UnresolvedUniform("light.color".to_owned()));
  }

  #[test]
  fn parse_error_fails_the_build_before_linking() {
    let mut backend = recorder(&[("model", 0)]);

    match preprocessor().build_program(&mut backend, "broken.glsl") {
      Err(ProgramError::Parse(ParseError::Directive { .. })) => (),
      r => panic!("unexpected result: {:?}", r.map(|_| ())),
    }

    assert_eq!(backend.linked, 0);
  }

  #[test]
  fn compile_error_names_the_stage() {
    let mut backend = Recorder {
      reject: Some(StageKind::Fragment),
      ..recorder(&[("model", 0)])
    };
    let err = preprocessor().build_program(&mut backend, "lit.glsl").err().unwrap();

    assert_eq!(
      err,
      ProgramError::Compile {
        stage: StageKind::Fragment,
        error: "syntax error".to_owned()
      }
    );
    assert_eq!(err.to_string(), "fragment stage compilation failed: syntax error");
  }

  #[test]
  fn no_stage_no_program() {
    let mut backend = recorder(&[]);
    let err = preprocessor().build_program(&mut backend, "lib.glsl").err().unwrap();

    assert_eq!(err, ProgramError::NoStage);
  }

  #[test]
  fn missing_entry_point() {
    let mut backend = recorder(&[]);

    match preprocessor().build_program(&mut backend, "nope.glsl") {
      Err(ProgramError::Parse(ParseError::CannotOpen { path, .. })) => assert_eq!(path, "nope.glsl"),
      r => panic!("unexpected result: {:?}", r.map(|_| ())),
    }
  }
}

//! Resolved shader stages.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Pipeline slot a stage is compiled for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
  Vertex,
  Fragment,
}

impl StageKind {
  /// Name used by the `#shader` directive.
  pub fn as_str(self) -> &'static str {
    match self {
      StageKind::Vertex => "vertex",
      StageKind::Fragment => "fragment",
    }
  }
}

impl fmt::Display for StageKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.write_str(self.as_str())
  }
}

/// The stage name is not one `#shader` knows about.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownStage(pub String);

impl fmt::Display for UnknownStage {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    write!(f, "unknown shader stage “{}”", self.0)
  }
}

impl FromStr for StageKind {
  type Err = UnknownStage;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "vertex" => Ok(StageKind::Vertex),
      "fragment" => Ok(StageKind::Fragment),
      _ => Err(UnknownStage(s.to_owned())),
    }
  }
}

/// A uniform binding name, with the location it resolved to once a program got linked.
///
/// Struct-typed uniforms are flattened, so the name is a dotted member path such as
/// `light.position`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Uniform {
  name: String,
  location: Option<i32>,
}

impl Uniform {
  pub fn new<N>(name: N) -> Self
  where
    N: Into<String>,
  {
    Uniform {
      name: name.into(),
      location: None,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// `None` until the program owning this uniform resolved it.
  pub fn location(&self) -> Option<i32> {
    self.location
  }

  pub(crate) fn locate(&mut self, location: i32) {
    self.location = Some(location);
  }
}

/// One complete stage: its kind, its resolved GLSL text and its uniforms in declaration order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Source {
  stage: StageKind,
  text: String,
  uniforms: Vec<Uniform>,
}

impl Source {
  pub fn new(stage: StageKind, text: String, uniforms: Vec<Uniform>) -> Self {
    Source {
      stage,
      text,
      uniforms,
    }
  }

  pub fn stage(&self) -> StageKind {
    self.stage
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn uniforms(&self) -> &[Uniform] {
    &self.uniforms
  }

  /// Uniform names, in declaration order.
  pub fn uniform_names(&self) -> impl Iterator<Item = &str> {
    self.uniforms.iter().map(Uniform::name)
  }

  pub fn into_parts(self) -> (StageKind, String, Vec<Uniform>) {
    (self.stage, self.text, self.uniforms)
  }
}

//! Shader sources and programs.
//!
//! A shader program is written as one or several annotated GLSL files (see the [`lang`] module).
//! A [`Preprocessor`] turns the entry file of a program into its [`Source`] stages: resolved GLSL
//! text plus the flat list of uniform names each stage declares. A [`Backend`] then compiles and
//! links those stages into a [`Program`] and resolves the uniforms.
//!
//! Every call to [`Preprocessor::stages`] or [`Preprocessor::build_program`] uses a fresh
//! [`ParseCache`], so two programs never suppress each other’s includes. Use
//! [`Preprocessor::parser`] to drive the cache yourself.

pub mod error;
#[cfg(feature = "gl")]
pub mod gl;
pub mod lang;
pub mod loader;
pub mod program;
pub mod source;

use log::info;
use std::time::Instant;

use crate::config::Config;

pub use self::error::{DirectiveError, ParseError};
pub use self::lang::cache::ParseCache;
pub use self::lang::parser::Parser;
pub use self::loader::{FsLoader, MemoryLoader, SourceLoader};
pub use self::program::{Backend, Program, ProgramError};
pub use self::source::{Source, StageKind, Uniform};

/// Entry point: a source loader and the configuration every parser of it uses.
#[derive(Clone, Debug, Default)]
pub struct Preprocessor<L = FsLoader> {
  loader: L,
  config: Config,
}

impl Preprocessor<FsLoader> {
  /// Read sources from the file system.
  pub fn new(config: Config) -> Self {
    Self::with_loader(FsLoader, config)
  }
}

impl<L> Preprocessor<L>
where
  L: SourceLoader,
{
  pub fn with_loader(loader: L, config: Config) -> Self {
    Preprocessor { loader, config }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Open `path` as the root of an include chain recorded in `cache`.
  ///
  /// The cache is yours: drop it (or clear it) once the program is built.
  pub fn parser<'a>(&'a self, path: &str, cache: &'a mut ParseCache) -> Result<Parser<'a>, ParseError> {
    Parser::open(path, &self.loader, &self.config, cache)
  }

  /// Resolve every stage of the program rooted at `path`.
  pub fn stages(&self, path: &str) -> Result<Vec<Source>, ParseError> {
    info!("loading shader program: {}", path);

    let start_time = Instant::now();
    let mut cache = ParseCache::new();
    let stages = self.parser(path, &mut cache)?.collect::<Result<Vec<_>, _>>()?;

    info!(
      "loaded shader program {}: {} stage(s), {} file(s) in {:.3}ms",
      path,
      stages.len(),
      cache.includes().count(),
      start_time.elapsed().as_secs_f64() * 1e3
    );

    Ok(stages)
  }

  /// Resolve the program rooted at `path` and build it with `backend`.
  pub fn build_program<B>(&self, backend: &mut B, path: &str) -> Result<Program<B::Program>, ProgramError<B::Error>>
  where
    B: Backend,
  {
    let mut cache = ParseCache::new();
    let parser = self.parser(path, &mut cache).map_err(ProgramError::Parse)?;

    Program::build(backend, parser)
  }
}

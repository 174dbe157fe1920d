//! GLSL stage splitter, include resolver and uniform reflection.
//!
//! Shader programs are written as annotated GLSL files: one file may hold several stages
//! (`#shader vertex`, `#shader fragment`), include other files (`#include`) and declare struct
//! uniforms. Each stage comes back as compilable GLSL text along with the flat, declaration-ordered
//! list of uniform names it needs, struct uniforms expanded into one name per member.
//!
//! ```no_run
//! use shaderpp::{Config, Preprocessor};
//!
//! let preprocessor = Preprocessor::new(Config::default());
//!
//! for stage in preprocessor.stages("ENGINE_RES_PATH/shaders/lit.glsl").unwrap() {
//!   println!("{} stage: {:?}", stage.stage(), stage.uniform_names().collect::<Vec<_>>());
//! }
//! ```

pub mod config;
pub mod logger;
pub mod shader;

pub use crate::config::{Config, ConfigError};
pub use crate::shader::{
  Backend, DirectiveError, FsLoader, MemoryLoader, ParseCache, ParseError, Parser, Preprocessor, Program,
  ProgramError, Source, SourceLoader, StageKind, Uniform,
};

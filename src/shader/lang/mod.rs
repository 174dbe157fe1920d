//! Annotated GLSL.
//!
//! Plain GLSL augmented with a handful of line directives, resolved at the text level: several
//! stages may live in one file (`#shader`), files may include each other (`#include`) and
//! struct-typed uniforms are flattened into one uniform path per member, since GLSL can’t be
//! asked for the layout of a struct.
//!
//! `lines` and `token` cut the text, `cache` holds what one include chain has already seen and
//! `parser` drives everything.

pub mod cache;
pub mod lines;
pub mod parser;
pub mod token;

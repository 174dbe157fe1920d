//! OpenGL program backend.
//!
//! Needs a current OpenGL context whose function pointers were loaded with `gl::load_with`
//! before any [`GlBackend`] method is called.

use gl::types::{GLchar, GLenum, GLint, GLuint};
use std::ffi::CString;
use std::ptr;

use crate::shader::program::Backend;
use crate::shader::source::StageKind;

/// A compiled shader object; deleted on drop.
#[derive(Debug)]
pub struct GlStage(GLuint);

impl Drop for GlStage {
  fn drop(&mut self) {
    unsafe { gl::DeleteShader(self.0) }
  }
}

/// A linked program object; deleted on drop.
#[derive(Debug)]
pub struct GlProgram(GLuint);

impl GlProgram {
  pub fn id(&self) -> GLuint {
    self.0
  }
}

impl Drop for GlProgram {
  fn drop(&mut self) {
    unsafe { gl::DeleteProgram(self.0) }
  }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GlBackend;

impl Backend for GlBackend {
  type Stage = GlStage;
  type Program = GlProgram;
  type Error = String;

  fn compile_stage(&mut self, stage: StageKind, source: &str) -> Result<Self::Stage, Self::Error> {
    let src = CString::new(source).map_err(|e| format!("invalid shader source: {}", e))?;

    unsafe {
      let handle = GlStage(gl::CreateShader(gl_stage(stage)));

      if handle.0 == 0 {
        return Err("unable to create shader object".to_owned());
      }

      gl::ShaderSource(handle.0, 1, &src.as_ptr(), ptr::null());
      gl::CompileShader(handle.0);

      let mut status: GLint = gl::FALSE as GLint;
      gl::GetShaderiv(handle.0, gl::COMPILE_STATUS, &mut status);

      if status == gl::TRUE as GLint {
        Ok(handle)
      } else {
        let mut log_len: GLint = 0;
        gl::GetShaderiv(handle.0, gl::INFO_LOG_LENGTH, &mut log_len);

        Err(info_log(log_len, |len, written, log| gl::GetShaderInfoLog(handle.0, len, written, log)))
      }
    }
  }

  fn link(&mut self, stages: Vec<Self::Stage>) -> Result<Self::Program, Self::Error> {
    unsafe {
      let program = GlProgram(gl::CreateProgram());

      if program.0 == 0 {
        return Err("unable to create program object".to_owned());
      }

      for stage in &stages {
        gl::AttachShader(program.0, stage.0);
      }

      gl::LinkProgram(program.0);

      for stage in &stages {
        gl::DetachShader(program.0, stage.0);
      }

      let mut status: GLint = gl::FALSE as GLint;
      gl::GetProgramiv(program.0, gl::LINK_STATUS, &mut status);

      if status == gl::TRUE as GLint {
        Ok(program)
      } else {
        let mut log_len: GLint = 0;
        gl::GetProgramiv(program.0, gl::INFO_LOG_LENGTH, &mut log_len);

        Err(info_log(log_len, |len, written, log| gl::GetProgramInfoLog(program.0, len, written, log)))
      }
    }
  }

  fn uniform_location(&mut self, program: &Self::Program, name: &str) -> Option<i32> {
    let name = CString::new(name).ok()?;
    let location = unsafe { gl::GetUniformLocation(program.0, name.as_ptr()) };

    if location < 0 {
      None
    } else {
      Some(location)
    }
  }
}

fn gl_stage(stage: StageKind) -> GLenum {
  match stage {
    StageKind::Vertex => gl::VERTEX_SHADER,
    StageKind::Fragment => gl::FRAGMENT_SHADER,
  }
}

fn info_log<F>(log_len: GLint, read: F) -> String
where
  F: FnOnce(GLint, *mut GLint, *mut GLchar),
{
  let mut log = vec![0u8; log_len.max(1) as usize];
  let mut written: GLint = 0;

  read(log.len() as GLint, &mut written, log.as_mut_ptr() as *mut GLchar);
  log.truncate(written.max(0) as usize);

  String::from_utf8_lossy(&log).into_owned()
}

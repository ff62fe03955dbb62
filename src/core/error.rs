//! Error types for release-walker with contextual messages
//!
//! Every failure during a walk is fatal: the error bubbles up to `main`, gets printed
//! together with an optional help line, and the process exits non-zero. The variants
//! exist so the report can say *where* the walk stopped (which manifest, which project,
//! which pipeline stage), not to drive recovery.

use crate::release::pipeline::Stage;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for release-walker
#[derive(Debug)]
pub enum WalkError {
  /// Manifest or settings errors
  Config(ConfigError),

  /// External process errors
  Process(ProcessError),

  /// A pipeline stage failed for a project
  Stage {
    project: String,
    stage: Stage,
    source: Box<WalkError>,
  },

  /// Invalid environment variable for a project's execution context
  Environment { name: String, reason: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl WalkError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    WalkError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Wrap an error as the failure of one pipeline stage
  pub fn stage(project: impl Into<String>, stage: Stage, source: WalkError) -> Self {
    WalkError::Stage {
      project: project.into(),
      stage,
      source: Box::new(source),
    }
  }

  /// Add context to an existing error
  ///
  /// Structured variants are folded into a message so the context line reads first.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      WalkError::Message { message, context, help } => WalkError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      other => {
        let help = other.help_message();
        WalkError::Message {
          message: ctx_str,
          context: Some(other.to_string()),
          help,
        }
      }
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      WalkError::Config(e) => e.help_message(),
      WalkError::Process(e) => e.help_message(),
      WalkError::Stage { stage, source, .. } => stage.help_message().or_else(|| source.help_message()),
      WalkError::Environment { .. } => {
        Some("Environment variable names must be non-empty and must not contain '=' or NUL.".to_string())
      }
      WalkError::Message { help, .. } => help.clone(),
      WalkError::Io(_) => None,
    }
  }
}

impl fmt::Display for WalkError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WalkError::Config(e) => write!(f, "{}", e),
      WalkError::Process(e) => write!(f, "{}", e),
      WalkError::Stage { project, stage, source } => {
        write!(f, "failed to run {} for project '{}': {}", stage, project, source)
      }
      WalkError::Environment { name, reason } => {
        write!(f, "failed to set environment variable '{}': {}", name, reason)
      }
      WalkError::Io(e) => write!(f, "I/O error: {}", e),
      WalkError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for WalkError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      WalkError::Io(e) => Some(e),
      WalkError::Stage { source, .. } => Some(source.as_ref()),
      WalkError::Process(ProcessError::Spawn { source, .. }) => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for WalkError {
  fn from(err: io::Error) -> Self {
    WalkError::Io(err)
  }
}

impl From<String> for WalkError {
  fn from(msg: String) -> Self {
    WalkError::message(msg)
  }
}

impl From<&str> for WalkError {
  fn from(msg: &str) -> Self {
    WalkError::message(msg)
  }
}

impl From<ConfigError> for WalkError {
  fn from(err: ConfigError) -> Self {
    WalkError::Config(err)
  }
}

impl From<ProcessError> for WalkError {
  fn from(err: ProcessError) -> Self {
    WalkError::Process(err)
  }
}

impl From<walkdir::Error> for WalkError {
  fn from(err: walkdir::Error) -> Self {
    let path = err.path().map(|p| p.display().to_string());
    match err.into_io_error() {
      Some(io_err) => match path {
        Some(path) => WalkError::Io(io_err).context(format!("Failed to read directory {}", path)),
        None => WalkError::Io(io_err),
      },
      None => WalkError::message("Filesystem loop detected while walking version directories"),
    }
  }
}

impl From<serde_json::Error> for WalkError {
  fn from(err: serde_json::Error) -> Self {
    WalkError::message(format!("JSON error: {}", err))
  }
}

/// Manifest and settings errors
#[derive(Debug)]
pub enum ConfigError {
  /// config.yaml missing from a matched version directory
  ManifestNotFound { dir: PathBuf },

  /// config.yaml could not be read or decoded
  ManifestUnreadable { path: PathBuf, reason: String },

  /// A declared project failed validation
  InvalidProject {
    path: PathBuf,
    project: String,
    reason: String,
  },

  /// release-walker.toml is present but invalid
  InvalidSettings { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::ManifestNotFound { .. } => Some(
        "Every version directory that passes the filter needs a config.yaml with a `projects` list. \
         Rename the directory or narrow --versions to skip it."
          .to_string(),
      ),
      ConfigError::InvalidProject { .. } => Some(
        "Project names must be a single directory name; repo and version must be set.".to_string(),
      ),
      ConfigError::InvalidSettings { .. } => {
        Some("Fix the file or remove it to fall back to the built-in defaults.".to_string())
      }
      ConfigError::ManifestUnreadable { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::ManifestNotFound { dir } => {
        write!(f, "failed to open config: {}/config.yaml not found", dir.display())
      }
      ConfigError::ManifestUnreadable { path, reason } => {
        write!(f, "failed to read config {}: {}", path.display(), reason)
      }
      ConfigError::InvalidProject { path, project, reason } => {
        write!(f, "invalid project '{}' in {}: {}", project, path.display(), reason)
      }
      ConfigError::InvalidSettings { path, reason } => {
        write!(f, "invalid settings in {}: {}", path.display(), reason)
      }
    }
  }
}

/// External process errors
#[derive(Debug)]
pub enum ProcessError {
  /// The process could not be started
  Spawn {
    program: String,
    command: String,
    source: io::Error,
  },

  /// The process exited unsuccessfully
  Failed {
    command: String,
    code: Option<i32>,
    stderr: String,
  },
}

impl ProcessError {
  fn help_message(&self) -> Option<String> {
    match self {
      ProcessError::Spawn { program, source, .. } if source.kind() == io::ErrorKind::NotFound => {
        Some(format!("`{}` was not found. Check that it is installed and on PATH.", program))
      }
      _ => None,
    }
  }
}

impl fmt::Display for ProcessError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProcessError::Spawn { command, source, .. } => {
        write!(f, "could not start `{}`: {}", command, source)
      }
      ProcessError::Failed { command, code, stderr } => {
        match code {
          Some(code) => write!(f, "`{}` exited with status {}", command, code)?,
          None => write!(f, "`{}` was terminated by a signal", command)?,
        }
        if !stderr.trim().is_empty() {
          write!(f, "\n{}", stderr.trim_end())?;
        }
        Ok(())
      }
    }
  }
}

/// Result type alias for release-walker
pub type WalkResult<T> = Result<T, WalkError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> WalkResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> WalkResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<WalkError>,
{
  fn context(self, ctx: impl Into<String>) -> WalkResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> WalkResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &WalkError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

//! Error kinds produced while dispatching a line.
//!
//! None of these end the session: the router renders each one as an
//! error line and waits for the next input.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a `cd` was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryChangeReason {
    NotFound,
    NotADirectory,
    PermissionDenied,
    Other(String),
}

impl fmt::Display for DirectoryChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "Directory does not exist"),
            Self::NotADirectory => write!(f, "Not a directory"),
            Self::PermissionDenied => write!(f, "Permission denied"),
            Self::Other(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    /// Transport, authentication or response-format failure in the translator.
    #[error("Error interpreting command: {0}")]
    Translation(String),

    #[error("cd: {}: {reason}", path.display())]
    DirectoryChange {
        path: PathBuf,
        reason: DirectoryChangeReason,
    },

    #[error("Command not found: {0}")]
    ProgramNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Any other failure while launching or running an external command.
    #[error("{program}: {message}")]
    Execution { program: String, message: String },
}

impl ShellError {
    pub fn translation(message: impl Into<String>) -> Self {
        Self::Translation(message.into())
    }

    pub fn execution(program: &str, message: impl Into<String>) -> Self {
        Self::Execution {
            program: program.to_string(),
            message: message.into(),
        }
    }
}

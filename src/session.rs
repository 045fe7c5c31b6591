//! Per-session mutable state.

use std::path::{Path, PathBuf};

/// State owned by one interactive session.
///
/// The working directory only changes through a successful `cd`; the
/// translation toggle is owned by the front end and only read by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    working_directory: PathBuf,
    /// Whether free-form input is sent through the translator first.
    pub ai_translation_enabled: bool,
}

impl SessionState {
    pub fn new(working_directory: PathBuf, ai_translation_enabled: bool) -> Self {
        Self {
            working_directory,
            ai_translation_enabled,
        }
    }

    /// Creates a session rooted at the process's current directory.
    pub fn from_current_dir(ai_translation_enabled: bool) -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?, ai_translation_enabled))
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn toggle_ai(&mut self) -> bool {
        self.ai_translation_enabled = !self.ai_translation_enabled;
        self.ai_translation_enabled
    }

    pub(crate) fn set_working_directory(&mut self, path: PathBuf) {
        self.working_directory = path;
    }
}

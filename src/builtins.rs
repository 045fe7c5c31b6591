//! Session-local commands: `pwd`, `cd`, `exit`, `clear`.

use crate::classify::Builtin;
use crate::error::{DirectoryChangeReason, ShellError};
use crate::session::SessionState;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a built-in asks of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinOutcome {
    /// Lines to show (possibly none).
    Output(Vec<String>),
    Terminate,
    ClearOutput,
}

pub struct BuiltinHandler {
    home: Option<PathBuf>,
}

impl BuiltinHandler {
    pub fn new() -> Self {
        Self::with_home(dirs::home_dir())
    }

    /// Creates a handler with a fixed home directory (for testing).
    pub fn with_home(home: Option<PathBuf>) -> Self {
        Self { home }
    }

    pub fn handle(
        &self,
        builtin: Builtin,
        arg: Option<&str>,
        session: &mut SessionState,
    ) -> Result<BuiltinOutcome, ShellError> {
        match builtin {
            Builtin::Pwd => Ok(BuiltinOutcome::Output(vec![self.pwd(session)])),
            Builtin::Cd => {
                self.cd(arg, session)?;
                Ok(BuiltinOutcome::Output(Vec::new()))
            }
            Builtin::Exit => Ok(BuiltinOutcome::Terminate),
            Builtin::Clear => Ok(BuiltinOutcome::ClearOutput),
        }
    }

    pub fn pwd(&self, session: &SessionState) -> String {
        session.working_directory().display().to_string()
    }

    /// Changes the session directory to `target`, or home when omitted.
    ///
    /// Relative targets resolve against the session directory. On failure
    /// the session is left untouched.
    pub fn cd(
        &self,
        target: Option<&str>,
        session: &mut SessionState,
    ) -> Result<PathBuf, ShellError> {
        let requested = match target {
            Some(target) => session.working_directory().join(target),
            None => self.home.clone().ok_or_else(|| ShellError::DirectoryChange {
                path: PathBuf::from("~"),
                reason: DirectoryChangeReason::Other("Could not find home directory".to_string()),
            })?,
        };

        let resolved = check_directory(&requested).map_err(|reason| {
            warn!("cd to {} refused: {}", requested.display(), reason);
            ShellError::DirectoryChange {
                path: PathBuf::from(target.unwrap_or("~")),
                reason,
            }
        })?;

        info!("Changed directory to {}", resolved.display());
        session.set_working_directory(resolved.clone());
        Ok(resolved)
    }
}

impl Default for BuiltinHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonicalizes `path` and checks that it is a directory we may enter.
fn check_directory(path: &Path) -> Result<PathBuf, DirectoryChangeReason> {
    let resolved = fs::canonicalize(path).map_err(reason_for)?;
    if !resolved.is_dir() {
        return Err(DirectoryChangeReason::NotADirectory);
    }
    check_search_permission(&resolved)?;
    Ok(resolved)
}

/// Entering a directory needs search (execute) permission, not read.
#[cfg(unix)]
fn check_search_permission(dir: &Path) -> Result<(), DirectoryChangeReason> {
    use nix::unistd::{access, AccessFlags};

    access(dir, AccessFlags::X_OK).map_err(|errno| reason_for(io::Error::from(errno)))
}

#[cfg(not(unix))]
fn check_search_permission(_dir: &Path) -> Result<(), DirectoryChangeReason> {
    Ok(())
}

fn reason_for(e: io::Error) -> DirectoryChangeReason {
    match e.kind() {
        io::ErrorKind::NotFound => DirectoryChangeReason::NotFound,
        io::ErrorKind::PermissionDenied => DirectoryChangeReason::PermissionDenied,
        _ => DirectoryChangeReason::Other(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn session_in(dir: &Path) -> SessionState {
        SessionState::new(dir.canonicalize().unwrap(), true)
    }

    #[test]
    fn test_cd_then_pwd_reports_absolute_path() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let handler = BuiltinHandler::with_home(None);
        let mut session = session_in(dir.path());

        handler.cd(Some(sub.to_str().unwrap()), &mut session).unwrap();

        assert_eq!(handler.pwd(&session), sub.canonicalize().unwrap().display().to_string());
    }

    #[test]
    fn test_cd_relative_resolves_against_session_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        let handler = BuiltinHandler::with_home(None);
        let mut session = session_in(dir.path());

        handler.cd(Some("a"), &mut session).unwrap();
        handler.cd(Some("b"), &mut session).unwrap();
        handler.cd(Some(".."), &mut session).unwrap();

        assert_eq!(
            session.working_directory(),
            dir.path().join("a").canonicalize().unwrap()
        );
    }

    #[test]
    fn test_cd_missing_leaves_session_unchanged() {
        let dir = tempdir().unwrap();
        let handler = BuiltinHandler::with_home(None);
        let mut session = session_in(dir.path());
        let before = session.clone();

        let err = handler.cd(Some("missing"), &mut session).unwrap_err();

        assert!(matches!(
            err,
            ShellError::DirectoryChange { reason: DirectoryChangeReason::NotFound, .. }
        ));
        assert_eq!(session, before);
    }

    #[test]
    fn test_cd_into_file_is_not_a_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("file.txt"), "x").unwrap();
        let handler = BuiltinHandler::with_home(None);
        let mut session = session_in(dir.path());
        let before = session.clone();

        let err = handler.cd(Some("file.txt"), &mut session).unwrap_err();

        assert!(matches!(
            err,
            ShellError::DirectoryChange { reason: DirectoryChangeReason::NotADirectory, .. }
        ));
        assert_eq!(session, before);
    }

    #[cfg(unix)]
    fn with_mode(dir: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_cd_into_search_only_directory_is_allowed() {
        let dir = tempdir().unwrap();
        let locked = dir.path().join("search-only");
        fs::create_dir(&locked).unwrap();
        with_mode(&locked, 0o100);
        let handler = BuiltinHandler::with_home(None);
        let mut session = session_in(dir.path());

        let result = handler.cd(Some("search-only"), &mut session);
        with_mode(&locked, 0o755);

        assert_eq!(result.unwrap(), locked.canonicalize().unwrap());
        assert_eq!(session.working_directory(), locked.canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_cd_into_unsearchable_directory_is_denied() {
        // root passes every permission check
        if nix::unistd::geteuid().is_root() {
            return;
        }
        let dir = tempdir().unwrap();
        let locked = dir.path().join("read-only");
        fs::create_dir(&locked).unwrap();
        with_mode(&locked, 0o400);
        let handler = BuiltinHandler::with_home(None);
        let mut session = session_in(dir.path());
        let before = session.clone();

        let result = handler.cd(Some("read-only"), &mut session);
        with_mode(&locked, 0o755);

        assert!(matches!(
            result,
            Err(ShellError::DirectoryChange { reason: DirectoryChangeReason::PermissionDenied, .. })
        ));
        assert_eq!(session, before);
    }

    #[test]
    fn test_cd_without_argument_goes_home() {
        let home = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        let handler = BuiltinHandler::with_home(Some(home.path().to_path_buf()));
        let mut session = session_in(elsewhere.path());

        handler.cd(None, &mut session).unwrap();

        assert_eq!(session.working_directory(), home.path().canonicalize().unwrap());
    }

    #[test]
    fn test_cd_without_home_is_an_error() {
        let dir = tempdir().unwrap();
        let handler = BuiltinHandler::with_home(None);
        let mut session = session_in(dir.path());

        assert!(handler.cd(None, &mut session).is_err());
    }

    #[test]
    fn test_clear_and_exit_do_not_touch_session() {
        let dir = tempdir().unwrap();
        let handler = BuiltinHandler::with_home(None);
        let mut session = session_in(dir.path());
        let before = session.clone();

        assert_eq!(
            handler.handle(Builtin::Clear, None, &mut session).unwrap(),
            BuiltinOutcome::ClearOutput
        );
        assert_eq!(
            handler.handle(Builtin::Exit, None, &mut session).unwrap(),
            BuiltinOutcome::Terminate
        );
        assert_eq!(session, before);
    }
}

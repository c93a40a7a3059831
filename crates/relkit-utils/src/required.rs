//! Prerequisite checks that stop the script when something is missing

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{RelkitError, RequirementKind};
use crate::session::Session;

impl Session {
    /// Look a command up on the `PATH` children will see.
    #[must_use]
    pub fn which_command(&self, cmd: &str) -> Option<PathBuf> {
        let search_path = self.runner().env_var("PATH");
        resolve_command(cmd, search_path, std::env::current_dir().ok())
    }

    /// Fail unless `cmd` resolves on `PATH`.
    ///
    /// Logs `Found: {cmd}` when `required_verbose` is set.
    pub fn required_command(&mut self, cmd: &str, info: &str) -> Result<(), RelkitError> {
        let verbose = self.settings().required_verbose;
        self.required_command_verbose(cmd, info, verbose)
    }

    pub fn required_command_verbose(
        &mut self,
        cmd: &str,
        info: &str,
        verbose: bool,
    ) -> Result<(), RelkitError> {
        let found = self.which_command(cmd).is_some();
        self.require(RequirementKind::Command, cmd, info, verbose, found)
    }

    /// Fail unless `path` is an existing file.
    pub fn required_file(&mut self, path: &str, info: &str) -> Result<(), RelkitError> {
        let verbose = self.settings().required_verbose;
        self.required_file_verbose(path, info, verbose)
    }

    pub fn required_file_verbose(
        &mut self,
        path: &str,
        info: &str,
        verbose: bool,
    ) -> Result<(), RelkitError> {
        let found = Path::new(path).is_file();
        self.require(RequirementKind::File, path, info, verbose, found)
    }

    /// Fail unless `path` is an existing directory.
    pub fn required_folder(&mut self, path: &str, info: &str) -> Result<(), RelkitError> {
        let verbose = self.settings().required_verbose;
        self.required_folder_verbose(path, info, verbose)
    }

    pub fn required_folder_verbose(
        &mut self,
        path: &str,
        info: &str,
        verbose: bool,
    ) -> Result<(), RelkitError> {
        let found = Path::new(path).is_dir();
        self.require(RequirementKind::Folder, path, info, verbose, found)
    }

    fn require(
        &mut self,
        kind: RequirementKind,
        item: &str,
        info: &str,
        verbose: bool,
        found: bool,
    ) -> Result<(), RelkitError> {
        if !found {
            return Err(RelkitError::RequirementMissing {
                kind,
                item: item.to_string(),
                info: info.to_string(),
            });
        }
        if verbose {
            self.log_info(&format!("Found: {item}"))?;
        }
        Ok(())
    }
}

/// Relative names resolve against `cwd`, or `.` when it is unknown (for
/// example after the working directory was removed).
fn resolve_command(
    cmd: &str,
    search_path: Option<OsString>,
    cwd: Option<PathBuf>,
) -> Option<PathBuf> {
    let cwd = cwd.unwrap_or_else(|| PathBuf::from("."));
    which::which_in(cmd, search_path, cwd).ok()
}

#[cfg(test)]
mod tests {
    use super::resolve_command;
    use crate::error::{RelkitError, RequirementKind};
    use crate::session::Session;
    use relkit_config::Settings;
    use relkit_console::test_support::SharedBuffer;

    fn session(verbose: bool) -> (Session, SharedBuffer) {
        let out = SharedBuffer::new();
        let settings = Settings::builder().required_verbose(verbose).build().unwrap();
        (Session::with_writer(settings, out.clone()).unwrap(), out)
    }

    #[test]
    fn test_missing_file_error() {
        let (mut session, _out) = session(false);
        let err = session
            .required_file("/definitely/not/here.pem", "Missing AWS certificate file.")
            .unwrap_err();
        match &err {
            RelkitError::RequirementMissing { kind, item, .. } => {
                assert_eq!(*kind, RequirementKind::File);
                assert_eq!(item, "/definitely/not/here.pem");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "File '/definitely/not/here.pem' is required. Missing AWS certificate file."
        );
    }

    #[test]
    fn test_found_file_logs_when_verbose() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("key.pem");
        std::fs::write(&file, "x").unwrap();
        let file = file.to_str().unwrap().to_string();

        let (mut session, out) = session(true);
        session.required_file(&file, "").unwrap();
        assert_eq!(out.contents(), format!("· Found: {file}\n"));
    }

    #[test]
    fn test_found_folder_quiet_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, out) = session(false);
        session
            .required_folder(dir.path().to_str().unwrap(), "")
            .unwrap();
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn test_folder_check_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();
        let (mut session, _out) = session(false);
        assert!(session.required_folder(file.to_str().unwrap(), "").is_err());
    }

    #[test]
    fn test_missing_command() {
        let (mut session, _out) = session(false);
        let err = session
            .required_command("relkit-no-such-tool-xyz", "Install it first")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Command 'relkit-no-such-tool-xyz' is required. Install it first"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_command_lookup_honours_path_override() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("relkit-fake-tool");
        std::fs::write(&tool, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let (mut session, _out) = session(false);
        assert!(session.required_command("relkit-fake-tool", "").is_err());

        session.env_path_add([dir.path()]).unwrap();
        session.required_command("relkit-fake-tool", "").unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_command_without_cwd() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("relkit-fake-tool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found = resolve_command("relkit-fake-tool", Some(dir.path().into()), None);
        assert_eq!(found, Some(tool));
        assert_eq!(resolve_command("relkit-no-such-tool", Some(dir.path().into()), None), None);
    }
}

//! Zip archives through 7-Zip

use std::fs;

use relkit_runner::{CommandSpec, RunOptions, RunResult, Verbosity};
use relkit_utils::paths::dirname;
use relkit_utils::{RelkitError, Session};

/// `7z` invocation writing `src` into the zip archive `dst`, with progress and
/// regular output suppressed and errors on stdout.
#[must_use]
pub fn zip_command(dst: &str, src: &str) -> CommandSpec {
    CommandSpec::new("7z").args(["a", "-tzip", "-bso0", "-bsp0", "-bse1", dst, src])
}

/// Add `src` to the zip archive `dst`, creating the archive's directory first.
pub fn zip_it(session: &mut Session, dst: &str, src: &str) -> Result<RunResult, RelkitError> {
    let parent = dirname(dst);
    if !parent.is_empty() {
        fs::create_dir_all(&parent)?;
    }
    session.run(
        &zip_command(dst, src),
        &RunOptions::new().verbosity(Verbosity::Command),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use relkit_config::Settings;
    use relkit_console::test_support::SharedBuffer;

    #[test]
    fn test_zip_command_line() {
        assert_eq!(
            zip_command("dist/app.zip", "build/app").display(),
            "7z a -tzip -bso0 -bsp0 -bse1 dist/app.zip build/app"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_it_creates_parent_and_logs_command() {
        use std::os::unix::fs::PermissionsExt;

        let tools = tempfile::tempdir().unwrap();
        let fake = tools.path().join("7z");
        // Record the arguments instead of archiving
        std::fs::write(&fake, "#!/bin/sh\necho \"$@\" > \"$(dirname \"$6\")/args.txt\"\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let out_dir = tempfile::tempdir().unwrap();
        let dst = out_dir.path().join("nested/dist/app.zip");
        let dst = dst.to_str().unwrap();

        let buffer = SharedBuffer::new();
        let mut session = Session::with_writer(Settings::default(), buffer.clone()).unwrap();
        session.env_path_add([tools.path()]).unwrap();

        let result = zip_it(&mut session, dst, "build").unwrap();
        assert!(result.success());

        let args = std::fs::read_to_string(out_dir.path().join("nested/dist/args.txt")).unwrap();
        assert_eq!(args.trim(), format!("a -tzip -bso0 -bsp0 -bse1 {dst} build"));
        assert_eq!(
            buffer.contents(),
            format!("@ 7z a -tzip -bso0 -bsp0 -bse1 {dst} build\n")
        );
    }
}

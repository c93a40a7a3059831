//! Qt installation layout used for CMake configuration and deployment

use std::path::Path;

use relkit_utils::{GlobOptions, GlobSort, Platform, RelkitError, Session, os_glob, os_home};
use tracing::debug;

/// Where the Qt SDK and its deployment tool live on this host.
///
/// All fields are empty on platforms without a known layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QtInfo {
    /// Qt root, `{drive}/Qt` on Windows
    pub path: String,
    pub tools_path: String,
    pub plugins_path: String,
    /// Path of `windeployqt.exe` on Windows, the `macdeployqt` command on macOS
    pub deployqt: String,
    /// Extra `-D` definitions for CMake
    pub cmake_defs: Vec<String>,
}

impl QtInfo {
    /// Discover Qt for the running platform.
    ///
    /// On Windows the CMake and Ninja bundled with Qt are prepended to the
    /// session `PATH`.
    pub fn discover(session: &mut Session) -> Result<Self, RelkitError> {
        let platform = Platform::current();
        let root = match platform {
            Platform::Windows => format!("{}/Qt", home_drive()),
            _ => String::new(),
        };
        Self::discover_in(session, platform, &root)
    }

    /// Discovery against an explicit platform and Qt root. The root only
    /// matters for [`Platform::Windows`].
    pub fn discover_in(
        session: &mut Session,
        platform: Platform,
        qt_root: &str,
    ) -> Result<Self, RelkitError> {
        match platform {
            Platform::Windows => Self::discover_windows(session, qt_root),
            Platform::MacOs => {
                let deployqt = "macdeployqt".to_string();
                session.required_command(&deployqt, "")?;
                Ok(Self {
                    deployqt,
                    ..Self::default()
                })
            }
            Platform::Linux | Platform::Other => Ok(Self::default()),
        }
    }

    fn discover_windows(session: &mut Session, qt_root: &str) -> Result<Self, RelkitError> {
        session.required_folder(qt_root, "")?;
        let tools_path = format!("{qt_root}/Tools");
        session.required_folder(&tools_path, "")?;

        let version_path = os_glob(
            &format!("{qt_root}/*.*.*"),
            &GlobOptions {
                sort: GlobSort::VersionNumber,
                ..GlobOptions::default()
            },
        )?;
        let msvc_path = os_glob(
            &format!("{version_path}/msvc*_64"),
            &GlobOptions {
                reverse: true,
                ..GlobOptions::default()
            },
        )?;

        session.log_info(&format!("Using Qt Version {}", basename(&version_path)))?;
        session.log_info(&format!("Using MSVC Version {}", basename(&msvc_path)))?;

        let plugins_path = format!("{msvc_path}/plugins");
        session.required_folder(&plugins_path, "")?;
        let deployqt = format!("{msvc_path}/bin/windeployqt.exe");
        session.required_file(&deployqt, "")?;

        session.env_path_add([
            format!("{tools_path}/CMake_64/bin"),
            format!("{tools_path}/Ninja"),
        ])?;
        debug!(qt = %msvc_path, "qt layout discovered");

        Ok(Self {
            path: qt_root.to_string(),
            tools_path,
            plugins_path,
            deployqt,
            cmake_defs: vec![format!("-DCMAKE_PREFIX_PATH={msvc_path}/lib/cmake")],
        })
    }
}

/// `C:` from a home directory like `C:/Users/dev`, empty when there is none.
fn home_drive() -> String {
    os_home()
        .and_then(|home| home.find(':').map(|idx| home[..=idx].to_string()))
        .unwrap_or_default()
}

fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relkit_config::Settings;
    use relkit_console::test_support::SharedBuffer;
    use std::fs;

    fn session() -> (Session, SharedBuffer) {
        let out = SharedBuffer::new();
        (Session::with_writer(Settings::default(), out.clone()).unwrap(), out)
    }

    fn qt_tree() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Qt");
        for sub in [
            "Tools/CMake_64/bin",
            "Tools/Ninja",
            "6.5.3/msvc2019_64/plugins",
            "6.8.1/msvc2019_64/plugins",
            "6.8.1/msvc2022_64/plugins",
            "6.8.1/msvc2022_64/bin",
        ] {
            fs::create_dir_all(root.join(sub)).unwrap();
        }
        fs::write(root.join("6.8.1/msvc2022_64/bin/windeployqt.exe"), "").unwrap();
        let root = root.to_str().unwrap().replace('\\', "/");
        (dir, root)
    }

    #[test]
    fn test_windows_layout_picks_newest_version_and_msvc() {
        let (_dir, root) = qt_tree();
        let (mut session, out) = session();

        let qt = QtInfo::discover_in(&mut session, Platform::Windows, &root).unwrap();
        let msvc = format!("{root}/6.8.1/msvc2022_64");
        assert_eq!(qt.path, root);
        assert_eq!(qt.tools_path, format!("{root}/Tools"));
        assert_eq!(qt.plugins_path, format!("{msvc}/plugins"));
        assert_eq!(qt.deployqt, format!("{msvc}/bin/windeployqt.exe"));
        assert_eq!(qt.cmake_defs, vec![format!("-DCMAKE_PREFIX_PATH={msvc}/lib/cmake")]);

        assert_eq!(
            out.contents(),
            "· Using Qt Version 6.8.1\n· Using MSVC Version msvc2022_64\n"
        );

        let path = session.runner().env_var("PATH").unwrap();
        let mut entries = std::env::split_paths(&path);
        assert_eq!(
            entries.next().unwrap(),
            Path::new(&format!("{root}/Tools/CMake_64/bin"))
        );
        assert_eq!(entries.next().unwrap(), Path::new(&format!("{root}/Tools/Ninja")));
    }

    #[test]
    fn test_windows_layout_requires_root() {
        let (mut session, _out) = session();
        let err = QtInfo::discover_in(&mut session, Platform::Windows, "/definitely/missing/Qt")
            .unwrap_err();
        assert_eq!(err.to_string(), "Folder '/definitely/missing/Qt' is required.");
    }

    #[test]
    fn test_windows_layout_requires_deploy_tool() {
        let (_dir, root) = qt_tree();
        fs::remove_file(format!("{root}/6.8.1/msvc2022_64/bin/windeployqt.exe")).unwrap();
        let (mut session, _out) = session();
        let err = QtInfo::discover_in(&mut session, Platform::Windows, &root).unwrap_err();
        assert!(matches!(err, RelkitError::RequirementMissing { .. }));
    }

    #[test]
    fn test_other_platforms_are_empty() {
        let (mut session, out) = session();
        assert_eq!(
            QtInfo::discover_in(&mut session, Platform::Linux, "").unwrap(),
            QtInfo::default()
        );
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn test_macos_requires_macdeployqt() {
        let (mut session, _out) = session();
        session.runner_mut().set_env("PATH", "/definitely/missing/bin");
        let err = QtInfo::discover_in(&mut session, Platform::MacOs, "").unwrap_err();
        assert_eq!(err.to_string(), "Command 'macdeployqt' is required.");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("C:/Qt/6.8.1"), "6.8.1");
        assert_eq!(basename("msvc"), "msvc");
    }
}

use camino::{Utf8Path, Utf8PathBuf};
use std::fs::OpenOptions;

use crate::error::RelkitError;

// ============================================================================
// Platform
// ============================================================================

/// Host platform families relkit distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Other,
}

impl Platform {
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::MacOs => "darwin",
            Self::Other => "other",
        }
    }
}

// ============================================================================
// Well-known locations
// ============================================================================

/// Home directory with forward slashes.
#[must_use]
pub fn os_home() -> Option<String> {
    dirs::home_dir().map(|home| forward_slashes(&home.to_string_lossy()))
}

/// Create (or touch) `filename` in the system temp directory and return its
/// path.
pub fn os_tempfile(filename: &str) -> Result<Utf8PathBuf, RelkitError> {
    let dir = utf8(std::env::temp_dir())?;
    let path = dir.join(filename);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| RelkitError::TempFile { source })?;
    Ok(path)
}

/// Directory holding the running executable.
pub fn script_path() -> Result<Utf8PathBuf, RelkitError> {
    let exe = utf8(std::env::current_exe()?)?;
    Ok(exe
        .parent()
        .map(Utf8Path::to_path_buf)
        .unwrap_or_default())
}

fn utf8(path: std::path::PathBuf) -> Result<Utf8PathBuf, RelkitError> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| RelkitError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

pub(crate) fn forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

// ============================================================================
// macOS bundles and binary locations
// ============================================================================

/// Layout of a macOS application bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacBundle {
    pub bundle: Utf8PathBuf,
    pub contents: Utf8PathBuf,
    pub frameworks: Utf8PathBuf,
    pub bin: Utf8PathBuf,
}

/// Bundle paths for `app_name` under `start_path`.
///
/// With `is_bundle` the `.app/Contents/Frameworks` directories are created.
/// Without it every location is `start_path` itself, except `bin`.
pub fn mac_bundle(
    start_path: &str,
    app_name: &str,
    is_bundle: bool,
) -> Result<MacBundle, RelkitError> {
    if !is_bundle {
        return Ok(MacBundle {
            bundle: start_path.into(),
            contents: start_path.into(),
            frameworks: start_path.into(),
            bin: format!("{start_path}/{app_name}").into(),
        });
    }

    let bundle = format!("{start_path}/{app_name}.app");
    let contents = format!("{bundle}/Contents");
    let frameworks = format!("{contents}/Frameworks");
    let bin = format!("{contents}/MacOS/{app_name}");
    std::fs::create_dir_all(&frameworks)?;

    Ok(MacBundle {
        bundle: bundle.into(),
        contents: contents.into(),
        frameworks: frameworks.into(),
        bin: bin.into(),
    })
}

/// Where a built binary named `bin_name` lives under `start_path` on
/// `platform`. On macOS this is inside the app bundle (created on demand);
/// `macos_get_bundle` returns the bundle itself. `None` on other platforms.
pub fn os_binpath(
    platform: Platform,
    start_path: &str,
    bin_name: &str,
    macos_get_bundle: bool,
) -> Result<Option<Utf8PathBuf>, RelkitError> {
    let path = match platform {
        Platform::Windows => Utf8PathBuf::from(format!("{start_path}/{bin_name}.exe")),
        Platform::Linux => Utf8PathBuf::from(format!("{start_path}/{bin_name}")),
        Platform::MacOs => {
            let mac = mac_bundle(start_path, bin_name, true)?;
            if macos_get_bundle { mac.bundle } else { mac.bin }
        }
        Platform::Other => return Ok(None),
    };
    Ok(Some(path))
}

// ============================================================================
// String path arithmetic
// ============================================================================

/// Directory part of `path`, like POSIX `dirname` on the string.
///
/// Both `/` and `\` separate components. Trailing separators of the result
/// are removed unless it is made only of separators.
#[must_use]
pub fn dirname(path: &str) -> String {
    let cut = path.rfind(['/', '\\']).map_or(0, |idx| idx + 1);
    let head = &path[..cut];
    if !head.is_empty() && !head.chars().all(|c| c == '/' || c == '\\') {
        head.trim_end_matches(['/', '\\']).to_string()
    } else {
        head.to_string()
    }
}

/// Apply [`dirname`] `levels_up` times (at least once).
#[must_use]
pub fn os_parent(path: &str, levels_up: usize) -> String {
    (1..levels_up.max(1)).fold(dirname(path), |parent, _| dirname(&parent))
}

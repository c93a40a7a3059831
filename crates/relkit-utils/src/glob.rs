//! Filesystem glob returning the single best match

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use globset::GlobBuilder;
use tracing::debug;

use crate::error::RelkitError;
use crate::paths::forward_slashes;

/// Ordering applied to glob matches before the first one is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlobSort {
    /// Directory order, as returned by the filesystem
    None,
    /// Lexicographic on the whole path
    #[default]
    Alpha,
    /// Dotted numeric version of the last component, newest first
    VersionNumber,
}

/// Options for [`os_glob`]
#[derive(Debug, Clone, Default)]
pub struct GlobOptions {
    pub sort: GlobSort,
    /// Reverse the order. Always on for [`GlobSort::VersionNumber`].
    pub reverse: bool,
    /// Appended to the failure message
    pub info: String,
}

/// All paths matching `pattern`, unsorted, in directory listing order.
///
/// Each `/`-separated component is matched on its own, so `*` never crosses a
/// directory. Hidden entries only match components that start with `.`.
pub fn glob_paths(pattern: &str) -> Result<Vec<String>, RelkitError> {
    let normalized = forward_slashes(pattern);
    if normalized.is_empty() {
        return Ok(Vec::new());
    }

    let mut candidates = vec![if normalized.starts_with('/') {
        "/".to_string()
    } else {
        String::new()
    }];

    for part in normalized.split('/').filter(|part| !part.is_empty()) {
        let mut next = Vec::new();

        if has_glob_meta(part) {
            let matcher = GlobBuilder::new(part)
                .literal_separator(true)
                .build()
                .map_err(|err| RelkitError::InvalidGlob {
                    pattern: pattern.to_string(),
                    reason: err.kind().to_string(),
                })?
                .compile_matcher();

            for base in &candidates {
                let dir = if base.is_empty() { "." } else { base.as_str() };
                let Ok(entries) = fs::read_dir(dir) else {
                    continue;
                };
                let names: Vec<String> = entries
                    .flatten()
                    .filter_map(|entry| entry.file_name().into_string().ok())
                    .filter(|name| !name.starts_with('.') || part.starts_with('.'))
                    .filter(|name| matcher.is_match(name))
                    .collect();
                next.extend(names.into_iter().map(|name| join(base, &name)));
            }
        } else {
            for base in &candidates {
                let path = join(base, part);
                if Path::new(&path).exists() {
                    next.push(path);
                }
            }
        }

        candidates = next;
        if candidates.is_empty() {
            break;
        }
    }

    candidates.retain(|candidate| !candidate.is_empty());
    Ok(candidates)
}

/// First path matching `pattern` after sorting, with forward slashes.
///
/// # Errors
///
/// [`RelkitError::GlobNoMatch`] when nothing matches.
pub fn os_glob(pattern: &str, options: &GlobOptions) -> Result<String, RelkitError> {
    let mut matches = glob_paths(pattern)?;
    debug!(pattern, matches = matches.len(), sort = ?options.sort, "glob expanded");

    match options.sort {
        GlobSort::None => {}
        GlobSort::Alpha => {
            matches.sort();
            if options.reverse {
                matches.reverse();
            }
        }
        GlobSort::VersionNumber => {
            matches.sort_by(|a, b| compare_versions(a, b).reverse());
        }
    }

    matches
        .into_iter()
        .next()
        .map(|path| forward_slashes(&path))
        .ok_or_else(|| RelkitError::GlobNoMatch {
            pattern: pattern.to_string(),
            info: options.info.clone(),
        })
}

fn has_glob_meta(part: &str) -> bool {
    part.contains(['*', '?', '[', '{'])
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// Numeric segments of the last path component; non-numeric segments count
/// as 0.
fn version_key(path: &str) -> Vec<u64> {
    path.rsplit('/')
        .next()
        .unwrap_or(path)
        .split('.')
        .map(|segment| segment.parse().unwrap_or(0))
        .collect()
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    version_key(a).cmp(&version_key(b))
}

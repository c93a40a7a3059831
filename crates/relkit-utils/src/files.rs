//! File copying and content sniffing

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::error::RelkitError;
use crate::session::Session;

/// Read up to `chunk_size` bytes and report whether the share of NUL bytes
/// exceeds `null_byte_threshold`.
///
/// Missing, unreadable and empty files are not binary.
#[must_use]
pub fn file_is_binary(path: impl AsRef<Path>, chunk_size: usize, null_byte_threshold: f64) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut chunk = Vec::with_capacity(chunk_size);
    if file.take(chunk_size as u64).read_to_end(&mut chunk).is_err() || chunk.is_empty() {
        return false;
    }

    let nulls = chunk.iter().filter(|byte| **byte == 0).count();
    nulls as f64 / chunk.len() as f64 > null_byte_threshold
}

/// [`file_is_binary`] with a 1024 byte chunk and a 10% threshold.
#[must_use]
pub fn file_is_binary_default(path: impl AsRef<Path>) -> bool {
    file_is_binary(path, 1024, 0.1)
}

fn copy_dir_all(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

impl Session {
    /// Copy a file or a directory tree, logging what is copied.
    ///
    /// Directories merge into existing destinations. With `only_content` the
    /// directory's entries land directly in `dst`, otherwise in
    /// `dst/<name of src>`. A file copied onto an existing directory keeps its
    /// name inside that directory.
    pub fn os_copy_to(
        &mut self,
        src: &str,
        dst: &str,
        only_content: bool,
    ) -> Result<(), RelkitError> {
        let src_path = Path::new(src);

        if src_path.is_dir() {
            self.log_info(&format!("Copying dir: {src} -> {dst}"))?;
            let target = if only_content {
                Path::new(dst).to_path_buf()
            } else {
                let name = src_path.file_name().unwrap_or_default();
                Path::new(dst).join(name)
            };
            copy_dir_all(src_path, &target)?;
        } else {
            self.log_info(&format!("Copying file: {src} -> {dst}"))?;
            let dst_path = Path::new(dst);
            let target = match (dst_path.is_dir(), src_path.file_name()) {
                (true, Some(name)) => dst_path.join(name),
                _ => dst_path.to_path_buf(),
            };
            fs::copy(src_path, target)?;
        }

        Ok(())
    }
}

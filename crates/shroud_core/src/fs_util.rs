use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Replaces the contents of `path` with `content` in one step.
///
/// The content goes to a sibling `.tmp` file that is flushed to disk and then
/// renamed over `path`, so readers see either the old blob or the new one.
/// Missing parent directories are created. On failure the temporary file is
/// removed and `path` is untouched.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let staged = path.with_extension("tmp");
    let result = stage(&staged, content.as_bytes()).and_then(|()| fs::rename(&staged, path));
    if result.is_err() {
        let _ = fs::remove_file(&staged);
    }
    result
}

/// Writes and syncs `bytes`; the handle is closed on return so the file can
/// be renamed on every platform.
fn stage(staged: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(staged)?;
    file.write_all(bytes)?;
    file.sync_all()
}

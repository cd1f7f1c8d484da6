//! File I/O around the overlay engine.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Read a source file as raw bytes.
pub fn read_source(path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the target is left untouched.
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> io::Result<()> {
    let path = path.as_ref();

    // Same directory keeps the rename on one filesystem.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        }
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

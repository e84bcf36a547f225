pub mod json_io;

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Stages `content` in the target directory, then renames it over `path`.
pub(crate) fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(content.as_bytes())?;
    staged.as_file().sync_all()?;

    staged.persist(path).map(|_| ()).or_else(|err| {
        if err.error.kind() != io::ErrorKind::AlreadyExists {
            return Err(err.error);
        }
        std::fs::remove_file(path)?;
        err.file.persist(path).map(|_| ()).map_err(|e| e.error)
    })
}

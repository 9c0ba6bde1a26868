//! Persisting the artifact.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WriteError;

/// Write `content` to `file_name` inside `package_dir`, replacing any previous artifact.
///
/// Returns the absolute path that was written.
pub fn write_artifact(package_dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, WriteError> {
    let path = package_dir.join(file_name);
    fs::write(&path, content).map_err(|source| WriteError {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let path = write_artifact(dir.path(), "method_gen.rs", "// generated\n").unwrap();

        assert_eq!(path, dir.path().join("method_gen.rs"));
        assert_eq!(fs::read_to_string(path).unwrap(), "// generated\n");
    }

    #[test]
    fn test_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("method_gen.rs"), "a much longer previous artifact\n").unwrap();

        let path = write_artifact(dir.path(), "method_gen.rs", "new\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "new\n");
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("removed");

        let err = write_artifact(&gone, "method_gen.rs", "x").unwrap_err();
        assert_eq!(err.path, gone.join("method_gen.rs"));
    }
}

//! I/O utility functions

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write content to a file atomically using write-then-rename pattern.
///
/// The content is first written to `<path>.tmp`, then renamed over the
/// target, so readers never observe a half-written result file.
///
/// # Example
/// ```ignore
/// atomic_write(Path::new("results/base.json"), &json)?;
/// ```
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp = temp_path(path);
    fs::write(&temp, content)?;
    // Atomic on POSIX systems
    fs::rename(&temp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.json");

        atomic_write(&path, "{\"npv\": 1.0}\n").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\"npv\": 1.0}\n");

        // Temp file should not exist
        assert!(!dir.path().join("result.json.tmp").exists());
    }

    #[test]
    fn test_atomic_write_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.yaml");

        atomic_write(&path, "first").unwrap();
        atomic_write(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_atomic_write_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("result.json");
        assert!(atomic_write(&path, "{}").is_err());
    }
}

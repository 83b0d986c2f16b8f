//! Atomic replacement of collection files.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Write `data` to `destination` through a synced sibling temp file.
///
/// Readers never observe a partially written destination. The temp file is
/// removed if any step fails.
///
/// # Errors
///
/// Returns an error if the temp file cannot be written or moved into place.
pub fn write_atomic(destination: &Path, data: &[u8]) -> io::Result<()> {
    let temp_path = temp_sibling(destination)?;

    let result = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .and_then(|mut file| {
            file.write_all(data)?;
            file.sync_all()
        })
        .and_then(|()| move_into_place(&temp_path, destination));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Rename `temp_path` over `destination`.
///
/// Where rename refuses an existing target, the target is removed and the
/// rename attempted once more.
fn move_into_place(temp_path: &Path, destination: &Path) -> io::Result<()> {
    let Err(first) = fs::rename(temp_path, destination) else {
        return Ok(());
    };
    if !destination.exists() {
        return Err(first);
    }
    fs::remove_file(destination)?;
    fs::rename(temp_path, destination).map_err(|second| {
        io::Error::new(
            second.kind(),
            format!(
                "Replacing {} failed ({}; after removal: {})",
                destination.display(),
                first,
                second
            ),
        )
    })
}

fn temp_sibling(destination: &Path) -> io::Result<PathBuf> {
    let filename = destination
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid file name"))?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("System time error: {}", e)))?
        .as_nanos();
    let temp_name = format!("{}.{}.tmp", filename, nanos);

    Ok(match destination.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn temp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[test]
    fn test_write_atomic_creates_destination() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("ProductsPriceHistory.json");

        write_atomic(&dest, b"[{\"ProductID\":1}]").unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "[{\"ProductID\":1}]");
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("Products.json");

        fs::write(&dest, b"old").unwrap();
        write_atomic(&dest, b"[]").unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "[]");
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[test]
    fn test_write_atomic_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("missing").join("Products.json");

        assert!(write_atomic(&dest, b"[]").is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn test_write_atomic_onto_directory_cleans_up() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("Products.json");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("keep"), b"x").unwrap();

        assert!(write_atomic(&dest, b"[]").is_err());
        assert!(dest.is_dir());
        assert_eq!(temp_files(dir.path()), 0);
    }
}

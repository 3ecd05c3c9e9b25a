//! Rotating file writer with size-based rotation and backup retention.
//!
//! Both the human-readable log and the OTLP trace file go through [`FileWriter`].
//! When a file grows past its size limit it is renamed with a timestamp suffix and
//! a fresh file is started; only the newest backups are kept.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Maximum file size before rotation (10 MB).
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of backup files to retain after rotation.
pub const MAX_BACKUP_FILES: usize = 3;

/// Thread-safe rotating file writer.
///
/// The file is opened lazily on the first write, so construction never fails.
/// Clones share the same handle.
///
/// # Example
///
/// ```no_run
/// use bookshelf::observability::FileWriter;
///
/// let writer = FileWriter::new("/tmp/bookshelf-otlp.json".into());
/// writer.write_line(r#"{"trace": "data"}"#)?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Clone)]
pub struct FileWriter {
    inner: Arc<Inner>,
}

struct Inner {
    file_path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    file: Mutex<Option<File>>,
}

impl FileWriter {
    /// Creates a writer with the default limits.
    #[must_use]
    pub fn new(file_path: PathBuf) -> Self {
        Self::with_limits(file_path, MAX_FILE_SIZE_BYTES, MAX_BACKUP_FILES)
    }

    /// Creates a writer that rotates once the file exceeds `max_bytes` and keeps
    /// `max_backups` rotated files.
    #[must_use]
    pub fn with_limits(file_path: PathBuf, max_bytes: u64, max_backups: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                file_path,
                max_bytes,
                max_backups,
                file: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.file_path
    }

    /// Writes `line` followed by a newline, rotating first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if rotation, opening or writing fails, or if the lock is
    /// poisoned.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        self.append(&buf)
    }

    fn append(&self, bytes: &[u8]) -> io::Result<()> {
        let inner = &self.inner;
        let mut file = inner
            .file
            .lock()
            .map_err(|e| io::Error::other(format!("Mutex poisoned: {e}")))?;

        if fs::metadata(&inner.file_path).is_ok_and(|m| m.len() > inner.max_bytes) {
            *file = None;
            inner.rotate()?;
        }

        if file.is_none() {
            *file = Some(OpenOptions::new().create(true).append(true).open(&inner.file_path)?);
        }

        let handle = file.as_mut().ok_or_else(|| io::Error::other("No file available"))?;
        handle.write_all(bytes)?;
        handle.flush()
    }
}

impl Inner {
    /// Renames the current file to `<name>.<unix_timestamp>` and prunes old backups.
    fn rotate(&self) -> io::Result<()> {
        let timestamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();

        let mut backup = self.file_path.clone().into_os_string();
        backup.push(format!(".{timestamp}"));

        if self.file_path.exists() {
            fs::rename(&self.file_path, PathBuf::from(backup))?;
        }

        self.prune_backups()
    }

    fn prune_backups(&self) -> io::Result<()> {
        let parent = self
            .file_path
            .parent()
            .ok_or_else(|| io::Error::other("No parent directory"))?;
        let name = self
            .file_path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| io::Error::other("Invalid file name"))?;
        let prefix = format!("{name}.");

        let mut backups: Vec<PathBuf> = fs::read_dir(parent)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.strip_prefix(&prefix).is_some_and(|s| s.parse::<i64>().is_ok()))
            })
            .collect();

        // Suffixes are timestamps: newest first.
        backups.sort_by(|a, b| b.cmp(a));

        for old in backups.iter().skip(self.max_backups) {
            let _ = fs::remove_file(old);
        }
        Ok(())
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("file_path", &self.inner.file_path)
            .field("max_bytes", &self.inner.max_bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backups(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("trace.json."))
            .count()
    }

    #[test]
    fn writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let writer = FileWriter::new(path.clone());

        writer.write_line("one").unwrap();
        writer.write_line("two").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn rotates_and_keeps_bounded_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let writer = FileWriter::with_limits(path.clone(), 8, 2);

        for i in 0..6 {
            writer.write_line(&format!("line-number-{i}")).unwrap();
        }

        assert!(backups(dir.path()) <= 2);
        assert_eq!(fs::read_to_string(path).unwrap(), "line-number-5\n");
    }
}

//! State file access
//!
//! The page is read once per run and replaced in a single rename, so readers
//! never observe a half-written file. An advisory lock on a sibling `.lock`
//! file keeps two runs from updating the same page at once; the OS drops it
//! when the holding process exits, however it exits.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::error::{Result, TrackerError};

/// Starter page with both regions and an empty record array
pub const PAGE_TEMPLATE: &str = include_str!("../templates/tracker.html");

pub fn read_state(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        TrackerError::Io(std::io::Error::new(
            e.kind(),
            format!("reading {}: {e}", path.display()),
        ))
    })
}

/// Write `contents` to a temp file beside `path`, then rename it into place
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    // Temp files are created 0600; keep whatever mode the page already had
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| TrackerError::Io(e.error))?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "State file replaced");
    Ok(())
}

/// Create a fresh tracker page from the embedded template
pub fn init_page(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(TrackerError::StateExists(path.to_path_buf()));
    }
    write_atomic(path, PAGE_TEMPLATE)
}

fn lock_path(state_path: &Path) -> PathBuf {
    let mut name = OsString::from(state_path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Exclusive claim on a state file for the duration of a run
///
/// The lock file itself is left in place; only the lock on it matters.
#[derive(Debug)]
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl StateLock {
    pub fn acquire(state_path: &Path) -> Result<Self> {
        let path = lock_path(state_path);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                return Err(TrackerError::AlreadyRunning(path));
            }
            return Err(e.into());
        }

        // Holder's pid, for whoever inspects the file
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;

        tracing::debug!(lock = %path.display(), "Acquired state lock");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

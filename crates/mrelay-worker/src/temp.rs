//! Per-job temporary files.
//!
//! A [`TempSet`] owns every path a job allocates. [`TempSet::cleanup`]
//! removes them once; if the set is dropped without cleanup (for example a
//! cancelled request future), `Drop` removes them synchronously instead.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// What a temporary file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempRole {
    Input,
    Subtitle,
    Output,
}

impl TempRole {
    /// File name prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            TempRole::Input => "in",
            TempRole::Subtitle => "sub",
            TempRole::Output => "out",
        }
    }
}

/// Owning guard over a job's temporary paths.
#[derive(Debug)]
pub struct TempSet {
    dir: PathBuf,
    paths: Vec<PathBuf>,
    released: bool,
}

impl TempSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            paths: Vec::new(),
            released: false,
        }
    }

    /// Reserve a unique path named `<role>_<millis>_<seq>.<ext>`.
    ///
    /// Nothing is created on disk.
    pub fn allocate(&mut self, role: TempRole, ext: &str) -> PathBuf {
        let millis = chrono::Utc::now().timestamp_millis();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let path = self
            .dir
            .join(format!("{}_{}_{}.{}", role.as_str(), millis, seq, ext));
        self.paths.push(path.clone());
        path
    }

    /// Remove every allocated path. Returns how many files existed.
    pub async fn cleanup(mut self) -> usize {
        let mut removed = 0;
        for path in &self.paths {
            match tokio::fs::remove_file(path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), "Failed to remove temp file: {}", e),
            }
        }
        self.released = true;
        debug!(removed, allocated = self.paths.len(), "Released temp files");
        removed
    }
}

impl Drop for TempSet {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        for path in &self.paths {
            remove_blocking(path);
        }
    }
}

fn remove_blocking(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed temp file on drop"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Failed to remove temp file: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_allocate_unique_names() {
        let dir = TempDir::new().unwrap();
        let mut set = TempSet::new(dir.path());
        let a = set.allocate(TempRole::Input, "mp4");
        let b = set.allocate(TempRole::Input, "mp4");
        let sub = set.allocate(TempRole::Subtitle, "srt");

        assert_ne!(a, b);
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("in_"));
        assert!(name.ends_with(".mp4"));
        assert!(sub.file_name().unwrap().to_str().unwrap().starts_with("sub_"));
        assert_eq!(set.paths.len(), 3);
        assert!(!a.exists());
    }

    #[tokio::test]
    async fn test_cleanup_removes_existing_and_ignores_missing() {
        let dir = TempDir::new().unwrap();
        let mut set = TempSet::new(dir.path());
        let written = set.allocate(TempRole::Output, "mp4");
        let _never_written = set.allocate(TempRole::Input, "mp4");
        std::fs::write(&written, b"x").unwrap();

        assert_eq!(set.cleanup().await, 1);
        assert!(!written.exists());
    }

    #[test]
    fn test_drop_removes_files() {
        let dir = TempDir::new().unwrap();
        let path = {
            let mut set = TempSet::new(dir.path());
            let path = set.allocate(TempRole::Input, "mp4");
            std::fs::write(&path, b"x").unwrap();
            path
        };
        assert!(!path.exists());
    }
}

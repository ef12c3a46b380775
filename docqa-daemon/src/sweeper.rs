//! Periodic cleanup of old uploads and idle sessions.
//!
//! Runs independently of request handling; answering never depends on
//! whether or when a sweep happened.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use docqa_core::SessionStore;
use tokio::time;
use tracing::{debug, info, warn};

/// Uploads older than this are deleted.
pub const DEFAULT_FILE_MAX_AGE: Duration = Duration::from_secs(3600);

/// Counts from one sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub files_removed: usize,
    pub sessions_expired: usize,
}

pub struct Sweeper {
    upload_dir: PathBuf,
    file_max_age: Duration,
    sessions: Arc<dyn SessionStore>,
    session_ttl: Duration,
}

impl Sweeper {
    pub fn new(
        upload_dir: PathBuf,
        file_max_age: Duration,
        sessions: Arc<dyn SessionStore>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            upload_dir,
            file_max_age,
            sessions,
            session_ttl,
        }
    }

    /// Run one sweep over the upload directory and the session store.
    pub async fn sweep(&self) -> SweepReport {
        let sessions_expired = self.expire_sessions().await;
        let files_removed = match self.sweep_files().await {
            Ok(n) => n,
            Err(e) => {
                warn!("Upload sweep failed: {}", e);
                0
            }
        };

        SweepReport {
            files_removed,
            sessions_expired,
        }
    }

    /// Sweep once, then every `interval`, forever.
    pub async fn run(self, interval: Duration) {
        let mut ticker = time::interval(interval);
        loop {
            ticker.tick().await;
            let report = self.sweep().await;
            if report.files_removed > 0 || report.sessions_expired > 0 {
                info!(
                    "Sweep removed {} files, expired {} sessions",
                    report.files_removed, report.sessions_expired
                );
            } else {
                debug!("Sweep found nothing to remove");
            }
        }
    }

    async fn sweep_files(&self) -> Result<usize> {
        if !tokio::fs::try_exists(&self.upload_dir).await.unwrap_or(false) {
            return Ok(0);
        }

        let cutoff = SystemTime::now()
            .checked_sub(self.file_max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.upload_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    warn!("Failed to stat {:?}: {}", path, e);
                    continue;
                }
            };

            let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
            if modified >= cutoff {
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    info!("Cleaned up old file: {:?}", path.file_name().unwrap_or_default());
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove file {:?}: {}", path, e),
            }
        }

        Ok(removed)
    }

    async fn expire_sessions(&self) -> usize {
        let expired = self.sessions.list_expired(self.session_ttl);
        for id in &expired {
            let Some(session) = self.sessions.delete(id) else {
                continue;
            };
            for path in &session.files {
                if let Err(e) = tokio::fs::remove_file(path).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to remove file {:?}: {}", path, e);
                    }
                }
            }
            debug!("Expired session {}", id);
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::InMemorySessionStore;

    fn store() -> Arc<dyn SessionStore> {
        Arc::new(InMemorySessionStore::new())
    }

    #[tokio::test]
    async fn test_fresh_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fresh.pdf"), b"x").unwrap();

        let sweeper = Sweeper::new(
            dir.path().to_path_buf(),
            DEFAULT_FILE_MAX_AGE,
            store(),
            Duration::from_secs(3600),
        );
        let report = sweeper.sweep().await;
        assert_eq!(report.files_removed, 0);
        assert!(dir.path().join("fresh.pdf").exists());
    }

    #[tokio::test]
    async fn test_old_files_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.pdf"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        // Zero max age: everything already written is "old"
        let sweeper = Sweeper::new(
            dir.path().to_path_buf(),
            Duration::ZERO,
            store(),
            Duration::from_secs(3600),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        let report = sweeper.sweep().await;
        assert_eq!(report.files_removed, 1);
        assert!(!dir.path().join("old.pdf").exists());
        assert!(dir.path().join("nested").exists());
    }

    #[tokio::test]
    async fn test_expired_sessions_lose_their_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("abcdef1234_1_doc.pdf");
        std::fs::write(&file, b"x").unwrap();

        let sessions = store();
        sessions.add_file("abcdef1234", file.clone());
        sessions.set_context("abcdef1234", "some text".to_string());

        let sweeper = Sweeper::new(
            dir.path().to_path_buf(),
            DEFAULT_FILE_MAX_AGE,
            sessions.clone(),
            Duration::ZERO,
        );
        let report = sweeper.sweep().await;
        assert_eq!(report.sessions_expired, 1);
        assert!(sessions.get("abcdef1234").is_none());
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_missing_upload_dir() {
        let sweeper = Sweeper::new(
            PathBuf::from("/nonexistent/docqa-uploads"),
            Duration::ZERO,
            store(),
            Duration::from_secs(3600),
        );
        assert_eq!(sweeper.sweep().await, SweepReport::default());
    }
}

//! Persistent grammers session. Keeps the login across weekly runs.

use crate::domain::DomainError;
use grammers_session::storages::SqliteSession;
use std::path::{Path, PathBuf};

/// Relative session paths are anchored at `work_dir`; absolute ones are kept.
pub fn session_file(work_dir: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        work_dir.join(configured)
    }
}

/// Open (or create) the SQLite session file, creating missing parent directories.
pub async fn open_file_session(path: &Path) -> Result<SqliteSession, DomainError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DomainError::Io(format!("session dir {}: {}", parent.display(), e)))?;
    }
    SqliteSession::open(path)
        .await
        .map_err(|e| DomainError::Telegram(format!("open session {}: {}", path.display(), e)))
}

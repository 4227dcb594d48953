//! Flat JSON log of social posts.
//!
//! The whole array is read and rewritten on every append. Appends within a
//! process are serialized and the rewrite is an atomic rename, but two
//! processes appending at once can still lose a record.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::SocialPostRecord;
use crate::Result;

pub struct TweetLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TweetLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record in call order; an absent file is an empty log.
    pub async fn load(&self) -> Result<Vec<SocialPostRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Append one record, rewriting the file.
    pub async fn append(&self, record: SocialPostRecord) -> Result<usize> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load().await?;
        records.push(record);

        let json = serde_json::to_vec_pretty(&records)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        replace_file(&self.path, json).await?;

        debug!(path = %self.path.display(), entries = records.len(), "Tweet log rewritten");
        Ok(records.len())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "tweets_log.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `bytes` to a sibling temporary file and rename it over `path`.
/// The temporary file is removed if either step fails.
async fn replace_file(path: &Path, bytes: Vec<u8>) -> Result<()> {
    let tmp = tmp_path(path);

    let written = match tokio::fs::write(&tmp, bytes).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temporary log file");
            }
        }
        return Err(e.into());
    }

    Ok(())
}

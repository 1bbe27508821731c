//! URL-keyed file cache.
//!
//! One file per cached URL under a configured root directory; the filename
//! is the percent-encoded full URL string, flat, with no extension. Entries
//! are never deleted automatically: staleness is judged by the caller's
//! max-age, not enforced here.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Cache freshness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAge {
    /// Cached entries never expire.
    Forever,
    /// Cached entries are always treated as stale.
    AlwaysStale,
    /// Entries older than this many seconds are stale.
    Seconds(u64),
}

impl CacheAge {
    /// Interpret the configured `max_cache_age` value:
    /// `-1` forever, `0` always stale, positive N seconds.
    pub fn from_config(max_cache_age: i64) -> Self {
        match max_cache_age {
            i64::MIN..=-1 => Self::Forever,
            0 => Self::AlwaysStale,
            n => Self::Seconds(n as u64),
        }
    }

    /// Whether an entry with the given modification time is still fresh.
    pub fn is_fresh(&self, mtime: Option<SystemTime>, now: SystemTime) -> bool {
        let Some(mtime) = mtime else {
            return false;
        };
        match self {
            Self::Forever => true,
            Self::AlwaysStale => false,
            Self::Seconds(max) => match now.duration_since(mtime) {
                Ok(age) => age < Duration::from_secs(*max),
                // mtime in the future counts as fresh
                Err(_) => true,
            },
        }
    }
}

/// Payload encoding, selected from the URL before the request is made and
/// applied to both the network read and the cache read/write so bytes
/// round-trip exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Text,
    Binary,
}

impl PayloadKind {
    /// Choose the encoding from the URL's file extension.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        match path.rsplit('.').next() {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Self::Binary,
            _ => Self::Text,
        }
    }
}

/// File-backed cache keyed by source URL.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a cache store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Deterministic cache file path for a URL: the percent-encoded full
    /// URL string placed directly under the root.
    pub fn file_path(&self, url: &str) -> PathBuf {
        self.root.join(urlencoding::encode(url).as_ref())
    }

    /// Modification time of the cached entry, `None` when absent.
    pub async fn modified_time(&self, url: &str) -> Option<SystemTime> {
        let meta = tokio::fs::metadata(self.file_path(url)).await.ok()?;
        if !meta.is_file() {
            return None;
        }
        meta.modified().ok()
    }

    /// Read the cached payload for a URL.
    ///
    /// Text entries are decoded as UTF-8 so a corrupt cache file surfaces
    /// here instead of downstream.
    pub async fn read(&self, url: &str, kind: PayloadKind) -> Result<Vec<u8>> {
        let path = self.file_path(url);
        let bytes = tokio::fs::read(&path).await?;
        if kind == PayloadKind::Text {
            String::from_utf8(bytes.clone()).map_err(|e| {
                AppError::validation(format!("cache file {} is not UTF-8: {e}", path.display()))
            })?;
        }
        Ok(bytes)
    }

    /// Persist a payload for a URL, atomically (temp file + rename).
    pub async fn write(&self, url: &str, bytes: &[u8]) -> Result<()> {
        let path = self.file_path(url);
        self.ensure_root().await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_path_percent_encodes_full_url() {
        let store = CacheStore::new("/tmp/cache");
        let path = store.file_path("https://example.com/exam?sem=1");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name, "https%3A%2F%2Fexample.com%2Fexam%3Fsem%3D1");
        assert_eq!(path.parent().unwrap(), Path::new("/tmp/cache"));
    }

    #[test]
    fn payload_kind_from_extension() {
        assert_eq!(
            PayloadKind::from_url("https://x.test/a/Semester_1_by_Date.pdf"),
            PayloadKind::Binary
        );
        assert_eq!(
            PayloadKind::from_url("https://x.test/a.PDF?x=1"),
            PayloadKind::Binary
        );
        assert_eq!(
            PayloadKind::from_url("https://x.test/modules.json"),
            PayloadKind::Text
        );
        assert_eq!(PayloadKind::from_url("https://x.test/page"), PayloadKind::Text);
    }

    #[test]
    fn cache_age_rules() {
        let now = SystemTime::now();
        let old = now - Duration::from_secs(100);

        assert!(CacheAge::from_config(-1).is_fresh(Some(old), now));
        assert!(!CacheAge::from_config(0).is_fresh(Some(old), now));
        assert!(CacheAge::from_config(200).is_fresh(Some(old), now));
        assert!(!CacheAge::from_config(50).is_fresh(Some(old), now));
        assert!(!CacheAge::from_config(3600).is_fresh(None, now));
    }

    #[tokio::test]
    async fn write_then_read_round_trips_binary() {
        let tmp = TempDir::new().unwrap();
        let store = CacheStore::new(tmp.path());
        let url = "https://example.com/exam.pdf";
        let payload = vec![0x25, 0x50, 0x44, 0x46, 0x00, 0xff];

        store.write(url, &payload).await.unwrap();
        let read = store.read(url, PayloadKind::Binary).await.unwrap();
        assert_eq!(read, payload);
    }

    #[tokio::test]
    async fn missing_entry_has_no_mtime() {
        let tmp = TempDir::new().unwrap();
        let store = CacheStore::new(tmp.path());
        assert!(store.modified_time("https://example.com/x").await.is_none());
    }
}

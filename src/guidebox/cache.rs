use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::*;
use serde_json::Value;
use tokio::fs;

use super::FetchError;

/// Directory of raw guidebox responses, one file per request.
///
/// Files are named by the md5 of the canonical `path?query` string. Entries are
/// never expired.
#[derive(Clone, Debug)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ResponseCache { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key(request: &str) -> String {
        format!("{:x}", md5::compute(request.as_bytes()))
    }

    fn entry_path(&self, request: &str) -> PathBuf {
        self.dir.join(Self::key(request))
    }

    /// Returns `None` on a miss. An entry that no longer parses is reported and
    /// treated as a miss so the next write replaces it.
    pub async fn get(&self, request: &str) -> Result<Option<Value>, FetchError> {
        let path = self.entry_path(request);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!("Ignoring unreadable cache entry {}: {}", path.display(), err);
                Ok(None)
            }
        }
    }

    pub async fn put(&self, request: &str, value: &Value) -> Result<(), FetchError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.entry_path(request);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(value)?).await?;
        fs::rename(&tmp, &path).await?;
        debug!("Cached {} as {}", request, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_is_md5_hex() {
        assert_eq!(ResponseCache::key("abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(ResponseCache::key("shows/1").len(), 32);
        assert_ne!(ResponseCache::key("shows/1"), ResponseCache::key("shows/2"));
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path().join("nested"));

        assert_eq!(cache.get("shows/1").await.unwrap(), None);

        let body = json!({"id": 1, "title": "Billions"});
        cache.put("shows/1", &body).await.unwrap();
        assert_eq!(cache.get("shows/1").await.unwrap(), Some(body));
        assert!(cache.dir().join(ResponseCache::key("shows/1")).exists());
    }

    #[tokio::test]
    async fn corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        std::fs::write(dir.path().join(ResponseCache::key("shows/1")), "{not json").unwrap();

        assert_eq!(cache.get("shows/1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn non_utf8_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());
        std::fs::write(dir.path().join(ResponseCache::key("shows/1")), [0xff, 0xfe, 0x00]).unwrap();

        assert_eq!(cache.get("shows/1").await.unwrap(), None);

        let body = json!({"id": 1});
        cache.put("shows/1", &body).await.unwrap();
        assert_eq!(cache.get("shows/1").await.unwrap(), Some(body));
    }
}

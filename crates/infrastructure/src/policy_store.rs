use async_trait::async_trait;
use powerblockade_application::ports::{PolicyStore, RpzFile, FORWARD_ZONES_FILENAME};
use powerblockade_domain::DomainError;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Filesystem policy store rooted at the shared directory:
/// `<shared>/rpz/*.rpz` and `<shared>/forward-zones.conf`.
///
/// Every write goes to a temp file in the same directory and is renamed
/// over the target, so readers only ever see a complete file.
pub struct FsPolicyStore {
    shared_dir: PathBuf,
}

impl FsPolicyStore {
    pub fn new(shared_dir: impl Into<PathBuf>) -> Self {
        Self {
            shared_dir: shared_dir.into(),
        }
    }

    fn rpz_dir(&self) -> PathBuf {
        self.shared_dir.join("rpz")
    }

    async fn atomic_write(path: &Path, content: &str) -> Result<(), DomainError> {
        let Some(dir) = path.parent() else {
            return Err(DomainError::IoError(format!(
                "No parent directory for {}",
                path.display()
            )));
        };
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DomainError::IoError(format!("mkdir {}: {e}", dir.display())))?;

        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| DomainError::IoError(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| DomainError::IoError(format!("rename {}: {e}", path.display())))?;

        debug!(path = %path.display(), bytes = content.len(), "Policy file written");
        Ok(())
    }
}

#[async_trait]
impl PolicyStore for FsPolicyStore {
    #[instrument(skip(self, content))]
    async fn write_rpz(&self, filename: &str, content: &str) -> Result<(), DomainError> {
        Self::atomic_write(&self.rpz_dir().join(filename), content).await
    }

    async fn write_forward_zones(&self, content: &str) -> Result<(), DomainError> {
        Self::atomic_write(&self.shared_dir.join(FORWARD_ZONES_FILENAME), content).await
    }

    async fn read_rpz_files(&self) -> Result<Vec<RpzFile>, DomainError> {
        let dir = self.rpz_dir();
        let mut files = Vec::new();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            // Nothing compiled yet.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => {
                return Err(DomainError::IoError(format!(
                    "read_dir {}: {e}",
                    dir.display()
                )))
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("rpz") {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| DomainError::IoError(format!("read {}: {e}", path.display())))?;
            files.push(RpzFile {
                filename: filename.to_string(),
                content,
            });
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerblockade_application::ports::RPZ_COMBINED_FILENAME;

    #[tokio::test]
    async fn writes_land_under_the_rpz_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPolicyStore::new(dir.path());

        store
            .write_rpz(RPZ_COMBINED_FILENAME, "$TTL 300\n")
            .await
            .unwrap();

        let on_disk =
            std::fs::read_to_string(dir.path().join("rpz").join(RPZ_COMBINED_FILENAME)).unwrap();
        assert_eq!(on_disk, "$TTL 300\n");
    }

    #[tokio::test]
    async fn rewrite_replaces_the_same_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPolicyStore::new(dir.path());

        store.write_rpz(RPZ_COMBINED_FILENAME, "one\n").await.unwrap();
        store.write_rpz(RPZ_COMBINED_FILENAME, "two\n").await.unwrap();

        let files = store.read_rpz_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "two\n");
        // No temp leftovers.
        let names: Vec<_> = std::fs::read_dir(dir.path().join("rpz"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn missing_directory_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsPolicyStore::new(dir.path());
        assert!(store.read_rpz_files().await.unwrap().is_empty());
    }
}

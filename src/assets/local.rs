//! Local filesystem asset store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

use super::{AssetError, AssetResult, AssetStore, UploadedImage, MAX_UPLOAD_BYTES};

/// Flat uploads directory. File names are generated as
/// `{field}-{millis}-{suffix}{ext}` so concurrent uploads of files with the
/// same original name never collide.
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve a name inside the store, refusing anything that could escape it.
    fn file_path(&self, name: &str) -> AssetResult<PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(AssetError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn generated_name(field: &str, original_name: &str) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        let suffix = &uuid[..12];

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let clean: String = e
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase();
                if clean.is_empty() {
                    String::new()
                } else {
                    format!(".{}", clean)
                }
            })
            .unwrap_or_default();

        format!("{}-{}-{}{}", field, millis, suffix, ext)
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn store(&self, field: &str, upload: &UploadedImage) -> AssetResult<String> {
        if !upload.content_type.starts_with("image/") {
            return Err(AssetError::UnsupportedType(upload.content_type.clone()));
        }
        if upload.data.len() > MAX_UPLOAD_BYTES {
            return Err(AssetError::TooLarge(upload.data.len()));
        }

        let name = Self::generated_name(field, &upload.original_name);
        let path = self.file_path(&name)?;
        fs::create_dir_all(&self.root).await?;
        fs::write(&path, &upload.data).await?;

        tracing::debug!("Stored upload {} as {}", upload.original_name, name);
        Ok(name)
    }

    async fn delete(&self, name: &str) -> AssetResult<bool> {
        let path = self.file_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AssetError::Io(e)),
        }
    }

    async fn exists(&self, name: &str) -> AssetResult<bool> {
        let path = self.file_path(name)?;
        Ok(path.exists())
    }

    async fn list(&self) -> AssetResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    async fn modified(&self, name: &str) -> AssetResult<SystemTime> {
        let path = self.file_path(name)?;
        let metadata = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(name.to_string())
            } else {
                AssetError::Io(e)
            }
        })?;
        Ok(metadata.modified()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tempfile::TempDir;

    fn upload(name: &str, content_type: &str, data: &'static [u8]) -> UploadedImage {
        UploadedImage {
            original_name: name.to_string(),
            content_type: content_type.to_string(),
            data: Bytes::from_static(data),
        }
    }

    #[tokio::test]
    async fn store_generates_unique_names_with_extension() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalAssetStore::new(temp_dir.path().to_path_buf());

        let a = store
            .store("image", &upload("Photo.JPG", "image/jpeg", b"aaa"))
            .await
            .unwrap();
        let b = store
            .store("image", &upload("Photo.JPG", "image/jpeg", b"bbb"))
            .await
            .unwrap();

        assert_ne!(a, b);
        assert!(a.starts_with("image-"));
        assert!(a.ends_with(".jpg"));
        assert!(store.exists(&a).await.unwrap());
        assert!(store.exists(&b).await.unwrap());
    }

    #[tokio::test]
    async fn store_rejects_non_images_and_oversize() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalAssetStore::new(temp_dir.path().to_path_buf());

        let err = store
            .store("image", &upload("notes.txt", "text/plain", b"hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedType(_)));

        let big = UploadedImage {
            original_name: "big.png".to_string(),
            content_type: "image/png".to_string(),
            data: Bytes::from(vec![0u8; MAX_UPLOAD_BYTES + 1]),
        };
        let err = store.store("image", &big).await.unwrap_err();
        assert!(matches!(err, AssetError::TooLarge(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalAssetStore::new(temp_dir.path().to_path_buf());

        let name = store
            .store("image", &upload("a.png", "image/png", b"data"))
            .await
            .unwrap();

        assert!(store.delete(&name).await.unwrap());
        assert!(!store.delete(&name).await.unwrap());
        assert!(!store.exists(&name).await.unwrap());
    }

    #[tokio::test]
    async fn list_returns_only_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalAssetStore::new(temp_dir.path().to_path_buf());

        assert!(store.list().await.unwrap().is_empty());

        let a = store
            .store("image", &upload("a.png", "image/png", b"1"))
            .await
            .unwrap();
        let b = store
            .store("image", &upload("b.png", "image/png", b"2"))
            .await
            .unwrap();
        std::fs::create_dir(temp_dir.path().join("subdir")).unwrap();

        let mut names = store.list().await.unwrap();
        names.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn path_escapes_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalAssetStore::new(temp_dir.path().to_path_buf());

        for bad in ["../evil", "a/b", "a\\b", "", ".."] {
            assert!(matches!(
                store.delete(bad).await.unwrap_err(),
                AssetError::InvalidName(_)
            ));
        }
    }

    #[tokio::test]
    async fn modified_reports_recent_time() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalAssetStore::new(temp_dir.path().to_path_buf());

        let name = store
            .store("image", &upload("a.png", "image/png", b"1"))
            .await
            .unwrap();
        let age = SystemTime::now()
            .duration_since(store.modified(&name).await.unwrap())
            .unwrap_or_default();
        assert!(age.as_secs() < 60);

        assert!(matches!(
            store.modified("missing.png").await.unwrap_err(),
            AssetError::NotFound(_)
        ));
    }
}

//! Filesystem store for uploaded images.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use crate::contract::model::MediaUpload;
use crate::domain::ports::MediaStore;

const FALLBACK_STEM: &str = "upload";

pub struct FsMediaStore {
    root: PathBuf,
    allowed: Vec<String>,
}

impl FsMediaStore {
    pub fn new<I, S>(root: impl Into<PathBuf>, allowed_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            root: root.into(),
            allowed: allowed_extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub async fn ensure_dir(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("cannot create upload dir {}", self.root.display()))
    }
}

/// Lowercased text after the last dot of the final path component.
fn extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (_, ext) = base.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Reduce a client file stem to `[A-Za-z0-9_.-]`, dropping any directory
/// part and leading or trailing dots and underscores.
fn safe_stem(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    let cleaned: String = stem
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    if cleaned.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        cleaned.to_string()
    }
}

/// `{stem}_{random}.{ext}`; unique per call.
fn unique_name(file_name: &str, ext: &str) -> String {
    format!(
        "{}_{}.{}",
        safe_stem(file_name),
        uuid::Uuid::new_v4().simple(),
        ext
    )
}

#[async_trait]
impl MediaStore for FsMediaStore {
    fn accepts(&self, file_name: &str) -> bool {
        extension(file_name).is_some_and(|ext| self.allowed.iter().any(|a| *a == ext))
    }

    async fn save(&self, upload: &MediaUpload) -> anyhow::Result<Option<String>> {
        if upload.file_name.is_empty() || !self.accepts(&upload.file_name) {
            return Ok(None);
        }
        let Some(ext) = extension(&upload.file_name) else {
            return Ok(None);
        };

        let stored = unique_name(&upload.file_name, &ext);
        let path = self.root.join(&stored);
        tokio::fs::write(&path, &upload.content)
            .await
            .with_context(|| format!("cannot write upload {}", path.display()))?;

        debug!(file = %stored, bytes = upload.content.len(), "Stored upload");
        Ok(Some(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn store(dir: &Path) -> FsMediaStore {
        FsMediaStore::new(dir, ["png", "jpg", "jpeg", "gif"])
    }

    #[test]
    fn extension_check_ignores_case() {
        let s = store(Path::new("."));
        assert!(s.accepts("photo.PNG"));
        assert!(s.accepts("a.b.jpeg"));
        assert!(!s.accepts("photo.EXE"));
        assert!(!s.accepts("png"));
        assert!(!s.accepts("photo."));
        assert!(!s.accepts("dir.png/evil"));
    }

    #[test]
    fn stems_are_sanitized() {
        assert_eq!(safe_stem("../../etc/passwd.png"), "passwd");
        assert_eq!(safe_stem("C:\\Users\\me\\My Photo.jpg"), "My_Photo");
        assert_eq!(safe_stem("..hidden.gif"), "hidden");
        assert_eq!(safe_stem("фото.png"), FALLBACK_STEM);
    }

    #[test]
    fn unique_names_differ() {
        let a = unique_name("photo.PNG", "png");
        let b = unique_name("photo.PNG", "png");
        assert_ne!(a, b);
        assert!(a.starts_with("photo_") && a.ends_with(".png"));
    }

    #[tokio::test]
    async fn save_writes_file_under_new_name() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());
        let upload = MediaUpload {
            file_name: "photo.PNG".into(),
            content: b"png-bytes".to_vec(),
        };

        let name = s.save(&upload).await.unwrap().unwrap();
        assert_ne!(name, "photo.PNG");
        assert!(name.ends_with(".png"));
        let written = std::fs::read(dir.path().join(&name)).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn save_skips_disallowed_and_unnamed_files() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());
        for file_name in ["photo.EXE", ""] {
            let upload = MediaUpload {
                file_name: file_name.into(),
                content: vec![1, 2, 3],
            };
            assert_eq!(s.save(&upload).await.unwrap(), None);
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

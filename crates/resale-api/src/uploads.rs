use std::path::PathBuf;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tokio::fs;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;

/// 10 MB cap on a single listing photo
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

/// Listing photos on local disk.
///
/// Every upload gets a fresh `{uuid}.{ext}` name, so writes never collide and
/// the client's filename never reaches the filesystem.
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Upload directory: {}", dir.display());
        Ok(Self { dir })
    }

    /// Write a photo and return the generated filename.
    pub async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String> {
        let filename = format!("{}.{}", Uuid::new_v4(), extension_for(original_name));
        fs::write(self.dir.join(&filename), bytes).await?;
        info!("Stored upload {} ({} bytes)", filename, bytes.len());
        Ok(filename)
    }

    /// Path for an exact stored name. `None` for anything that could escape
    /// the upload directory.
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        let unsafe_name = filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains('\0');
        if unsafe_name {
            return None;
        }
        Some(self.dir.join(filename))
    }
}

/// Public URL under which a stored file is served.
pub fn public_url(filename: &str) -> String {
    format!("/uploads/{}", filename)
}

/// GET /uploads/{filename}
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let path = state
        .uploads
        .path_for(&filename)
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    let bytes = match fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("File not found"));
        }
        Err(e) => {
            error!("Failed to read upload {}: {}", path.display(), e);
            return Err(ApiError::Internal(e.into()));
        }
    };

    Ok(([(header::CONTENT_TYPE, content_type_for(&filename))], bytes))
}

fn extension_for(original_name: Option<&str>) -> String {
    original_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_comes_from_client_name_when_sane() {
        assert_eq!(extension_for(Some("phone.JPG")), "jpg");
        assert_eq!(extension_for(Some("archive.tar.gz")), "gz");
        assert_eq!(extension_for(Some("noext")), "bin");
        assert_eq!(extension_for(Some("evil.p/hp")), "bin");
        assert_eq!(extension_for(Some("long.abcdefghij")), "bin");
        assert_eq!(extension_for(None), "bin");
    }

    #[test]
    fn traversal_names_have_no_path() {
        let store = UploadStore { dir: PathBuf::from("/srv/uploads") };
        assert!(store.path_for("../etc/passwd").is_none());
        assert!(store.path_for("a/b.jpg").is_none());
        assert!(store.path_for("a\\b.jpg").is_none());
        assert!(store.path_for("").is_none());
        assert_eq!(
            store.path_for("abc.jpg"),
            Some(PathBuf::from("/srv/uploads/abc.jpg"))
        );
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("x.png"), "image/png");
        assert_eq!(content_type_for("x.bin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn saved_file_lands_under_generated_name() {
        let dir = std::env::temp_dir().join(format!("resale-uploads-{}", Uuid::new_v4()));
        let store = UploadStore::new(dir.clone()).await.unwrap();

        let name = store.save(Some("front.png"), b"\x89PNG").await.unwrap();
        assert!(name.ends_with(".png"));
        assert_ne!(name, "front.png");
        assert_eq!(fs::read(dir.join(&name)).await.unwrap(), b"\x89PNG");

        let _ = fs::remove_dir_all(&dir).await;
    }
}

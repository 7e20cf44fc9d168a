use crate::error::{AppError, AppResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

#[derive(Clone)]
pub struct UploadConfig {
    pub upload_dir: String,
}

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024; // 5 MB
const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Public URL prefix under which `upload_dir` is served.
const PUBLIC_PREFIX: &str = "/uploads";

/// Validate file magic bytes match the declared content type.
fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    match content_type {
        "image/jpeg" => data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF],
        "image/png" => data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47],
        "image/gif" => data.len() >= 4 && data[..4] == [0x47, 0x49, 0x46, 0x38],
        "image/webp" => {
            data.len() >= 12
                && data[..4] == [0x52, 0x49, 0x46, 0x46]
                && data[8..12] == [0x57, 0x45, 0x42, 0x50]
        }
        _ => false,
    }
}

/// An image that passed every check and may be written to disk.
#[derive(Debug)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub extension: &'static str,
}

pub struct UploadService;

impl UploadService {
    /// Check size, declared type and content of an uploaded image.
    /// Nothing touches the filesystem here.
    pub fn validate_image(data: Vec<u8>, content_type: &str) -> AppResult<ImageUpload> {
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::PayloadTooLarge);
        }

        if !content_type.starts_with("image/") {
            return Err(AppError::UploadRejected(
                "Only image files are allowed".to_string(),
            ));
        }

        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(AppError::UploadRejected(format!(
                "Unsupported image type: {}. Allowed: jpeg, png, gif, webp",
                content_type
            )));
        }

        if !validate_magic_bytes(&data, content_type) {
            return Err(AppError::UploadRejected(
                "File content does not match declared content type".to_string(),
            ));
        }

        let extension = match content_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => {
                return Err(AppError::UploadRejected(
                    "Unsupported image type".to_string(),
                ))
            }
        };

        Ok(ImageUpload { data, extension })
    }

    /// Save a validated image under `<upload_dir>/<subdirectory>/`.
    /// Returns the public URL path (e.g., `/uploads/issues/uuid.jpg`).
    pub async fn save_image(
        config: &UploadConfig,
        image: &ImageUpload,
        subdirectory: &str,
    ) -> AppResult<String> {
        let filename = format!("{}.{}", Uuid::new_v4(), image.extension);
        let dir = Path::new(&config.upload_dir).join(subdirectory);

        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to create upload directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let file_path = dir.join(&filename);
        fs::write(&file_path, &image.data).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to write {}: {}",
                file_path.display(),
                e
            ))
        })?;

        Ok(format!("{}/{}/{}", PUBLIC_PREFIX, subdirectory, filename))
    }

    /// Delete a previously saved file given its public path. Failures are logged only.
    pub async fn remove(config: &UploadConfig, public_path: &str) {
        let Some(path) = Self::local_path(config, public_path) else {
            tracing::warn!("Refusing to remove unexpected upload path {}", public_path);
            return;
        };
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!("Failed to remove orphaned upload {}: {}", path.display(), e);
        }
    }

    fn local_path(config: &UploadConfig, public_path: &str) -> Option<PathBuf> {
        let relative = public_path.strip_prefix(PUBLIC_PREFIX)?.trim_start_matches('/');
        if relative.is_empty() || relative.split('/').any(|seg| seg == ".." || seg.is_empty()) {
            return None;
        }
        Some(Path::new(&config.upload_dir).join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn jpeg_magic_bytes_valid() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert!(validate_magic_bytes(&data, "image/jpeg"));
    }

    #[test]
    fn webp_magic_bytes_valid() {
        let data = [
            0x52, 0x49, 0x46, 0x46, // RIFF
            0x00, 0x00, 0x00, 0x00, // size
            0x57, 0x45, 0x42, 0x50, // WEBP
        ];
        assert!(validate_magic_bytes(&data, "image/webp"));
    }

    #[test]
    fn wrong_magic_bytes_rejected() {
        assert!(!validate_magic_bytes(&PNG, "image/jpeg"));
        assert!(!validate_magic_bytes(&[], "image/png"));
    }

    #[test]
    fn valid_png_is_accepted() {
        let image = UploadService::validate_image(PNG.to_vec(), "image/png").unwrap();
        assert_eq!(image.extension, "png");
    }

    #[test]
    fn non_image_is_rejected() {
        let err = UploadService::validate_image(b"%PDF-1.4".to_vec(), "application/pdf")
            .unwrap_err();
        assert!(matches!(err, AppError::UploadRejected(_)));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let mut data = PNG.to_vec();
        data.resize(MAX_FILE_SIZE + 1, 0);
        let err = UploadService::validate_image(data, "image/png").unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge));
    }

    #[test]
    fn exactly_max_size_is_accepted() {
        let mut data = PNG.to_vec();
        data.resize(MAX_FILE_SIZE, 0);
        assert!(UploadService::validate_image(data, "image/png").is_ok());
    }

    #[test]
    fn local_path_stays_inside_upload_dir() {
        let config = UploadConfig {
            upload_dir: "/srv/uploads".to_string(),
        };
        assert_eq!(
            UploadService::local_path(&config, "/uploads/issues/a.png"),
            Some(PathBuf::from("/srv/uploads/issues/a.png"))
        );
        assert_eq!(
            UploadService::local_path(&config, "/uploads/../etc/passwd"),
            None
        );
        assert_eq!(UploadService::local_path(&config, "/etc/passwd"), None);
    }

    #[tokio::test]
    async fn save_then_remove() {
        let dir = std::env::temp_dir().join(format!("civic-upload-{}", Uuid::new_v4()));
        let config = UploadConfig {
            upload_dir: dir.to_string_lossy().into_owned(),
        };
        let image = UploadService::validate_image(PNG.to_vec(), "image/png").unwrap();

        let url = UploadService::save_image(&config, &image, "issues").await.unwrap();
        assert!(url.starts_with("/uploads/issues/"));
        assert!(url.ends_with(".png"));

        let on_disk = UploadService::local_path(&config, &url).unwrap();
        assert_eq!(std::fs::read(&on_disk).unwrap(), PNG.to_vec());

        UploadService::remove(&config, &url).await;
        assert!(!on_disk.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}

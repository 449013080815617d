//! Image upload into blob storage, addressed by content hash.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::infrastructure::ports::{BlobError, BlobStorePort};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file provided")]
    MissingFile,
    #[error("Only image uploads are allowed")]
    NotAnImage,
    #[error("File is larger than 5 MB")]
    TooLarge,
    #[error(transparent)]
    Blob(#[from] BlobError),
}

/// One uploaded file as received from the multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub content_type: Option<String>,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct UploadOps {
    blobs: Arc<dyn BlobStorePort>,
}

impl UploadOps {
    pub fn new(blobs: Arc<dyn BlobStorePort>) -> Self {
        Self { blobs }
    }

    /// Store an image and return its public URL. Identical bytes map to
    /// the same name.
    pub async fn upload_image(&self, file: UploadedFile) -> Result<String, UploadError> {
        let content_type = file
            .content_type
            .as_deref()
            .map(|ct| ct.trim().to_ascii_lowercase())
            .filter(|ct| ct.starts_with("image/"))
            .ok_or(UploadError::NotAnImage)?;
        // Uploads are served from the API origin, so markup formats stay out.
        if subtype(&content_type).contains("svg") {
            return Err(UploadError::NotAnImage);
        }
        if file.bytes.is_empty() {
            return Err(UploadError::MissingFile);
        }
        if file.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge);
        }

        let digest = hex::encode(Sha256::digest(&file.bytes));
        let name = format!(
            "{}.{}",
            digest,
            extension(&content_type, file.file_name.as_deref())
        );
        let size = file.bytes.len();
        let url = self.blobs.put(&name, file.bytes).await?;

        tracing::info!(name = %name, bytes = size, "Stored upload");
        Ok(url)
    }
}

/// Raster extensions a file name may contribute when the content type is
/// not one we name directly.
const FILE_NAME_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "avif", "bmp", "ico", "tif", "tiff", "heic",
];

fn subtype(content_type: &str) -> &str {
    content_type
        .trim_start_matches("image/")
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
}

fn extension(content_type: &str, file_name: Option<&str>) -> String {
    let subtype = subtype(content_type);
    match subtype {
        "jpeg" | "jpg" | "pjpeg" => return "jpg".to_string(),
        "png" | "gif" | "webp" | "avif" | "bmp" => return subtype.to_string(),
        _ => {}
    }

    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| FILE_NAME_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| "img".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockBlobStorePort;

    fn file(content_type: &str, bytes: Vec<u8>) -> UploadedFile {
        UploadedFile {
            content_type: Some(content_type.into()),
            file_name: Some("cover.PNG".into()),
            bytes,
        }
    }

    #[tokio::test]
    async fn stores_image_under_content_hash() {
        // sha256("abc")
        let expected = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.jpg";
        let mut blobs = MockBlobStorePort::new();
        blobs
            .expect_put()
            .withf(move |name, bytes| name == expected && bytes == b"abc")
            .times(1)
            .returning(|name, _| Ok(format!("/uploads/{}", name)));

        let url = UploadOps::new(Arc::new(blobs))
            .upload_image(file("image/jpeg", b"abc".to_vec()))
            .await
            .unwrap();
        assert_eq!(url, format!("/uploads/{}", expected));
    }

    #[tokio::test]
    async fn rejects_non_images_and_oversized_files() {
        let mut blobs = MockBlobStorePort::new();
        blobs.expect_put().never();
        let ops = UploadOps::new(Arc::new(blobs));

        let pdf = ops.upload_image(file("application/pdf", vec![1])).await;
        assert!(matches!(pdf, Err(UploadError::NotAnImage)));

        let huge = ops
            .upload_image(file("image/png", vec![0; MAX_UPLOAD_BYTES + 1]))
            .await;
        assert!(matches!(huge, Err(UploadError::TooLarge)));

        let empty = ops.upload_image(file("image/png", vec![])).await;
        assert!(matches!(empty, Err(UploadError::MissingFile)));
    }

    #[tokio::test]
    async fn svg_is_refused_before_storage() {
        let mut blobs = MockBlobStorePort::new();
        blobs.expect_put().never();
        let ops = UploadOps::new(Arc::new(blobs));
        let script = b"<svg xmlns=\"http://www.w3.org/2000/svg\"><script>alert(1)</script></svg>".to_vec();

        let plain = ops.upload_image(file("image/svg+xml", script.clone())).await;
        assert!(matches!(plain, Err(UploadError::NotAnImage)));

        let shouted = ops
            .upload_image(file("Image/SVG+XML; charset=utf-8", script))
            .await;
        assert!(matches!(shouted, Err(UploadError::NotAnImage)));
    }

    #[test]
    fn extension_prefers_content_type_then_file_name() {
        assert_eq!(extension("image/png", None), "png");
        assert_eq!(extension("image/x-icon", Some("fav.ICO")), "ico");
        assert_eq!(extension("image/x-unknown", None), "img");
    }

    #[test]
    fn file_name_cannot_smuggle_markup_extensions() {
        assert_eq!(extension("image/x-unknown", Some("cover.svg")), "img");
        assert_eq!(extension("image/x-unknown", Some("cover.html")), "img");
        assert_eq!(extension("image/x-unknown", Some("cover.tiff")), "tiff");
    }
}

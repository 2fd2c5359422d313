//! Binary Asset Codec
//!
//! base64 text and data-URIs in, bytes out, and the reverse for blobs.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use bytes::Bytes;
use tracing::debug;

use crate::error::AssetError;

pub const BASE64_MARKER: &str = ";base64,";
pub const PDF_DATA_URI_PREFIX: &str = "data:application/pdf;";
pub const PDF_MEDIA_TYPE: &str = "application/pdf";
const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Standard alphabet, padding optional.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes raw base64 or the payload of a `;base64,` data-URI.
pub fn base64_to_bytes(input: &str) -> Result<Vec<u8>, AssetError> {
    let data = match input.split_once(BASE64_MARKER) {
        Some((_, payload)) => payload,
        None => input,
    };
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(LENIENT.decode(compact)?)
}

pub fn bytes_to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn to_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{}{}{}", media_type, BASE64_MARKER, bytes_to_base64(bytes))
}

/// Reduces a content type such as `Application/PDF; q=1` to `application/pdf`.
pub fn media_type_essence(content_type: &str) -> String {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        DEFAULT_MEDIA_TYPE.to_string()
    } else {
        essence.to_ascii_lowercase()
    }
}

/// Binary content with a declared media type, readable once asynchronously.
#[async_trait]
pub trait BlobSource: Send + Sync {
    fn media_type(&self) -> &str;
    async fn read(&self) -> Result<Bytes, AssetError>;
}

#[derive(Debug, Clone)]
pub struct Blob {
    media_type: String,
    data: Bytes,
}

impl Blob {
    pub fn new(media_type: &str, data: impl Into<Bytes>) -> Self {
        Self {
            media_type: media_type_essence(media_type),
            data: data.into(),
        }
    }
}

#[async_trait]
impl BlobSource for Blob {
    fn media_type(&self) -> &str {
        &self.media_type
    }

    async fn read(&self) -> Result<Bytes, AssetError> {
        Ok(self.data.clone())
    }
}

/// A file on disk read lazily with its media type declared up front.
#[derive(Debug, Clone)]
pub struct FileBlob {
    path: PathBuf,
    media_type: String,
}

impl FileBlob {
    pub fn new(path: impl Into<PathBuf>, media_type: &str) -> Self {
        Self {
            path: path.into(),
            media_type: media_type_essence(media_type),
        }
    }

    /// Declares `application/pdf` for `.pdf` files, octet-stream otherwise.
    pub fn guess(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_pdf = path
            .extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("pdf"));
        let media_type = if is_pdf { PDF_MEDIA_TYPE } else { DEFAULT_MEDIA_TYPE };
        Self::new(path, media_type)
    }
}

#[async_trait]
impl BlobSource for FileBlob {
    fn media_type(&self) -> &str {
        &self.media_type
    }

    async fn read(&self) -> Result<Bytes, AssetError> {
        Ok(Bytes::from(tokio::fs::read(&self.path).await?))
    }
}

/// Reads `blob` and returns it as a PDF data-URI.
pub async fn blob_to_base64_pdf(blob: &(dyn BlobSource + '_)) -> Result<String, AssetError> {
    let data = blob.read().await?;
    let data_uri = to_data_uri(blob.media_type(), &data);
    if !data_uri.starts_with(PDF_DATA_URI_PREFIX) {
        return Err(AssetError::NotAPdf {
            media_type: blob.media_type().to_string(),
        });
    }
    debug!(bytes = data.len(), "encoded pdf blob");
    Ok(data_uri)
}

/// serde adapter: bytes serialize as base64, and deserialize from either a
/// byte array or a base64 / data-URI string.
pub mod bytes_or_base64 {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bytes(Vec<u8>),
        Text(String),
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::bytes_to_base64(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Bytes(bytes) => Ok(bytes),
            Raw::Text(text) => super::base64_to_bytes(&text).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_prefix_is_stripped() {
        let raw = base64_to_bytes("SGVsbG8=").unwrap();
        let uri = base64_to_bytes("data:application/pdf;base64,SGVsbG8=").unwrap();
        assert_eq!(raw, b"Hello");
        assert_eq!(raw, uri);
    }

    #[test]
    fn test_lenient_padding_and_whitespace() {
        assert_eq!(base64_to_bytes("SGVsbG8").unwrap(), b"Hello");
        assert_eq!(base64_to_bytes("SGVs\nbG8=").unwrap(), b"Hello");
        assert!(base64_to_bytes("").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        assert!(matches!(
            base64_to_bytes("not base64!"),
            Err(AssetError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_nonzero_trailing_bits_rejected() {
        assert!(matches!(
            base64_to_bytes("SGVsbG9="),
            Err(AssetError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_reencoding_reproduces_input() {
        let text = "JVBERi0xLjQKJcOkw7zDtsOf";
        assert_eq!(bytes_to_base64(&base64_to_bytes(text).unwrap()), text);
    }

    #[test]
    fn test_media_type_essence() {
        assert_eq!(media_type_essence("Application/PDF; charset=binary"), "application/pdf");
        assert_eq!(media_type_essence(""), DEFAULT_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_pdf_blob_encodes() {
        let blob = Blob::new("application/pdf", &b"%PDF-1.4"[..]);
        let uri = blob_to_base64_pdf(&blob).await.unwrap();
        assert_eq!(uri, "data:application/pdf;base64,JVBERi0xLjQ=");
    }

    #[tokio::test]
    async fn test_non_pdf_blob_rejected() {
        let blob = Blob::new("text/html", &b"<html></html>"[..]);
        let err = blob_to_base64_pdf(&blob).await.unwrap_err();
        assert!(matches!(err, AssetError::NotAPdf { ref media_type } if media_type == "text/html"));
    }

    #[tokio::test]
    async fn test_file_blob_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let uri = blob_to_base64_pdf(&FileBlob::guess(&path)).await.unwrap();
        assert_eq!(base64_to_bytes(&uri).unwrap(), b"%PDF-1.7");

        let missing = FileBlob::guess(dir.path().join("missing.pdf"));
        assert!(matches!(blob_to_base64_pdf(&missing).await, Err(AssetError::Io(_))));
    }
}

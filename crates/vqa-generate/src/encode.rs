//! Image re-encoding and base64 data URIs

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("cannot read image {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot process image {name}: {source}")]
    Image {
        name: String,
        source: image::ImageError,
    },
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// How the data URI's MIME label is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MimePolicy {
    /// Label matches the format the bytes were re-encoded to
    #[default]
    Detected,
    /// Always `image/jpeg`, whatever the encoded format
    LegacyJpeg,
}

/// An image ready to embed in a multimodal request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// File name shown to the model in annotated prompts
    pub name: String,
    pub mime: String,
    pub data_base64: String,
}

impl EncodedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data_base64)
    }

    pub fn decoded_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        decode_base64(&self.data_base64)
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>, EncodeError> {
    Ok(STANDARD.decode(data)?)
}

/// Re-encode image bytes to their own format and base64 them.
///
/// The format is sniffed from the content, then from the name's extension,
/// and falls back to JPEG.
pub fn encode_image_bytes(
    name: &str,
    bytes: &[u8],
    policy: MimePolicy,
) -> Result<EncodedImage, EncodeError> {
    let format = image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(name).ok())
        .unwrap_or(ImageFormat::Jpeg);

    let image_err = |source| EncodeError::Image {
        name: name.to_string(),
        source,
    };
    let mut decoded = image::load_from_memory_with_format(bytes, format).map_err(image_err)?;
    // JPEG has no alpha channel
    if format == ImageFormat::Jpeg && decoded.color().has_alpha() {
        decoded = DynamicImage::ImageRgb8(decoded.to_rgb8());
    }

    let mut out = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut out), format)
        .map_err(image_err)?;

    let mime = match policy {
        MimePolicy::Detected => format.to_mime_type(),
        MimePolicy::LegacyJpeg => "image/jpeg",
    };

    Ok(EncodedImage {
        name: name.to_string(),
        mime: mime.to_string(),
        data_base64: encode_base64(&out),
    })
}

/// Read and encode an image file
pub fn encode_image_file(path: &Path, policy: MimePolicy) -> Result<EncodedImage, EncodeError> {
    let bytes = std::fs::read(path).map_err(|source| EncodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let encoded = encode_image_bytes(&name, &bytes, policy)?;
    tracing::debug!(image = %name, base64_len = encoded.data_base64.len(), "Encoded image");
    Ok(encoded)
}

/// Avatar upload intake
///
/// Turns raw file bytes into a directly renderable `data:` URL.
use crate::error::{RsvpError, RsvpResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::ImageFormat;

/// An image that passed intake checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedImage {
    pub mime_type: String,
    pub size: usize,
    pub width: u32,
    pub height: u32,
    pub data_url: String,
}

/// Check size, sniff the format and decode the image
///
/// Decoding runs on the blocking pool. Oversized payloads are rejected before
/// any decoding happens.
pub async fn accept_image(data: Vec<u8>, max_bytes: usize) -> RsvpResult<AcceptedImage> {
    let size = data.len();
    if size > max_bytes {
        return Err(RsvpError::ImageTooLarge {
            size,
            limit: max_bytes,
        });
    }

    if data.is_empty() {
        return Err(RsvpError::UnsupportedImage("empty file".to_string()));
    }

    tokio::task::spawn_blocking(move || decode_image(data))
        .await
        .map_err(|e| RsvpError::UnsupportedImage(format!("decode task failed: {}", e)))?
}

fn decode_image(data: Vec<u8>) -> RsvpResult<AcceptedImage> {
    let format = image::guess_format(&data)
        .map_err(|e| RsvpError::UnsupportedImage(format!("unrecognised format: {}", e)))?;

    let decoded = image::load_from_memory_with_format(&data, format)
        .map_err(|e| RsvpError::UnsupportedImage(format!("failed to decode: {}", e)))?;

    let mime_type = mime_type_for(format).to_string();
    let data_url = format!("data:{};base64,{}", mime_type, STANDARD.encode(&data));

    Ok(AcceptedImage {
        mime_type,
        size: data.len(),
        width: decoded.width(),
        height: decoded.height(),
        data_url,
    })
}

fn mime_type_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::new(width, height);
        let mut buf = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buf);
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        buf
    }

    #[tokio::test]
    async fn test_accepts_png() {
        let data = png_bytes(10, 8);
        let size = data.len();

        let accepted = accept_image(data, 1024 * 1024).await.unwrap();
        assert_eq!(accepted.mime_type, "image/png");
        assert_eq!(accepted.size, size);
        assert_eq!((accepted.width, accepted.height), (10, 8));
        assert!(accepted.data_url.starts_with("data:image/png;base64,iVBOR"));
    }

    #[tokio::test]
    async fn test_rejects_oversized_upload() {
        let data = vec![0u8; 2048];

        let err = accept_image(data, 1024).await.unwrap_err();
        assert!(matches!(
            err,
            RsvpError::ImageTooLarge {
                size: 2048,
                limit: 1024
            }
        ));
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let err = accept_image(b"just some text".to_vec(), 1024).await.unwrap_err();
        assert!(matches!(err, RsvpError::UnsupportedImage(_)));
    }

    #[tokio::test]
    async fn test_rejects_truncated_image() {
        let mut data = png_bytes(10, 10);
        data.truncate(20);

        let err = accept_image(data, 1024).await.unwrap_err();
        assert!(matches!(err, RsvpError::UnsupportedImage(_)));
    }
}

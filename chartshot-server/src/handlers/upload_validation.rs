//! Upload validation: magic byte sniffing plus the size ceiling.
//!
//! Only raster formats a chart screenshot plausibly arrives in are accepted;
//! the sniff catches mislabeled or corrupt payloads before anything touches
//! disk or the database.

use crate::errors::AppError;

/// Largest accepted image payload.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Request body ceiling for the upload route, above the payload ceiling so
/// oversized images reach our validation (and its field-level error) instead
/// of a bare 413.
pub const UPLOAD_BODY_LIMIT_BYTES: usize = 8 * 1024 * 1024;

/// A recognized upload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedImage {
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Sniff the payload's magic bytes. Returns the detected format if it is one
/// we accept.
pub fn sniff_image(data: &[u8]) -> Option<AcceptedImage> {
    if data.len() < 4 {
        return None;
    }

    // JPEG: FF D8 FF
    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Some(AcceptedImage {
            content_type: "image/jpeg",
            extension: "jpg",
        });
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.len() >= 8 && data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Some(AcceptedImage {
            content_type: "image/png",
            extension: "png",
        });
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some(AcceptedImage {
            content_type: "image/webp",
            extension: "webp",
        });
    }

    // GIF: GIF87a or GIF89a
    if data.len() >= 6 && &data[0..3] == b"GIF" {
        return Some(AcceptedImage {
            content_type: "image/gif",
            extension: "gif",
        });
    }

    // BMP: BM
    if &data[0..2] == b"BM" {
        return Some(AcceptedImage {
            content_type: "image/bmp",
            extension: "bmp",
        });
    }

    None
}

/// Validate an upload payload end to end: present, within the size ceiling,
/// and of an accepted image type.
pub fn validate_upload(data: &[u8]) -> Result<AcceptedImage, AppError> {
    if data.is_empty() {
        return Err(AppError::validation("image", "an image file is required"));
    }

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::validation(
            "image",
            "the image may not be larger than 2 MiB",
        ));
    }

    sniff_image(data).ok_or_else(|| {
        AppError::validation("image", "the file must be an image (png, jpeg, gif, webp, or bmp)")
    })
}

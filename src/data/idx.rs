//! Decoder for the IDX binary format used by MNIST and its derivatives.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-3:   0x00000803  (magic: reserved, dtype = uint8, 3 dimensions)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-3:   0x00000801  (magic: reserved, dtype = uint8, 1 dimension)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes
//! ```

use std::path::Path;

use log::debug;

use crate::error::DatasetError;

pub const IMAGE_MAGIC: u32 = 0x0000_0803;
pub const LABEL_MAGIC: u32 = 0x0000_0801;

const IMAGE_HEADER_LEN: usize = 16;
const LABEL_HEADER_LEN: usize = 8;

fn be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

fn check_magic(kind: &str, got: u32, expected: u32) -> Result<(), DatasetError> {
    if got != expected {
        return Err(DatasetError::Format(format!(
            "{} file magic number mismatch: expected {:#010x}, got {:#010x}",
            kind, expected, got
        )));
    }
    Ok(())
}

/// Decodes an IDX3 image file into row-major pixel vectors normalized to [0, 1].
pub fn parse_images(bytes: &[u8]) -> Result<Vec<Vec<f64>>, DatasetError> {
    if bytes.len() < IMAGE_HEADER_LEN {
        return Err(DatasetError::Format(format!(
            "image file too short: expected at least {} header bytes, got {}",
            IMAGE_HEADER_LEN, bytes.len()
        )));
    }
    check_magic("image", be_u32(bytes, 0), IMAGE_MAGIC)?;

    let n_images = be_u32(bytes, 4) as usize;
    let rows = be_u32(bytes, 8) as usize;
    let cols = be_u32(bytes, 12) as usize;

    let n_pixels = rows.checked_mul(cols)
        .filter(|&n| n > 0)
        .ok_or_else(|| DatasetError::Format(format!("invalid image size {}x{}", rows, cols)))?;
    let payload_len = n_images.checked_mul(n_pixels).ok_or_else(|| {
        DatasetError::Format(format!(
            "image payload overflows usize ({} images of {} pixels)",
            n_images, n_pixels
        ))
    })?;

    let payload = &bytes[IMAGE_HEADER_LEN..];
    if payload.len() < payload_len {
        return Err(DatasetError::Format(format!(
            "image file truncated: header declares {} images of {}x{} pixels ({} bytes), \
             but only {} bytes follow the header",
            n_images, rows, cols, payload_len, payload.len()
        )));
    }

    Ok(payload[..payload_len]
        .chunks_exact(n_pixels)
        .map(|chunk| chunk.iter().map(|&px| px as f64 / 255.0).collect())
        .collect())
}

/// Decodes an IDX1 label file into raw class indices.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<u8>, DatasetError> {
    if bytes.len() < LABEL_HEADER_LEN {
        return Err(DatasetError::Format(format!(
            "label file too short: expected at least {} header bytes, got {}",
            LABEL_HEADER_LEN, bytes.len()
        )));
    }
    check_magic("label", be_u32(bytes, 0), LABEL_MAGIC)?;

    let n_labels = be_u32(bytes, 4) as usize;
    let payload = &bytes[LABEL_HEADER_LEN..];
    if payload.len() < n_labels {
        return Err(DatasetError::Format(format!(
            "label file truncated: header declares {} labels, but only {} bytes follow the header",
            n_labels, payload.len()
        )));
    }

    Ok(payload[..n_labels].to_vec())
}

fn read_file(path: &Path) -> Result<Vec<u8>, DatasetError> {
    std::fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_images(path: impl AsRef<Path>) -> Result<Vec<Vec<f64>>, DatasetError> {
    let path = path.as_ref();
    let images = parse_images(&read_file(path)?)?;
    debug!("decoded {} images from {}", images.len(), path.display());
    Ok(images)
}

pub fn read_labels(path: impl AsRef<Path>) -> Result<Vec<u8>, DatasetError> {
    let path = path.as_ref();
    let labels = parse_labels(&read_file(path)?)?;
    debug!("decoded {} labels from {}", labels.len(), path.display());
    Ok(labels)
}

fn header_u32(what: &str, n: usize) -> Result<[u8; 4], DatasetError> {
    u32::try_from(n)
        .map(u32::to_be_bytes)
        .map_err(|_| DatasetError::Format(format!("{} {} does not fit an IDX header", what, n)))
}

/// Encodes images as an IDX3 byte buffer. Pixels are given as raw bytes and
/// every image must hold exactly `rows * cols` of them.
pub fn encode_images(images: &[Vec<u8>], rows: usize, cols: usize) -> Result<Vec<u8>, DatasetError> {
    let n_pixels = rows.checked_mul(cols)
        .ok_or_else(|| DatasetError::Format(format!("image size {}x{} overflows usize", rows, cols)))?;
    if let Some((i, image)) = images.iter().enumerate().find(|(_, img)| img.len() != n_pixels) {
        return Err(DatasetError::Format(format!(
            "image {} has {} pixels, expected {}x{}",
            i, image.len(), rows, cols
        )));
    }

    let mut out = Vec::with_capacity(IMAGE_HEADER_LEN + images.len() * n_pixels);
    out.extend_from_slice(&IMAGE_MAGIC.to_be_bytes());
    out.extend_from_slice(&header_u32("image count", images.len())?);
    out.extend_from_slice(&header_u32("row count", rows)?);
    out.extend_from_slice(&header_u32("column count", cols)?);
    for image in images {
        out.extend_from_slice(image);
    }
    Ok(out)
}

/// Encodes labels as an IDX1 byte buffer.
pub fn encode_labels(labels: &[u8]) -> Result<Vec<u8>, DatasetError> {
    let mut out = Vec::with_capacity(LABEL_HEADER_LEN + labels.len());
    out.extend_from_slice(&LABEL_MAGIC.to_be_bytes());
    out.extend_from_slice(&header_u32("label count", labels.len())?);
    out.extend_from_slice(labels);
    Ok(out)
}

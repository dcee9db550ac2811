//! Embedded media extraction and image file output
//!
//! The workbook is treated as a plain zip archive here: payloads under
//! `xl/media/` are enumerated in archive order and kept as opaque bytes.
//! No decoding happens; format identification is a magic-byte sniff and
//! payloads are written to disk verbatim, so re-runs are byte-identical.

use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};
use zip::ZipArchive;

/// Payloads smaller than this are treated as invalid and never written
pub const MIN_IMAGE_BYTES: usize = 100;

/// Enumerate all embedded image payloads, keyed by 1-based discovery order
///
/// A workbook that cannot be opened or enumerated as an archive is a
/// recoverable condition: a warning is logged and an empty map returned,
/// so every row downstream falls back to the placeholder path.
pub fn extract_media(path: &Path) -> HashMap<u32, Vec<u8>> {
    match try_extract_media(path) {
        Ok(media) => {
            info!(count = media.len(), "extracted embedded images from workbook");
            media
        }
        Err(e) => {
            warn!(error = %e, "failed to extract images from workbook; all rows will use the placeholder");
            HashMap::new()
        }
    }
}

fn try_extract_media(path: &Path) -> Result<HashMap<u32, Vec<u8>>> {
    let file =
        fs::File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let mut media = HashMap::new();
    let mut index = 0u32;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.name().starts_with("xl/media/") {
            continue;
        }
        index += 1;

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        media.insert(index, bytes);
    }

    Ok(media)
}

/// Image formats recognized by magic-byte sniffing
///
/// Extensions follow the lowercase names the original catalog artifacts
/// used, so existing references stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

impl ImageFormat {
    /// Identify the format from the payload's leading bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(b"\xff\xd8\xff") {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"GIF8") {
            Some(ImageFormat::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else if bytes.starts_with(b"II*\x00") || bytes.starts_with(b"MM\x00*") {
            Some(ImageFormat::Tiff)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::WebP)
        } else {
            None
        }
    }

    /// File extension for the format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
            ImageFormat::WebP => "webp",
        }
    }
}

/// Write a product image into the image directory, named `<code>.<ext>`
///
/// Returns the file name written. Two rows sharing a code overwrite the
/// same file; that collision is accepted, not guarded against.
pub fn write_product_image(image_dir: &Path, code: &str, bytes: &[u8]) -> Result<String> {
    let Some(format) = ImageFormat::sniff(bytes) else {
        bail!("unrecognized image format for code {}", code);
    };

    let filename = format!("{}.{}", code, format.extension());
    let path = image_dir.join(&filename);
    fs::write(&path, bytes)
        .with_context(|| format!("Failed to write image: {}", path.display()))?;

    Ok(filename)
}

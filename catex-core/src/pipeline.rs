//! Pipeline orchestration: setup checks, per-sheet processing, persistence
//!
//! Sheets are processed strictly sequentially, rows within a sheet in
//! order; category state is a sequential fold. Setup failures are fatal
//! and abort before any row is touched. Everything after setup degrades
//! gracefully and the run always produces a best-effort result.

use anyhow::{Context, Result};
use std::fs;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};
use zip::ZipArchive;

use crate::classify::{self, SheetContext};
use crate::config::Config;
use crate::error::SetupError;
use crate::media;
use crate::reader::{self, drawing};
use crate::record::ProductRecord;

/// Counts reported after a run
#[derive(Debug, Default)]
pub struct ExtractSummary {
    pub sheets: usize,
    pub records: usize,
    pub images_written: usize,
    pub placeholders: usize,
    /// False when the JSON artifact could not be written; image files are
    /// not rolled back in that case
    pub output_written: bool,
}

/// Run the full extraction described by the configuration
pub fn run(config: &Config) -> Result<ExtractSummary> {
    // Fatal setup tier: missing source or unusable image directory abort
    // before any data is processed
    if !config.source.exists() {
        return Err(SetupError::SourceNotFound(config.source.clone()).into());
    }
    let image_col = config.image_column_index()?;
    probe_image_dir(&config.image_dir)?;

    let workbook = reader::read_workbook(&config.source)?;
    let media_map = media::extract_media(&config.source);

    // Reopened for drawing parts; a failure here is recoverable like a
    // failed media extraction
    let mut archive = match open_archive(&config.source) {
        Ok(archive) => Some(archive),
        Err(e) => {
            warn!(error = %e, "cannot reopen workbook archive; image anchors unavailable");
            None
        }
    };

    let mut records: Vec<ProductRecord> = Vec::new();
    let mut anchored_total = 0usize;
    let mut sheets_with_images = 0usize;

    for (index, sheet) in workbook.sheets.iter().enumerate() {
        let anchors = match archive.as_mut() {
            Some(archive) => drawing::sheet_image_anchors(archive, index).unwrap_or_else(|e| {
                warn!(sheet = %sheet.name, error = %e, "failed to parse drawing anchors");
                Vec::new()
            }),
            None => Vec::new(),
        };

        if !anchors.is_empty() {
            sheets_with_images += 1;
        }
        anchored_total += anchors.len();

        let anchor_map = drawing::build_anchor_map(&anchors);
        info!(sheet = %sheet.name, mappings = anchor_map.len(), "built image cell map");

        let ctx = SheetContext {
            anchor_map: &anchor_map,
            media: &media_map,
            image_col,
            image_dir: &config.image_dir,
        };
        records.extend(classify::process_sheet(sheet, &ctx));
    }

    // The sheet-local image ordinal is joined against the archive media
    // index by 1-based equality. That join assumes both enumerations run
    // in the same order; these diagnostics surface the cases where the
    // assumption cannot hold.
    if sheets_with_images > 1 {
        warn!(
            sheets_with_images,
            "multiple sheets carry images; sheet-local ordinals may not match archive media order"
        );
    }
    if anchored_total != media_map.len() && !media_map.is_empty() {
        warn!(
            anchored = anchored_total,
            media = media_map.len(),
            "anchored image count does not match media entries; rows may resolve to the wrong image"
        );
    }

    let placeholder = classify::placeholder_path(&config.image_dir);
    let placeholders = records
        .iter()
        .filter(|r| r.image_path.as_deref() == Some(placeholder.as_str()))
        .count();
    let images_written = records.len() - placeholders;

    // A serialization failure is reported but does not undo the image
    // files already on disk; partial success is a terminal state
    let output_written = match write_records(&config.output, &records) {
        Ok(()) => {
            info!(count = records.len(), output = %config.output.display(), "wrote product records");
            true
        }
        Err(e) => {
            warn!(error = %e, output = %config.output.display(), "failed to write output artifact");
            false
        }
    };

    Ok(ExtractSummary {
        sheets: workbook.sheets.len(),
        records: records.len(),
        images_written,
        placeholders,
        output_written,
    })
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<fs::File>>> {
    let file =
        fs::File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

/// Create the image directory if needed and probe it for writability by
/// creating and deleting a marker file
fn probe_image_dir(dir: &Path) -> Result<(), SetupError> {
    let fail = |source: std::io::Error| SetupError::ImageDirNotWritable {
        dir: dir.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(fail)?;

    let marker = dir.join(".write-probe");
    fs::write(&marker, b"probe").map_err(fail)?;
    fs::remove_file(&marker).map_err(fail)?;

    Ok(())
}

/// Serialize the ordered record list as pretty-printed JSON. serde_json
/// leaves non-ASCII characters unescaped, so the currency glyph and any
/// localized names survive verbatim.
fn write_records(output: &Path, records: &[ProductRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(output, json)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    Ok(())
}

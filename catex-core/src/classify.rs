//! Row classification and product record assembly
//!
//! The stateful core: walks a worksheet's rows in order, keeps the
//! current category as an explicit fold accumulator, skips blank and
//! header rows, and emits one record per valid product row. Every
//! per-row failure degrades to skip-or-placeholder; nothing here aborts
//! a sheet or the run.

use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::media::{self, MIN_IMAGE_BYTES};
use crate::price;
use crate::reader::drawing::PositionKey;
use crate::reader::{CellValue, Sheet};
use crate::record::ProductRecord;

/// Column header tokens that mark a header row (exact uppercase match)
const HEADER_TOKENS: [&str; 3] = ["NAME", "CODE", "PRICE"];

/// Keywords that mark a category row (case-insensitive substring of cell B)
const CATEGORY_KEYWORDS: [&str; 4] = ["SHOWER TOILET", "E-BIDET", "TOILETS", "BIDET"];

/// Classification of one worksheet row
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    /// Every cell blank; skipped with no state change
    Blank,
    /// Contains a recognized column header token; skipped
    Header,
    /// Category marker carrying the new current category
    Category(String),
    /// Candidate product row; field checks happen during extraction
    Product,
}

/// Classify a row. Header recognition takes priority over category and
/// product so a header row is never misread as either.
pub fn classify_row(values: &[CellValue]) -> RowKind {
    if values.iter().all(CellValue::is_blank) {
        return RowKind::Blank;
    }

    if values.iter().any(|v| {
        matches!(v, CellValue::Text(s) if HEADER_TOKENS.contains(&s.to_uppercase().as_str()))
    }) {
        return RowKind::Header;
    }

    if values.len() >= 2 {
        if let CellValue::Text(s) = &values[1] {
            let upper = s.to_uppercase();
            if CATEGORY_KEYWORDS.iter().any(|k| upper.contains(k)) {
                return RowKind::Category(s.clone());
            }
        }
    }

    RowKind::Product
}

/// Per-sheet inputs for record building
pub struct SheetContext<'a> {
    /// Position key -> 1-based sheet-local image ordinal
    pub anchor_map: &'a HashMap<PositionKey, u32>,
    /// 1-based archive media index -> payload
    pub media: &'a HashMap<u32, Vec<u8>>,
    /// 1-based image-bearing column
    pub image_col: u32,
    /// Directory product images are written into
    pub image_dir: &'a Path,
}

/// Process one worksheet into records, in row order
///
/// Category state is local to this call: each sheet starts with an empty
/// category and never sees another sheet's markers.
pub fn process_sheet(sheet: &Sheet, ctx: &SheetContext) -> Vec<ProductRecord> {
    let mut records = Vec::new();
    let mut current_category = String::new();

    for row in &sheet.rows {
        match classify_row(&row.values) {
            RowKind::Blank => continue,
            RowKind::Header => {
                info!(sheet = %sheet.name, row = row.number, "skipping header row");
                continue;
            }
            RowKind::Category(category) => {
                info!(sheet = %sheet.name, row = row.number, %category, "detected category");
                current_category = category;
                continue;
            }
            RowKind::Product => {}
        }

        // Name, code and price are positional: columns B, C, D
        if row.values.len() < 4 {
            warn!(sheet = %sheet.name, row = row.number, "skipping row: insufficient columns");
            continue;
        }
        let name = &row.values[1];
        let code = &row.values[2];
        let raw_price = &row.values[3];

        if name.is_blank() || code.is_blank() {
            warn!(sheet = %sheet.name, row = row.number, "skipping row: missing name or code");
            continue;
        }

        let code = code.as_display();
        let image_path = resolve_image(ctx, &sheet.name, row.number, &code);

        records.push(ProductRecord {
            sheet: sheet.name.clone(),
            category: current_category.clone(),
            name: name.as_display(),
            code,
            price: price::format_price(raw_price),
            image_path: Some(image_path),
        });
    }

    records
}

/// Resolve the image path for a product row
///
/// Any miss along the chain (no anchor at the position key, no payload
/// behind the ordinal, payload too small, unknown format, write failure)
/// falls back to the placeholder path; the row is never dropped.
fn resolve_image(ctx: &SheetContext, sheet: &str, row_number: u32, code: &str) -> String {
    let key = PositionKey::new(row_number, ctx.image_col);

    let Some(ordinal) = ctx.anchor_map.get(&key) else {
        warn!(sheet, row = row_number, code, "image not found for row");
        return placeholder_path(ctx.image_dir);
    };
    let Some(bytes) = ctx.media.get(ordinal) else {
        warn!(sheet, row = row_number, code, ordinal, "anchored image has no media payload");
        return placeholder_path(ctx.image_dir);
    };
    if bytes.len() < MIN_IMAGE_BYTES {
        warn!(sheet, row = row_number, code, size = bytes.len(), "invalid image data");
        return placeholder_path(ctx.image_dir);
    }

    match media::write_product_image(ctx.image_dir, code, bytes) {
        Ok(filename) => {
            let path = relative_image_path(ctx.image_dir, &filename);
            info!(sheet, row = row_number, code, path = %path, "saved product image");
            path
        }
        Err(e) => {
            warn!(sheet, row = row_number, code, error = %e, "failed to save image");
            placeholder_path(ctx.image_dir)
        }
    }
}

/// Relative path recorded for an image file, using the directory's name
/// (the convention the output artifact has always used: `./img/<file>`)
fn relative_image_path(image_dir: &Path, filename: &str) -> String {
    let dir_name = image_dir
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("./{}/{}", dir_name, filename)
}

/// Fixed fallback reference used when no valid image can be resolved.
/// The placeholder file itself is an external asset, never created here.
pub fn placeholder_path(image_dir: &Path) -> String {
    relative_image_path(image_dir, "placeholder.png")
}

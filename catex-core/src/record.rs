//! Output record types

use serde::Serialize;

/// One extracted product row
///
/// Created exactly once by the row classifier for a qualifying row and
/// never mutated afterwards. `name` and `code` are always non-empty (rows
/// failing that are dropped before a record exists). `price` is always a
/// display string: either currency-formatted or the original raw value
/// when normalization failed, never null. `image_path` is in practice
/// always a real relative path or the placeholder path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub sheet: String,
    pub category: String,
    pub name: String,
    pub code: String,
    pub price: String,
    pub image_path: Option<String>,
}

//! Catalog workbook reader using calamine

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use std::path::Path;

pub mod drawing;
pub mod workbook;

pub use workbook::{CellValue, Row, Sheet, Workbook};

/// Read a workbook from a file path
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    let mut excel: Sheets<_> = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let sheet_names = excel.sheet_names();
    let mut sheets = Vec::new();

    for sheet_name in &sheet_names {
        let range = excel.worksheet_range(sheet_name).ok();
        sheets.push(parse_sheet(sheet_name, range.as_ref()));
    }

    Ok(Workbook {
        path: path.to_path_buf(),
        sheets,
    })
}

fn parse_sheet(name: &str, range: Option<&Range<Data>>) -> Sheet {
    let mut rows = Vec::new();

    if let Some(range) = range {
        if let Some((start_row, start_col)) = range.start() {
            for (i, cells) in range.rows().enumerate() {
                // Pad leading columns so index 0 is always column A; the
                // classifier reads name/code/price at absolute B/C/D.
                let mut values = vec![CellValue::Empty; start_col as usize];
                values.extend(cells.iter().map(parse_cell_value));

                rows.push(Row {
                    number: start_row + i as u32 + 1,
                    values,
                });
            }
        }
    }

    Sheet {
        name: name.to_string(),
        rows,
    }
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        // String cells are trimmed at read time, before any classification
        Data::String(s) => CellValue::Text(s.trim().to_string()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Text(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.trim().to_string()),
        Data::DurationIso(s) => CellValue::Text(s.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_value_trims_text() {
        assert_eq!(
            parse_cell_value(&Data::String("  CODE  ".to_string())),
            CellValue::Text("CODE".to_string())
        );
        assert_eq!(parse_cell_value(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(parse_cell_value(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_parse_sheet_pads_to_column_a() {
        // Range starting at C2 (0-based (1, 2))
        let mut range: Range<Data> = Range::new((1, 2), (1, 3));
        range.set_value((1, 2), Data::String("X".to_string()));
        range.set_value((1, 3), Data::Float(5.0));

        let sheet = parse_sheet("S", Some(&range));
        assert_eq!(sheet.rows.len(), 1);

        let row = &sheet.rows[0];
        assert_eq!(row.number, 2);
        assert_eq!(row.values[0], CellValue::Empty);
        assert_eq!(row.values[1], CellValue::Empty);
        assert_eq!(row.values[2], CellValue::Text("X".to_string()));
        assert_eq!(row.values[3], CellValue::Number(5.0));
    }

    #[test]
    fn test_parse_sheet_empty_range() {
        let sheet = parse_sheet("Empty", None);
        assert!(sheet.rows.is_empty());
    }
}

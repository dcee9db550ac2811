//! Workbook data structures

use std::path::PathBuf;

/// Represents a complete workbook
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub path: PathBuf,
    /// Sheets in workbook order
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Represents a worksheet
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    /// Rows in natural top-to-bottom order. Row order is load-bearing:
    /// category state is a sequential fold over it.
    pub rows: Vec<Row>,
}

/// One worksheet row
#[derive(Debug, Clone)]
pub struct Row {
    /// 1-based worksheet row number
    pub number: u32,
    /// Cell values padded so that index 0 is always column A, regardless
    /// of where the sheet's used range starts
    pub values: Vec<CellValue>,
}

/// Cell value types
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl CellValue {
    /// Check whether the value counts as blank for row classification and
    /// required-field checks: empty cells, empty text, zero and false
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(n) => *n == 0.0,
            CellValue::Boolean(b) => !b,
        }
    }

    /// Get the text content if this is a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value for output. Integral numbers drop the trailing
    /// fraction so a numeric product code 123.0 becomes "123".
    pub fn as_display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Boolean(b) => b.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::Text(String::new()).is_blank());
        assert!(CellValue::Number(0.0).is_blank());
        assert!(CellValue::Boolean(false).is_blank());

        assert!(!CellValue::Text("X".to_string()).is_blank());
        assert!(!CellValue::Number(42.0).is_blank());
        assert!(!CellValue::Boolean(true).is_blank());
    }

    #[test]
    fn test_as_display() {
        assert_eq!(CellValue::Empty.as_display(), "");
        assert_eq!(CellValue::Text("ABC-1".to_string()).as_display(), "ABC-1");
        assert_eq!(CellValue::Number(123.0).as_display(), "123");
        assert_eq!(CellValue::Number(12.5).as_display(), "12.5");
        assert_eq!(CellValue::Boolean(true).as_display(), "true");
    }
}

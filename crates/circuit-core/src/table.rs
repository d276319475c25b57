//! Raw sheet types: a header-less grid of typed cells

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A header-less grid read from a single spreadsheet or CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    /// Rows of cells; rows may have different lengths
    pub rows: Vec<Vec<CellValue>>,
    /// Source file path
    pub source_path: PathBuf,
}

/// A cell value with type detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// String value
    String(String),
    /// Empty/null cell
    Empty,
}

impl CellValue {
    /// Parse a string into a CellValue, detecting the type
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        // Try parsing as integer first
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }

        // "nan", "inf" and overflowing exponents parse as floats but are
        // text in a crosstable
        if trimmed.bytes().any(|b| b.is_ascii_digit()) {
            if let Some(f) = trimmed.parse::<f64>().ok().filter(|f| f.is_finite()) {
                return CellValue::Float(f);
            }
        }

        CellValue::String(trimmed.to_string())
    }

    /// Build a numeric cell; spreadsheets store every number as a float,
    /// so integral values are kept as integers
    pub fn from_number(f: f64) -> Self {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            CellValue::Integer(f as i64)
        } else {
            CellValue::Float(f)
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Convert to a display string
    pub fn to_string_value(&self) -> String {
        match self {
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }

    /// Trimmed display text
    pub fn text(&self) -> String {
        match self {
            CellValue::String(s) => s.trim().to_string(),
            other => other.to_string_value(),
        }
    }

    /// True when the cell text is non-empty and made only of ASCII digits;
    /// decimal text such as "3.0" does not qualify
    pub fn is_digits(&self) -> bool {
        match self {
            CellValue::Integer(i) => *i >= 0,
            CellValue::String(s) => {
                let text = s.trim();
                !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
            }
            CellValue::Float(_) | CellValue::Empty => false,
        }
    }

    /// Numeric value, converting text such as "1850" or "3.0"
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f).filter(|f| f.is_finite()),
            CellValue::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            CellValue::Empty => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Empty => write!(f, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_parse_integer() {
        assert_eq!(CellValue::parse("42"), CellValue::Integer(42));
        assert_eq!(CellValue::parse(" 7 "), CellValue::Integer(7));
    }

    #[test]
    fn test_cell_value_parse_float() {
        assert_eq!(CellValue::parse("5.5"), CellValue::Float(5.5));
        assert_eq!(CellValue::parse("3.0"), CellValue::Float(3.0));
    }

    #[test]
    fn test_cell_value_parse_text_markers() {
        assert_eq!(CellValue::parse("nan"), CellValue::String("nan".to_string()));
        assert_eq!(CellValue::parse("1.Rd"), CellValue::String("1.Rd".to_string()));
        assert_eq!(CellValue::parse("½"), CellValue::String("½".to_string()));
    }

    #[test]
    fn test_cell_value_parse_empty() {
        assert_eq!(CellValue::parse(""), CellValue::Empty);
        assert_eq!(CellValue::parse("   "), CellValue::Empty);
    }

    #[test]
    fn test_from_number_keeps_integral_values() {
        assert_eq!(CellValue::from_number(12.0), CellValue::Integer(12));
        assert_eq!(CellValue::from_number(4.5), CellValue::Float(4.5));
    }

    #[test]
    fn test_is_digits() {
        assert!(CellValue::Integer(3).is_digits());
        assert!(CellValue::String(" 12 ".to_string()).is_digits());
        assert!(!CellValue::String("Rk.".to_string()).is_digits());
        assert!(!CellValue::Integer(-1).is_digits());
        assert!(!CellValue::Empty.is_digits());
    }

    #[test]
    fn test_decimal_text_is_not_digits() {
        assert!(!CellValue::parse("3.0").is_digits());
        assert!(!CellValue::Float(3.0).is_digits());
        assert!(!CellValue::String("3.0".to_string()).is_digits());
        assert!(CellValue::from_number(3.0).is_digits());
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(CellValue::String("1850".to_string()).as_f64(), Some(1850.0));
        assert_eq!(CellValue::String("abc".to_string()).as_f64(), None);
        assert_eq!(CellValue::Empty.as_f64(), None);
    }

    #[test]
    fn test_non_finite_numbers_have_no_value() {
        assert_eq!(CellValue::parse("1e999"), CellValue::String("1e999".to_string()));
        assert_eq!(CellValue::parse("1e999").as_f64(), None);
        assert_eq!(CellValue::Float(f64::INFINITY).as_f64(), None);
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
    }
}

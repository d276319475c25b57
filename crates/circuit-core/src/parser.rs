//! Sheet readers for crosstable exports (Excel workbooks and CSV)

use crate::error::{Error, Result};
use crate::table::{CellValue, Sheet};
use calamine::{open_workbook_auto, Data, Reader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read the first worksheet of a spreadsheet file, picking the reader by extension
pub fn read_sheet<P: AsRef<Path>>(path: P) -> Result<Sheet> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => read_workbook(path),
        Some("csv") => parse_csv(path),
        _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Read the first worksheet of an Excel/ODS workbook
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Sheet> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::Workbook {
        path: path.to_path_buf(),
        source: e,
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::EmptyWorkbook(path.to_path_buf()))?
        .map_err(|e| Error::Workbook {
            path: path.to_path_buf(),
            source: e,
        })?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    Ok(Sheet {
        rows,
        source_path: path.to_path_buf(),
    })
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::from_number(*f),
        Data::String(s) => CellValue::parse(s),
        other => CellValue::parse(&other.to_string()),
    }
}

/// Parse a header-less CSV export into a Sheet
pub fn parse_csv<P: AsRef<Path>>(path: P) -> Result<Sheet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = BufReader::new(file);
    let csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // Preamble lines are shorter than player rows
        .from_reader(reader);

    collect_rows(csv_reader, path)
}

/// Parse CSV from a string (useful for testing)
pub fn parse_csv_str(content: &str, source_name: &str) -> Result<Sheet> {
    let csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    collect_rows(csv_reader, Path::new(source_name))
}

fn collect_rows<R: std::io::Read>(mut csv_reader: csv::Reader<R>, path: &Path) -> Result<Sheet> {
    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        rows.push(record.iter().map(CellValue::parse).collect());
    }

    Ok(Sheet {
        rows,
        source_path: path.to_path_buf(),
    })
}

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type, TimeUnit,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use calamine::{Data, Reader, open_workbook_auto};
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawTable};
use crate::errors::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the named sheet of a tabular file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – workbook, `sheet` must exist
/// * `.csv`     – header row + records; `sheet` is ignored
/// * `.json`    – `[{ "Placa": "...", "Km/litro": 9.1, ... }, ...]`
/// * `.parquet` – one scalar column per field
pub fn load_table(path: &Path, sheet: &str) -> Result<RawTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path, sheet)?,
        "csv" => load_csv(path).map_err(|e| LoadError::unreadable(path, e))?,
        "json" => load_json(path).map_err(|e| LoadError::unreadable(path, e))?,
        "parquet" | "pq" => load_parquet(path).map_err(|e| LoadError::unreadable(path, e))?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    info!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

/// First row of the sheet is the header; every later row is a record.
fn load_workbook(path: &Path, sheet: &str) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::unreadable(path, e))?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet) {
        return Err(LoadError::MissingSheet {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            available,
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| LoadError::unreadable(path, e))?;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Ok(RawTable::default()),
    };

    let rows = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(RawTable::new(columns, rows))
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Null),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        _ => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one fueling event per record.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable::new(columns, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    // Zero-padded identifiers such as card "000123" or plate "0042" stay text.
    if has_leading_zero(s) {
        return CellValue::String(s.to_string());
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

fn has_leading_zero(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut chars = digits.chars();
    chars.next() == Some('0') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`.
/// Columns appear in the order they are first seen.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut keyed_rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let mut cells = Vec::with_capacity(obj.len());
        for (key, val) in obj {
            let pos = *positions.entry(key.clone()).or_insert_with(|| {
                columns.push(key.clone());
                columns.len() - 1
            });
            cells.push((pos, json_to_cell(val)));
        }
        keyed_rows.push(cells);
    }

    let rows = keyed_rows
        .into_iter()
        .map(|cells| {
            let mut row = vec![CellValue::Null; columns.len()];
            for (pos, cell) in cells {
                row[pos] = cell;
            }
            row
        })
        .collect();

    Ok(RawTable::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file whose columns are the sheet's columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()?;
            rows.push(cells);
        }
    }

    Ok(RawTable::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => datetime_cell(
            col.as_primitive::<Date32Type>().value_as_datetime(row),
        ),
        DataType::Timestamp(unit, _) => datetime_cell(match unit {
            TimeUnit::Second => col
                .as_primitive::<TimestampSecondType>()
                .value_as_datetime(row),
            TimeUnit::Millisecond => col
                .as_primitive::<TimestampMillisecondType>()
                .value_as_datetime(row),
            TimeUnit::Microsecond => col
                .as_primitive::<TimestampMicrosecondType>()
                .value_as_datetime(row),
            TimeUnit::Nanosecond => col
                .as_primitive::<TimestampNanosecondType>()
                .value_as_datetime(row),
        }),
        other => bail!("Unsupported parquet column type {other:?}"),
    };
    Ok(cell)
}

fn datetime_cell(value: Option<chrono::NaiveDateTime>) -> CellValue {
    value.map(CellValue::DateTime).unwrap_or(CellValue::Null)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        path
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_table(Path::new("/definitely/not/here.xlsx"), "DADOS").unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.txt", "hello");
        let err = load_table(&path, "DADOS").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn csv_cells_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "data.csv",
            "Placa,Km/litro,Motorista\nABC1D23,9.5,\nXYZ,10,Ana\n",
        );
        let table = load_table(&path, "ignored").unwrap();
        assert_eq!(table.columns, vec!["Placa", "Km/litro", "Motorista"]);
        assert_eq!(table.rows[0][1], CellValue::Float(9.5));
        assert_eq!(table.rows[0][2], CellValue::Null);
        assert_eq!(table.rows[1][1], CellValue::Integer(10));
    }

    #[test]
    fn json_columns_follow_first_appearance() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "data.json",
            r#"[{"Placa": "A", "Km/litro": 9.5}, {"Motorista": "Ana", "Placa": "B"}]"#,
        );
        let table = load_table(&path, "ignored").unwrap();
        assert_eq!(table.columns, vec!["Placa", "Km/litro", "Motorista"]);
        assert_eq!(table.rows[0][2], CellValue::Null);
        assert_eq!(table.rows[1][0], CellValue::String("B".into()));
    }

    #[test]
    fn broken_json_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.json", "{ not json");
        let err = load_table(&path, "ignored").unwrap_err();
        assert!(matches!(err, LoadError::Unreadable { .. }));
    }

    #[test]
    fn garbage_workbook_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.xlsx", "this is not a zip archive");
        let err = load_table(&path, "DADOS").unwrap_err();
        assert!(matches!(err, LoadError::Unreadable { .. }));
    }

    #[test]
    fn zero_padded_csv_ids_keep_their_digits() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.csv", "Cartao,Placa,Valor\n000123,0042,0.5\n");
        let table = load_table(&path, "ignored").unwrap();
        assert_eq!(table.rows[0][0], CellValue::String("000123".into()));
        assert_eq!(table.rows[0][1], CellValue::String("0042".into()));
        assert_eq!(table.rows[0][2], CellValue::Float(0.5));
        assert_eq!(guess_cell_type("0"), CellValue::Integer(0));
        assert_eq!(guess_cell_type("-07"), CellValue::String("-07".into()));
    }

    fn write_workbook(dir: &tempfile::TempDir) -> std::path::PathBuf {
        use rust_xlsxwriter::{Format, Workbook};

        let path = dir.path().join("fuel.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("DADOS").unwrap();
        for (col, name) in ["Placa", "Data/Hora", "Km/litro", "Cartao"].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        let date = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
        sheet.write_string(1, 0, "ABC1D23").unwrap();
        // 2023-01-02 12:00 as an Excel serial date.
        sheet.write_number_with_format(1, 1, 44928.5, &date).unwrap();
        sheet.write_number(1, 2, 9.5).unwrap();
        sheet.write_string(1, 3, "000123").unwrap();
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn workbook_sheet_is_read_with_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(&dir);
        let table = load_table(&path, "DADOS").unwrap();
        assert_eq!(table.columns, vec!["Placa", "Data/Hora", "Km/litro", "Cartao"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], CellValue::String("ABC1D23".into()));
        let noon = chrono::NaiveDate::from_ymd_opt(2023, 1, 2)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap();
        assert_eq!(table.rows[0][1], CellValue::DateTime(noon));
        assert_eq!(table.rows[0][2].as_f64(), Some(9.5));
        assert_eq!(table.rows[0][3], CellValue::String("000123".into()));
    }

    #[test]
    fn workbook_without_sheet_lists_available_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(&dir);
        let err = load_table(&path, "OUTRA").unwrap_err();
        match err {
            LoadError::MissingSheet { sheet, available, .. } => {
                assert_eq!(sheet, "OUTRA");
                assert_eq!(available, vec!["DADOS"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parquet_columns_are_typed() {
        use arrow::array::{
            ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
            TimestampMillisecondArray,
        };
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let batch = RecordBatch::try_from_iter(vec![
            (
                "Placa",
                Arc::new(StringArray::from(vec![Some("ABC1D23"), None])) as ArrayRef,
            ),
            ("Km Rodados", Arc::new(Int64Array::from(vec![100, 250])) as ArrayRef),
            (
                "Km/litro",
                Arc::new(Float64Array::from(vec![Some(9.5), None])) as ArrayRef,
            ),
            ("Ativo", Arc::new(BooleanArray::from(vec![true, false])) as ArrayRef),
            ("Dia", Arc::new(Date32Array::from(vec![19359, 19360])) as ArrayRef),
            (
                "Data/Hora",
                Arc::new(TimestampMillisecondArray::from(vec![
                    1_672_646_400_000,
                    1_672_650_000_000,
                ])) as ArrayRef,
            ),
        ])
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fuel.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_table(&path, "ignored").unwrap();
        assert_eq!(
            table.columns,
            vec!["Placa", "Km Rodados", "Km/litro", "Ativo", "Dia", "Data/Hora"]
        );
        let day = chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::String("ABC1D23".into()),
                CellValue::Integer(100),
                CellValue::Float(9.5),
                CellValue::Bool(true),
                CellValue::DateTime(day.and_hms_opt(0, 0, 0).unwrap()),
                CellValue::DateTime(day.and_hms_opt(8, 0, 0).unwrap()),
            ]
        );
        assert_eq!(table.rows[1][0], CellValue::Null);
        assert_eq!(table.rows[1][2], CellValue::Null);
        assert_eq!(
            table.rows[1][5],
            CellValue::DateTime(day.and_hms_opt(9, 0, 0).unwrap())
        );
    }
}

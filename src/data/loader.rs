use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{
    parse_damage_types, CellValue, Dataset, Report, DAMAGES_FOUND, IMAGE_URL, KNOWN_COLUMNS,
    ROOM_NO, SEVERITY_SCORE, TOWER,
};
use crate::error::DataError;

type Result<T> = std::result::Result<T, DataError>;

/// Base file name of the inspection table inside the data directory.
pub const DATA_FILE_STEM: &str = "damage_data";

// ---------------------------------------------------------------------------
// DataSource – ordered candidates + memoized result
// ---------------------------------------------------------------------------

/// Loads the inspection table from the first candidate file that exists and
/// keeps it for the lifetime of the value.
#[derive(Debug)]
pub struct DataSource {
    candidates: Vec<PathBuf>,
    cache: OnceLock<Dataset>,
}

impl DataSource {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        DataSource {
            candidates,
            cache: OnceLock::new(),
        }
    }

    /// Parquet first, then CSV, both inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(default_candidates(data_dir))
    }

    /// The loaded dataset. The first call reads the files; later calls are free.
    ///
    /// A failed load is not cached, so a later call retries.
    pub fn dataset(&self) -> Result<&Dataset> {
        if let Some(ds) = self.cache.get() {
            return Ok(ds);
        }
        let ds = load(&self.candidates)?;
        Ok(self.cache.get_or_init(|| ds))
    }
}

/// `<dir>/damage_data.parquet`, `<dir>/damage_data.csv`.
pub fn default_candidates(data_dir: &Path) -> Vec<PathBuf> {
    vec![
        data_dir.join(format!("{DATA_FILE_STEM}.parquet")),
        data_dir.join(format!("{DATA_FILE_STEM}.csv")),
    ]
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the first candidate that exists.
///
/// Missing files are skipped; when none exists an empty dataset is returned.
/// A file that exists but does not parse is an error.
pub fn load(candidates: &[PathBuf]) -> Result<Dataset> {
    for path in candidates {
        match load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} reports from {} with columns {:?}",
                    dataset.len(),
                    path.display(),
                    dataset.columns
                );
                return Ok(dataset);
            }
            Err(e) if e.is_not_found() => {
                log::debug!("{} not found, trying next candidate", path.display());
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    log::warn!("No data file found among {candidates:?}; starting with an empty dataset");
    Ok(Dataset::empty())
}

/// Load a single file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – as written by `df.to_parquet()` (Pandas) or Polars
/// * `.csv`     – header row followed by one report per line
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "csv" => load_csv(path),
        _ => Err(DataError::Unsupported(path.to_path_buf())),
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Row assembly (shared by both formats)
// ---------------------------------------------------------------------------

/// Map named cells of one row onto a [`Report`]. `row` is the 1-based data
/// row, header not counted.
fn build_report<I>(path: &Path, row: usize, cells: I) -> Result<Report>
where
    I: IntoIterator<Item = (String, CellValue)>,
{
    let mut report = Report::default();
    for (column, value) in cells {
        match column.as_str() {
            ROOM_NO => report.room_no = value.into_text(),
            TOWER => report.tower = value.into_text(),
            DAMAGES_FOUND => report.damages_found = value.into_text(),
            IMAGE_URL => report.image_url = value.into_text(),
            SEVERITY_SCORE => {
                report.severity_score = severity_from_cell(value).map_err(|message| {
                    DataError::Parse {
                        path: path.to_path_buf(),
                        row,
                        column: column.clone(),
                        message,
                    }
                })?
            }
            _ => {
                report.extra.insert(column, value);
            }
        }
    }
    report.damage_types = parse_damage_types(report.damages_found.as_deref());
    Ok(report)
}

fn severity_from_cell(value: CellValue) -> std::result::Result<Option<f64>, String> {
    let score = match value {
        CellValue::Null => return Ok(None),
        CellValue::Integer(i) => i as f64,
        CellValue::Float(f) => f,
        CellValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map_err(|_| format!("'{s}' is not a number"))?
        }
        CellValue::Bool(b) => return Err(format!("expected a number, got boolean {b}")),
    };
    // NaN is how Pandas spells a missing score.
    Ok((!score.is_nan()).then_some(score))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one report per record.
/// Empty fields are missing values.
fn load_csv(path: &Path) -> Result<Dataset> {
    let file = open(path)?;
    let csv_err = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            // Excel-style exports carry a BOM in front of the first header.
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut reports = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let cells = headers.iter().zip(record.iter()).map(|(col, value)| {
            let cell = if KNOWN_COLUMNS.contains(&col.as_str()) {
                text_cell(value)
            } else {
                guess_cell_type(value)
            };
            (col.clone(), cell)
        });
        reports.push(build_report(path, row_no + 1, cells)?);
    }

    Ok(Dataset::new(reports, headers))
}

fn text_cell(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" => CellValue::Bool(true),
        "false" | "False" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of inspection reports.
///
/// Every column is optional. String, integer, float and boolean columns are
/// read natively; anything else (dictionary, timestamp, ...) is rendered to
/// text through Arrow's display formatter.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = open(path)?;
    let parquet_err = |source| DataError::Parquet {
        path: path.to_path_buf(),
        source,
    };
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(parquet_err)?;

    let mut reports = Vec::new();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.map_err(|source| DataError::Arrow {
            path: path.to_path_buf(),
            source,
        })?;

        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(columns.len());
            for (col_idx, col_name) in columns.iter().enumerate() {
                let value = extract_cell(batch.column(col_idx), row).map_err(|source| {
                    DataError::Arrow {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                cells.push((col_name.clone(), value));
            }
            reports.push(build_report(path, row_offset + row + 1, cells)?);
        }
        row_offset += batch.num_rows();
    }

    Ok(Dataset::new(reports, columns))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(
    col: &ArrayRef,
    row: usize,
) -> std::result::Result<CellValue, arrow::error::ArrowError> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Float(v as f64))
        }
        DataType::Float32 => {
            CellValue::Float(col.as_primitive::<Float32Type>().value(row).into())
        }
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => CellValue::String(array_value_to_string(col, row)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use super::*;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    fn write_parquet(path: &Path) {
        let schema = Arc::new(Schema::new(vec![
            Field::new(ROOM_NO, DataType::Utf8, true),
            Field::new(TOWER, DataType::Utf8, true),
            Field::new(DAMAGES_FOUND, DataType::Utf8, true),
            Field::new(SEVERITY_SCORE, DataType::Float64, true),
            Field::new("Floor", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("1674/479"), Some("1674/47")])),
                Arc::new(StringArray::from(vec![Some("Tower 1"), None])),
                Arc::new(StringArray::from(vec![Some("Cracked wall, Water leak"), None])),
                Arc::new(Float64Array::from(vec![Some(15.0), None])),
                Arc::new(Int64Array::from(vec![Some(4), Some(1)])),
            ],
        )
        .unwrap();
        let file = File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn missing_files_fall_back_to_empty_dataset() {
        let dir = TempDir::new().unwrap();
        let ds = load(&default_candidates(dir.path())).unwrap();
        assert!(ds.is_empty());
        assert!(ds.columns.is_empty());
    }

    #[test]
    fn csv_is_used_when_parquet_is_missing() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "damage_data.csv",
            "Room No,Tower,Damages Found,Severity Score,Image URL\n\
             101,A,\"Water leak,  Cracked wall ,\",5,https://img.example/101.jpg\n\
             102,B,,,\n"
                .as_bytes(),
        );

        let ds = load(&default_candidates(dir.path())).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.columns, KNOWN_COLUMNS.map(String::from).to_vec());

        let first = &ds.reports[0];
        assert_eq!(first.room_no.as_deref(), Some("101"));
        assert_eq!(first.damage_types, vec!["Water leak", "Cracked wall"]);
        assert_eq!(first.severity_score, Some(5.0));
        assert_eq!(first.image(), Some("https://img.example/101.jpg"));

        let second = &ds.reports[1];
        assert_eq!(second.tower.as_deref(), Some("B"));
        assert!(second.damage_types.is_empty());
        assert_eq!(second.severity_score, None);
        assert_eq!(second.image_url, None);
    }

    #[test]
    fn csv_keeps_room_numbers_as_text_and_extra_columns_typed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "rooms.csv", b"\xEF\xBB\xBFRoom No,Floor\n007,3\n");
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.columns, vec![ROOM_NO.to_string(), "Floor".to_string()]);
        assert_eq!(ds.reports[0].room_no.as_deref(), Some("007"));
        assert_eq!(ds.reports[0].extra.get("Floor"), Some(&CellValue::Integer(3)));
        assert!(!ds.has_column(DAMAGES_FOUND));
        assert!(ds.reports[0].damage_types.is_empty());
    }

    #[test]
    fn parquet_is_preferred_over_csv() {
        let dir = TempDir::new().unwrap();
        write_parquet(&dir.path().join("damage_data.parquet"));
        write_file(&dir, "damage_data.csv", b"Room No\n999\n");

        let ds = load(&default_candidates(dir.path())).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.reports[0].room_no.as_deref(), Some("1674/479"));
        assert_eq!(ds.reports[0].damage_types, vec!["Cracked wall", "Water leak"]);
        assert_eq!(ds.reports[0].severity_score, Some(15.0));
        assert_eq!(ds.reports[1].tower, None);
        assert_eq!(ds.reports[1].severity_score, None);
        assert_eq!(ds.reports[1].extra.get("Floor"), Some(&CellValue::Integer(1)));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "damage_data.csv", b"Room No,Tower\n\xff\xfe,A\n");
        let err = load(&default_candidates(dir.path())).unwrap_err();
        assert!(matches!(err, DataError::Csv { .. }), "got {err:?}");
    }

    #[test]
    fn corrupt_parquet_is_an_error_not_a_fallback() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "damage_data.parquet", b"definitely not parquet");
        write_file(&dir, "damage_data.csv", b"Room No\n101\n");
        let err = load(&default_candidates(dir.path())).unwrap_err();
        assert!(matches!(err, DataError::Parquet { .. }), "got {err:?}");
    }

    #[test]
    fn non_numeric_severity_reports_row_and_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.csv", b"Room No,Severity Score\n101,5\n102,high\n");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("data row 2"), "got {err}");
        match err {
            DataError::Parse { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, SEVERITY_SCORE);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("damage_data.xlsx")).unwrap_err();
        assert!(matches!(err, DataError::Unsupported(_)));
    }

    #[test]
    fn data_source_memoizes_first_load() {
        let dir = TempDir::new().unwrap();
        let csv = write_file(&dir, "damage_data.csv", b"Room No\n101\n");
        let source = DataSource::in_dir(dir.path());

        assert_eq!(source.dataset().unwrap().len(), 1);
        std::fs::remove_file(csv).unwrap();
        assert_eq!(source.dataset().unwrap().len(), 1);
    }
}

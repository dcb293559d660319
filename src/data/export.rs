use super::model::Dataset;
use crate::error::DataError;

/// UTF-8 byte-order mark, so spreadsheet tools pick the right encoding for
/// Thai text.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serialize a dataset to CSV: BOM, header of the source columns, one record
/// per report. Missing values become empty fields.
pub fn to_csv_bytes(dataset: &Dataset) -> Result<Vec<u8>, DataError> {
    let mut out = UTF8_BOM.to_vec();
    if dataset.columns.is_empty() {
        return Ok(out);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&dataset.columns)?;
    for report in &dataset.reports {
        writer.write_record(
            dataset
                .columns
                .iter()
                .map(|col| report.cell_text(col).unwrap_or_default()),
        )?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| DataError::Export(e.into_error().into()))?;
    out.extend_from_slice(&body);
    Ok(out)
}

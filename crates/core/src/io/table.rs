//! Feature matrix CSV output

use crate::error::{Error, Result};
use crate::features::FeatureMatrix;
use std::io::Write;
use std::path::Path;

/// Write a feature matrix as CSV with a header row.
///
/// `header` must have one name per column.
pub fn write_feature_csv<P: AsRef<Path>>(
    matrix: &FeatureMatrix,
    header: &[String],
    path: P,
) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_feature_table(matrix, header, None, file)
}

/// Write a feature matrix as CSV to any sink, optionally prefixed with
/// a per-row label column.
pub fn write_feature_table<W: Write>(
    matrix: &FeatureMatrix,
    header: &[String],
    labels: Option<&[usize]>,
    sink: W,
) -> Result<()> {
    if header.len() != matrix.ncols() {
        return Err(Error::LengthMismatch {
            what: "CSV header",
            expected: matrix.ncols(),
            actual: header.len(),
        });
    }
    if let Some(labels) = labels {
        if labels.len() != matrix.nrows() {
            return Err(Error::LengthMismatch {
                what: "labels",
                expected: matrix.nrows(),
                actual: labels.len(),
            });
        }
    }

    let mut writer = csv::Writer::from_writer(sink);

    let mut head: Vec<&str> = Vec::with_capacity(header.len() + 1);
    if labels.is_some() {
        head.push("label_idx");
    }
    head.extend(header.iter().map(String::as_str));
    writer.write_record(&head)?;

    for (i, row) in matrix.rows().into_iter().enumerate() {
        let mut record: Vec<String> = Vec::with_capacity(row.len() + 1);
        if let Some(labels) = labels {
            record.push(labels[i].to_string());
        }
        record.extend(row.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

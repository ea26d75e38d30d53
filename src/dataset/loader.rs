use std::{fs::File, io::Read, path::Path};

use csv::ReaderBuilder;
use ndarray::{Array1, Array2};

use crate::error::{Error, Result};

use super::Dataset;

#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_headers: bool,
    /// Column holding the target; the last column when `None`.
    pub target_column: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct CsvOptionsBuilder {
    delimiter: u8,
    has_headers: bool,
    target_column: Option<usize>,
}

impl CsvOptionsBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            target_column: None,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn has_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn target_column(mut self, target_column: usize) -> Self {
        self.target_column = Some(target_column);
        self
    }

    pub fn build(self) -> CsvOptions {
        CsvOptions {
            delimiter: self.delimiter,
            has_headers: self.has_headers,
            target_column: self.target_column,
        }
    }
}

impl Default for CsvOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptionsBuilder::new().build()
    }
}

/// A dataset together with the column names it was loaded from.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    pub dataset: Dataset,
    pub feature_names: Vec<String>,
    pub target_name: String,
}

pub fn load_csv<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<LabeledDataset> {
    let file = File::open(path)?;
    read_csv(file, options)
}

/// Reads a numeric CSV table and splits off the target column.
///
/// Blank lines are skipped and surrounding quotes/whitespace are trimmed from
/// every field.
pub fn read_csv<R: Read>(reader: R, options: &CsvOptions) -> Result<LabeledDataset> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut header: Option<Vec<String>> = if options.has_headers {
        Some(rdr.headers()?.iter().map(str::to_string).collect())
    } else {
        None
    };

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let n_cols = header
            .get_or_insert_with(|| (0..record.len()).map(|i| format!("col_{}", i)).collect())
            .len();
        if record.len() != n_cols {
            return Err(Error::RaggedRow {
                row,
                expected: n_cols,
                found: record.len(),
            });
        }
        let values = record
            .iter()
            .enumerate()
            .map(|(column, field)| {
                field.parse::<f64>().map_err(|source| Error::Parse {
                    row,
                    column,
                    value: field.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(values);
    }

    let header = header.ok_or(Error::EmptyDataset)?;
    if rows.is_empty() {
        return Err(Error::EmptyDataset);
    }
    let n_cols = header.len();
    if n_cols < 2 {
        return Err(Error::EmptyFeatureRow { row: 0 });
    }
    let target = options.target_column.unwrap_or(n_cols - 1);
    if target >= n_cols {
        return Err(Error::invalid_parameter(
            "target_column",
            format!("index {} out of range for {} columns", target, n_cols),
        ));
    }

    let n_rows = rows.len();
    let mut y = Vec::with_capacity(n_rows);
    let mut x = Vec::with_capacity(n_rows * (n_cols - 1));
    for mut values in rows {
        y.push(values.remove(target));
        x.extend(values);
    }
    let x = Array2::from_shape_vec((n_rows, n_cols - 1), x)
        .map_err(|e| Error::invalid_parameter("rows", e.to_string()))?;
    let dataset = Dataset::new(x, Array1::from(y))?;

    let mut feature_names = header;
    let target_name = feature_names.remove(target);

    Ok(LabeledDataset {
        dataset,
        feature_names,
        target_name,
    })
}

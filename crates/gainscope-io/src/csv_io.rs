use crate::error::{IoError, IoResult};
use gainscope_core::Matrix;
use gainscope_data::Dataset;
use gainscope_preprocessing::Scaling;
use std::path::Path;
use tracing::{debug, info};

/// Read every record of a headered numeric CSV.
fn read_numeric(path: &Path) -> IoResult<(Vec<String>, Vec<Vec<f64>>)> {
    let mut rdr = csv::Reader::from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let values = record
            .iter()
            .enumerate()
            .map(|(j, field)| {
                field.trim().parse::<f64>().map_err(|_| IoError::Parse {
                    path: path.to_path_buf(),
                    row: row + 1,
                    column: headers.get(j).cloned().unwrap_or_else(|| j.to_string()),
                    value: field.to_string(),
                })
            })
            .collect::<IoResult<Vec<f64>>>()?;
        rows.push(values);
    }

    if rows.is_empty() {
        return Err(IoError::Empty(path.to_path_buf()));
    }
    Ok((headers, rows))
}

fn to_label(row: usize, value: f64) -> IoResult<usize> {
    if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
        return Err(IoError::InvalidLabel { row, value });
    }
    Ok(value as usize)
}

/// Load a labelled dataset from a headered numeric CSV.
///
/// `label_column` names the label column; the last column is used when it
/// is `None`. Every other column becomes a feature, rescaled with `scaling`.
pub fn read_dataset<P: AsRef<Path>>(
    path: P,
    label_column: Option<&str>,
    scaling: Scaling,
) -> IoResult<Dataset> {
    let path = path.as_ref();
    let (headers, rows) = read_numeric(path)?;

    let label_idx = match label_column {
        Some(name) => headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IoError::MissingColumn(name.to_string()))?,
        None => headers
            .len()
            .checked_sub(1)
            .ok_or_else(|| IoError::MissingColumn("<last>".to_string()))?,
    };

    let n_features = headers.len() - 1;
    let mut features = Vec::with_capacity(rows.len() * n_features);
    let mut labels = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            if j == label_idx {
                labels.push(to_label(i + 1, v)?);
            } else {
                features.push(v);
            }
        }
    }

    let x = Matrix::new(features, rows.len(), n_features)?;
    let x = scaling.apply(&x)?;
    info!(
        path = %path.display(),
        samples = labels.len(),
        features = n_features,
        ?scaling,
        "loaded dataset"
    );
    Ok(Dataset::new(x, labels)?)
}

/// Load model output: first column holds the label, the rest class probabilities.
pub fn read_predictions<P: AsRef<Path>>(path: P) -> IoResult<(Vec<usize>, Matrix)> {
    let path = path.as_ref();
    let (headers, rows) = read_numeric(path)?;
    if headers.len() < 2 {
        return Err(IoError::MissingColumn("probability".to_string()));
    }

    let n_classes = headers.len() - 1;
    let mut labels = Vec::with_capacity(rows.len());
    let mut probs = Vec::with_capacity(rows.len() * n_classes);
    for (i, row) in rows.iter().enumerate() {
        labels.push(to_label(i + 1, row[0])?);
        probs.extend_from_slice(&row[1..]);
    }
    let ypred = Matrix::new(probs, rows.len(), n_classes)?;
    debug!(path = %path.display(), samples = labels.len(), "loaded predictions");
    Ok((labels, ypred))
}

/// Write labels next to class probabilities, in the layout `read_predictions` reads.
pub fn write_predictions<P: AsRef<Path>>(path: P, labels: &[usize], ypred: &Matrix) -> IoResult<()> {
    if labels.len() != ypred.rows() {
        return Err(IoError::RaggedTable {
            name: "label".to_string(),
            len: labels.len(),
            expected: ypred.rows(),
        });
    }
    let mut wtr = csv::Writer::from_path(path.as_ref())?;

    let mut header = vec!["label".to_string()];
    header.extend((0..ypred.cols()).map(|c| format!("p{}", c)));
    wtr.write_record(&header)?;

    for (label, row) in labels.iter().zip(ypred.iter_rows()) {
        let mut record = vec![label.to_string()];
        record.extend(row.iter().map(|v| format!("{:?}", v)));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// One named column of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Values(Vec<f64>),
    /// Repeated on every row.
    Scalar(f64),
}

/// Named columns written with a leading row-index column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<(String, Column)>,
}

impl Table {
    pub fn new() -> Self {
        Table { columns: Vec::new() }
    }

    pub fn with_values(mut self, name: &str, values: Vec<f64>) -> Self {
        self.columns.push((name.to_string(), Column::Values(values)));
        self
    }

    pub fn with_scalar(mut self, name: &str, value: f64) -> Self {
        self.columns.push((name.to_string(), Column::Scalar(value)));
        self
    }

    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    /// Length of the longest value column; a table of scalars has one row.
    pub fn n_rows(&self) -> usize {
        self.columns
            .iter()
            .filter_map(|(_, c)| match c {
                Column::Values(v) => Some(v.len()),
                Column::Scalar(_) => None,
            })
            .max()
            .unwrap_or(1)
    }
}

/// Write a table to a CSV file, headed `,name1,name2,...`.
pub fn write_table<P: AsRef<Path>>(path: P, table: &Table) -> IoResult<()> {
    let n_rows = table.n_rows();
    for (name, column) in table.columns() {
        if let Column::Values(v) = column {
            if v.len() != n_rows {
                return Err(IoError::RaggedTable {
                    name: name.clone(),
                    len: v.len(),
                    expected: n_rows,
                });
            }
        }
    }

    let mut wtr = csv::Writer::from_path(path.as_ref())?;

    let mut header = vec![String::new()];
    header.extend(table.columns().iter().map(|(name, _)| name.clone()));
    wtr.write_record(&header)?;

    for i in 0..n_rows {
        let mut record = vec![i.to_string()];
        record.extend(table.columns().iter().map(|(_, column)| match column {
            Column::Values(v) => format!("{:?}", v[i]),
            Column::Scalar(s) => format!("{:?}", s),
        }));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    debug!(path = %path.as_ref().display(), rows = n_rows, "wrote table");
    Ok(())
}

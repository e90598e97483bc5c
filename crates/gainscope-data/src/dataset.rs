use gainscope_core::{GainError, GainResult, Matrix};

/// Feature rows paired with integer class labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Matrix,
    pub labels: Vec<usize>,
}

impl Dataset {
    pub fn new(features: Matrix, labels: Vec<usize>) -> GainResult<Self> {
        if features.rows() != labels.len() {
            return Err(GainError::DimensionMismatch(format!(
                "{} feature rows but {} labels",
                features.rows(),
                labels.len()
            )));
        }
        Ok(Dataset { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_features(&self) -> usize {
        self.features.cols()
    }

    /// Number of classes implied by the largest label.
    pub fn n_classes(&self) -> usize {
        self.labels.iter().max().map_or(0, |&m| m + 1)
    }

    /// One sample as `(feature row, label)`.
    pub fn get(&self, idx: usize) -> GainResult<(&[f64], usize)> {
        let row = self.features.row(idx)?;
        Ok((row, self.labels[idx]))
    }

    /// New dataset holding the given samples, in order.
    pub fn subset(&self, indices: &[usize]) -> GainResult<Dataset> {
        let features = self.features.select_rows(indices)?;
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        Ok(Dataset { features, labels })
    }

    /// Labels as a `[len, n_classes]` indicator matrix.
    pub fn one_hot(&self, n_classes: usize) -> GainResult<Matrix> {
        one_hot(&self.labels, n_classes)
    }
}

/// Encode labels as a `[len, n_classes]` indicator matrix.
pub fn one_hot(labels: &[usize], n_classes: usize) -> GainResult<Matrix> {
    let mut m = Matrix::zeros(labels.len(), n_classes);
    for (i, &label) in labels.iter().enumerate() {
        m.set(i, label, 1.0)?;
    }
    Ok(m)
}

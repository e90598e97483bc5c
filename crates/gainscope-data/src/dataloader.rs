use crate::dataset::Dataset;
use gainscope_core::{GainResult, Matrix};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// DataLoader for batching and shuffling datasets.
pub struct DataLoader<'a> {
    dataset: &'a Dataset,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
    indices: Vec<usize>,
    current: usize,
}

impl<'a> DataLoader<'a> {
    /// A `batch_size` of zero is treated as one batch holding the whole set.
    pub fn new(dataset: &'a Dataset, batch_size: usize, shuffle: bool, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let batch_size = if batch_size == 0 {
            dataset.len().max(1)
        } else {
            batch_size
        };
        let mut loader = DataLoader {
            dataset,
            batch_size,
            shuffle,
            rng,
            indices: (0..dataset.len()).collect(),
            current: 0,
        };
        if shuffle {
            loader.indices.shuffle(&mut loader.rng);
        }
        loader
    }

    /// Number of batches per pass.
    pub fn n_batches(&self) -> usize {
        self.indices.len().div_ceil(self.batch_size)
    }

    /// Reset the iterator (reshuffle if needed).
    pub fn reset(&mut self) {
        self.current = 0;
        if self.shuffle {
            self.indices.shuffle(&mut self.rng);
        }
    }
}

/// Yields `(features, labels)` batches. A dataset whose feature rows and labels
/// disagree yields an error for the first batch that reaches past the shorter one.
impl<'a> Iterator for DataLoader<'a> {
    type Item = GainResult<(Matrix, Vec<usize>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.indices.len() {
            return None;
        }

        let end = (self.current + self.batch_size).min(self.indices.len());
        let batch_indices = &self.indices[self.current..end];
        self.current = end;

        Some(
            self.dataset
                .subset(batch_indices)
                .map(|batch| (batch.features, batch.labels)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gainscope_core::GainError;

    fn ramp(n: usize) -> Dataset {
        let x = Matrix::new((0..n).map(|i| i as f64).collect(), n, 1).unwrap();
        Dataset::new(x, (0..n).map(|i| i % 2).collect()).unwrap()
    }

    #[test]
    fn test_batches_cover_dataset() {
        let d = ramp(10);
        let loader = DataLoader::new(&d, 4, false, None);
        assert_eq!(loader.n_batches(), 3);
        let sizes: Vec<usize> = loader
            .map(|batch| {
                let (x, y) = batch.unwrap();
                assert_eq!(x.rows(), y.len());
                y.len()
            })
            .collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let d = ramp(20);
        let mut loader = DataLoader::new(&d, 7, true, Some(1));
        loader.reset();
        let mut seen: Vec<usize> = loader
            .flat_map(|batch| batch.unwrap().0.into_data().into_iter().map(|v| v as usize))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_batch_size_means_full_batch() {
        let d = ramp(5);
        let loader = DataLoader::new(&d, 0, false, None);
        assert_eq!(loader.n_batches(), 1);
    }

    #[test]
    fn test_inconsistent_dataset_is_reported() {
        let d = Dataset {
            features: Matrix::zeros(3, 1),
            labels: vec![0, 1, 0, 1, 0],
        };
        let batches: Vec<_> = DataLoader::new(&d, 2, false, None).collect();
        assert_eq!(batches.len(), 3);
        assert!(batches[0].is_ok());
        assert!(matches!(batches[1], Err(GainError::IndexOutOfBounds { .. })));
    }
}

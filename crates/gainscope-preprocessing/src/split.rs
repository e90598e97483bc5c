use gainscope_core::{GainError, GainResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Split `n` sample indices into a training and a test part.
///
/// `train_frac` of the samples (rounded) go to the training set. With
/// `shuffle` the indices are permuted first, using `seed` when given.
/// Returns `(train_indices, test_indices)`.
pub fn train_test_split(
    n: usize,
    train_frac: f64,
    shuffle: bool,
    seed: Option<u64>,
) -> GainResult<(Vec<usize>, Vec<usize>)> {
    if !(0.0..=1.0).contains(&train_frac) {
        return Err(GainError::InvalidOperation(format!(
            "train fraction must lie in [0, 1], got {}",
            train_frac
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    if shuffle {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        indices.shuffle(&mut rng);
    }

    let train_size = ((n as f64 * train_frac).round() as usize).min(n);
    let test = indices.split_off(train_size);
    Ok((indices, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_test_split_sizes() {
        let (train, test) = train_test_split(5, 0.6, true, Some(42)).unwrap();
        assert_eq!(train.len(), 3);
        assert_eq!(test.len(), 2);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_split_without_shuffle_keeps_order() {
        let (train, test) = train_test_split(4, 0.5, false, None).unwrap();
        assert_eq!(train, vec![0, 1]);
        assert_eq!(test, vec![2, 3]);
    }

    #[test]
    fn test_split_is_reproducible() {
        let a = train_test_split(50, 0.5, true, Some(3)).unwrap();
        let b = train_test_split(50, 0.5, true, Some(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        assert!(train_test_split(10, 1.5, false, None).is_err());
    }
}

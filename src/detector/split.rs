//! Seeded train/test partitioning

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::{DetectorError, DetectorResult};

/// Row indices of each partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_rows` with `seed` and cut off `ceil(test_size * n_rows)`
/// rows for testing. The same inputs always give the same partition.
pub fn train_test_split(n_rows: usize, test_size: f64, seed: u64) -> DetectorResult<TrainTestSplit> {
    let n_test = (test_size.clamp(0.0, 1.0) * n_rows as f64).ceil() as usize;
    if n_rows == 0 || n_test >= n_rows {
        return Err(DetectorError::DatasetTooSmall { rows: n_rows, test_size });
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(TrainTestSplit { train, test: indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_round_test_up() {
        let split = train_test_split(10, 0.25, 42).unwrap();
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 7);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = train_test_split(100, 0.25, 42).unwrap();
        let b = train_test_split(100, 0.25, 42).unwrap();
        assert_eq!(a, b);

        let c = train_test_split(100, 0.25, 7).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_zero_test_size_keeps_everything() {
        let split = train_test_split(4, 0.0, 42).unwrap();
        assert!(split.test.is_empty());
        assert_eq!(split.train.len(), 4);
    }

    #[test]
    fn test_too_small() {
        assert!(matches!(
            train_test_split(1, 0.25, 42),
            Err(DetectorError::DatasetTooSmall { rows: 1, .. })
        ));
        assert!(train_test_split(0, 0.25, 42).is_err());
    }
}

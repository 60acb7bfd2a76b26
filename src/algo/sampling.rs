//! Seeded sampling for dataset splits and classifier bagging.

/// Random sample of `size` distinct indices from `total`, sorted.
pub fn random_sample(total: usize, size: usize, seed: u64) -> Vec<usize> {
    if size >= total {
        return (0..total).collect();
    }
    let mut indices = shuffled(total, seed);
    indices.truncate(size);
    indices.sort_unstable();
    indices
}

/// All indices `0..total` in a seeded random order (Fisher-Yates).
pub fn shuffled(total: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..total).collect();
    let mut rng = LcgRng::new(seed);
    for i in 0..total.saturating_sub(1) {
        let j = i + (rng.next() as usize % (total - i));
        indices.swap(i, j);
    }
    indices
}

/// Bootstrap sample: `total` indices drawn with replacement.
pub fn bootstrap_sample(total: usize, seed: u64) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }
    let mut rng = LcgRng::new(seed);
    let mut indices: Vec<usize> = (0..total).map(|_| rng.next() as usize % total).collect();
    indices.sort_unstable();
    indices
}

/// Split `0..total` into disjoint train and test index sets.
///
/// `train_ratio` is clamped to `[0, 1]`; both halves are sorted.
pub fn train_test_split(total: usize, train_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let ratio = train_ratio.clamp(0.0, 1.0);
    let train_size = (total as f64 * ratio).round() as usize;
    let train = random_sample(total, train_size, seed);

    let mut in_train = vec![false; total];
    for &i in &train {
        in_train[i] = true;
    }
    let test = (0..total).filter(|&i| !in_train[i]).collect();
    (train, test)
}

/// Simple Linear Congruential Generator for deterministic sampling.
struct LcgRng {
    state: u64,
}

impl LcgRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next(&mut self) -> u64 {
        // LCG constants from Numerical Recipes
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        // low bits of an LCG are weak
        self.state >> 16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_sample_deterministic_without_duplicates() {
        let s = random_sample(100, 50, 123);
        assert_eq!(s, random_sample(100, 50, 123));
        let unique: HashSet<usize> = s.iter().copied().collect();
        assert_eq!(unique.len(), 50);
        assert!(s.iter().all(|&i| i < 100));
    }

    #[test]
    fn random_sample_oversized() {
        assert_eq!(random_sample(5, 10, 42), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn shuffled_is_permutation() {
        let mut s = shuffled(50, 7);
        s.sort_unstable();
        assert_eq!(s, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn bootstrap_has_replacement() {
        let s = bootstrap_sample(100, 42);
        assert_eq!(s.len(), 100);
        assert!(s.iter().all(|&i| i < 100));
        let unique: HashSet<usize> = s.iter().copied().collect();
        // about 63% unique on average
        assert!(unique.len() < 100);
    }

    #[test]
    fn bootstrap_empty() {
        assert!(bootstrap_sample(0, 42).is_empty());
    }

    #[test]
    fn split_is_disjoint_and_complete() {
        let (train, test) = train_test_split(10, 0.7, 42);
        assert_eq!(train.len(), 7);
        assert_eq!(test.len(), 3);
        let all: HashSet<usize> = train.iter().chain(test.iter()).copied().collect();
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn split_ratio_clamped() {
        let (train, test) = train_test_split(4, 1.5, 1);
        assert_eq!(train.len(), 4);
        assert!(test.is_empty());
    }
}

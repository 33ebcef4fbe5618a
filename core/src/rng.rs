//! Deterministic sampling.
//!
//! RULE: Nothing in the core may call a platform RNG.
//! Samples are drawn from a PCG stream seeded from configuration, so the
//! same seed over the same input always yields the same rows.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct SampleRng {
    inner: Pcg64Mcg,
}

impl SampleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Pick up to `k` items without replacement, keeping their input order.
    pub fn sample<'a, T>(&mut self, items: &'a [T], k: usize) -> Vec<&'a T> {
        if k >= items.len() {
            return items.iter().collect();
        }
        // Partial Fisher-Yates over indices.
        let mut indices: Vec<usize> = (0..items.len()).collect();
        for i in 0..k {
            let remaining = (indices.len() - i) as u64;
            let j = i + self.next_u64_below(remaining) as usize;
            indices.swap(i, j);
        }
        let mut picked = indices[..k].to_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| &items[i]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sample() {
        let items: Vec<u32> = (0..100).collect();
        let a = SampleRng::new(1).sample(&items, 10);
        let b = SampleRng::new(1).sample(&items, 10);
        assert_eq!(a, b, "Same seed should produce same sample");
    }

    #[test]
    fn sample_has_no_duplicates_and_keeps_order() {
        let items: Vec<u32> = (0..50).collect();
        let picked = SampleRng::new(99).sample(&items, 20);
        assert_eq!(picked.len(), 20);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn small_input_is_returned_whole() {
        let items = vec!["a", "b"];
        assert_eq!(SampleRng::new(3).sample(&items, 30).len(), 2);
    }
}

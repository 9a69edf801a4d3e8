//! Seeded, reproducible shuffling.
//!
//! ## Algorithm
//!
//! Every element is given a pseudo-random sort key drawn from a
//! [`Mulberry32`] generator, and the slice is stably sorted by key. Keys are
//! memoized per element identity in a [`SortKeys`] table that lives for one
//! shuffle only, so equal elements share a key and the result never depends
//! on how often the sort compares an element.
//!
//! Keys are drawn in input order before sorting starts. Given the same seed
//! and the same input order, the permutation is identical in every process.
//!
//! ```
//! use card_tabletop::shuffle::{seeded_shuffle, Seed};
//!
//! let deck: Vec<u32> = (0..10).collect();
//! let a = seeded_shuffle(&deck, &Seed::from("seed-x"));
//! let b = seeded_shuffle(&deck, &Seed::from("seed-x"));
//! assert_eq!(a, b);
//! ```

mod mulberry;
mod seed;

pub use mulberry::Mulberry32;
pub use seed::Seed;

use std::hash::Hash;

use rand::RngCore;
use rustc_hash::FxHashMap;

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Per-shuffle memo of element sort keys.
///
/// Borrowing the elements ties the memo's lifetime to a single shuffle call.
#[derive(Debug)]
pub struct SortKeys<'a, T> {
    keys: FxHashMap<&'a T, f64>,
}

impl<'a, T: Eq + Hash> SortKeys<'a, T> {
    /// Create an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: FxHashMap::default(),
        }
    }

    /// Key for `item`, drawing a fresh one from `rng` on first sight.
    pub fn key_for<R: RngCore>(&mut self, item: &'a T, rng: &mut R) -> f64 {
        *self
            .keys
            .entry(item)
            .or_insert_with(|| f64::from(rng.next_u32()) / TWO_POW_32)
    }

    /// Key already assigned to `item`, if any.
    #[must_use]
    pub fn get(&self, item: &T) -> Option<f64> {
        self.keys.get(item).copied()
    }

    /// Number of distinct elements seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no keys have been drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<'a, T: Eq + Hash> Default for SortKeys<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shuffle `items` with an explicit generator and memo.
///
/// Returns a new vector; `items` is untouched.
pub fn shuffle_with_keys<'a, T, R>(items: &'a [T], rng: &mut R, keys: &mut SortKeys<'a, T>) -> Vec<T>
where
    T: Clone + Eq + Hash,
    R: RngCore,
{
    let mut keyed: Vec<(f64, &'a T)> = items
        .iter()
        .map(|item| (keys.key_for(item, rng), item))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    keyed.into_iter().map(|(_, item)| item.clone()).collect()
}

/// Reproducibly shuffle `items` for `seed`.
#[must_use]
pub fn seeded_shuffle<T: Clone + Eq + Hash>(items: &[T], seed: &Seed) -> Vec<T> {
    let mut rng = Mulberry32::from_seed_value(seed);
    let mut keys = SortKeys::new();
    shuffle_with_keys(items, &mut rng, &mut keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuffle_is_permutation() {
        let items: Vec<u32> = (0..20).collect();
        let mut shuffled = seeded_shuffle(&items, &Seed::Number(99));

        assert_eq!(shuffled.len(), items.len());
        assert_ne!(shuffled, items);

        shuffled.sort();
        assert_eq!(shuffled, items);
    }

    #[test]
    fn test_same_seed_same_order() {
        let items: Vec<u32> = (0..20).collect();
        assert_eq!(
            seeded_shuffle(&items, &Seed::from("seed-x")),
            seeded_shuffle(&items, &Seed::from("seed-x"))
        );
    }

    #[test]
    fn test_different_seeds_differ() {
        let items: Vec<u32> = (0..20).collect();
        assert_ne!(
            seeded_shuffle(&items, &Seed::Number(1)),
            seeded_shuffle(&items, &Seed::Number(2))
        );
    }

    #[test]
    fn test_empty_and_single() {
        let empty: Vec<u32> = Vec::new();
        assert!(seeded_shuffle(&empty, &Seed::Number(1)).is_empty());
        assert_eq!(seeded_shuffle(&[7u32], &Seed::Number(1)), vec![7]);
    }

    #[test]
    fn test_duplicates_share_key() {
        let items = vec!["a", "b", "a", "c", "a"];
        let mut rng = Mulberry32::new(5);
        let mut keys = SortKeys::new();

        let shuffled = shuffle_with_keys(&items, &mut rng, &mut keys);

        // Three distinct identities, three keys
        assert_eq!(keys.len(), 3);
        // Equal keys sort adjacently
        let first_a = shuffled.iter().position(|s| *s == "a").unwrap();
        assert_eq!(&shuffled[first_a..first_a + 3], &["a", "a", "a"]);
    }

    #[test]
    fn test_memo_scoped_to_call() {
        let items = vec![1u32, 2, 3];
        let mut rng = Mulberry32::new(5);

        let mut keys = SortKeys::new();
        shuffle_with_keys(&items, &mut rng, &mut keys);
        let first = keys.get(&1).unwrap();

        // A fresh memo and generator state draws again
        let mut keys2 = SortKeys::new();
        shuffle_with_keys(&items, &mut rng, &mut keys2);
        assert_ne!(keys2.get(&1).unwrap(), first);
    }
}

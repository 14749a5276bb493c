// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Seeded sampling without replacement.
//!
//! This is *not* a Fisher-Yates shuffle. Each step draws a position in the
//! shrinking pool of remaining indices and removes it, so the draw pattern
//! differs from `rand::seq::SliceRandom::shuffle` and friends.

use crate::prng::SeedRandom;
use crate::seed::Seed;

/// Source of doubles in `[0, 1)`.
pub trait UnitRng {
    fn next_unit(&mut self) -> f64;
}

impl<F> UnitRng for F
where
    F: FnMut() -> f64,
{
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

/// Ordered set of `0..n` supporting removal by position.
///
/// Backed by a Fenwick tree of presence counts.
#[derive(Debug, Clone)]
pub struct IndexPool {
    tree: Vec<usize>,
    top: usize,
    len: usize,
}

impl IndexPool {
    pub fn new(n: usize) -> Self {
        let mut tree = vec![0; n + 1];
        for i in 1..=n {
            tree[i] += 1;
            let p = i + (i & i.wrapping_neg());
            if p <= n {
                tree[p] += tree[i];
            }
        }

        Self {
            tree,
            top: if n == 0 { 0 } else { 1 << n.ilog2() },
            len: n,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove and return the `k`-th remaining index.
    ///
    /// Panics if `k >= self.len()`.
    pub fn remove_nth(&mut self, k: usize) -> usize {
        assert!(k < self.len, "position {k} out of range for pool of {}", self.len);

        let n = self.tree.len() - 1;
        let (mut pos, mut rem, mut step) = (0, k, self.top);
        while step > 0 {
            let next = pos + step;
            if next <= n && self.tree[next] <= rem {
                pos = next;
                rem -= self.tree[next];
            }
            step >>= 1;
        }

        let mut i = pos + 1;
        while i <= n {
            self.tree[i] -= 1;
            i += i & i.wrapping_neg();
        }
        self.len -= 1;

        pos
    }
}

/// Draw a permutation of `0..n`, one generator draw per element.
pub fn sample_permutation<R>(n: usize, random: &mut R) -> Vec<usize>
where
    R: UnitRng + ?Sized,
{
    let mut pool = IndexPool::new(n);
    let mut out = Vec::with_capacity(n);

    while !pool.is_empty() {
        let len = pool.len();
        // Clamp against `draw * len` rounding up to `len`.
        let r = ((random.next_unit() * len as f64) as usize).min(len - 1);
        out.push(pool.remove_nth(r));
    }

    out
}

/// Reorder `items` with a fresh generator seeded from `seed`.
pub fn shuffle_seed<T: Clone>(items: &[T], seed: &Seed) -> Vec<T> {
    let mut random = SeedRandom::new(seed.as_str());
    sample_permutation(items.len(), &mut random)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn permute(n: usize, seed: &str) -> Vec<usize> {
        sample_permutation(n, &mut SeedRandom::new(seed))
    }

    #[test]
    fn reference_permutations() {
        assert_eq!(permute(10, "abc"), [7, 5, 6, 4, 2, 1, 8, 9, 0, 3]);
        assert_eq!(permute(6, "abc"), [4, 3, 2, 1, 0, 5]);
        assert_eq!(permute(4, "abc"), [2, 1, 3, 0]);
        assert_eq!(permute(2, "abc"), [1, 0]);
        assert_eq!(permute(4, "tile"), [3, 1, 0, 2]);
        assert_eq!(permute(5, ""), [1, 2, 4, 0, 3]);
        assert_eq!(
            permute(12, "`526fcgc7d44c62a6bd3d3360a3d29ee"),
            [7, 9, 2, 4, 1, 3, 11, 8, 0, 10, 5, 6],
        );
    }

    #[test]
    fn shuffle_seed_reorders_items() {
        let items = ['a', 'b', 'c', 'd'];
        assert_eq!(shuffle_seed(&items, &Seed::from("abc")), ['c', 'b', 'd', 'a']);
    }

    #[test]
    fn empty_draws_nothing() {
        let mut draws = 0;
        let mut random = || {
            draws += 1;
            0.5
        };
        assert!(sample_permutation(0, &mut random).is_empty());
        assert_eq!(draws, 0);
    }

    #[test]
    fn single_draws_once() {
        let mut draws = 0;
        let mut random = || {
            draws += 1;
            0.99
        };
        assert_eq!(sample_permutation(1, &mut random), [0]);
        assert_eq!(draws, 1);
    }

    #[test]
    fn draw_of_one_is_clamped() {
        let mut random = || 1.0;
        assert_eq!(sample_permutation(3, &mut random), [2, 1, 0]);
    }

    #[test]
    fn pool_removal_order() {
        let mut pool = IndexPool::new(6);
        assert_eq!(pool.remove_nth(2), 2);
        assert_eq!(pool.remove_nth(2), 3);
        assert_eq!(pool.remove_nth(0), 0);
        assert_eq!(pool.remove_nth(2), 5);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.remove_nth(1), 4);
        assert_eq!(pool.remove_nth(0), 1);
        assert!(pool.is_empty());
    }

    proptest! {
        #[test]
        fn pool_matches_vec_remove(
            n in 1usize..200,
            picks in prop::collection::vec(any::<prop::sample::Index>(), 200),
        ) {
            let mut pool = IndexPool::new(n);
            let mut reference: Vec<usize> = (0..n).collect();
            for pick in picks.iter().take(n) {
                let k = pick.index(reference.len());
                prop_assert_eq!(pool.remove_nth(k), reference.remove(k));
            }
        }

        #[test]
        fn is_a_bijection(n in 0usize..300, seed in ".{0,40}") {
            let mut p = permute(n, &seed);
            p.sort_unstable();
            prop_assert_eq!(p, (0..n).collect::<Vec<_>>());
        }

        #[test]
        fn is_deterministic(n in 0usize..100, seed in "[0-9a-f]{32}") {
            prop_assert_eq!(permute(n, &seed), permute(n, &seed));
        }
    }
}

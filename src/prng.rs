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

//! String-seeded ARC4 generator.
//!
//! Output must match the scrambler's generator bit for bit, so every step
//! here (key smearing, the 256-byte drop, the float accumulation) follows
//! it exactly. The float path runs in `f64`; every intermediate value is
//! exactly representable.

use crate::shuffle::UnitRng;

const WIDTH: usize = 256;
const MASK: usize = WIDTH - 1;
/// Bytes drawn for the initial part of each double.
const CHUNKS: usize = 6;
const START_DENOM: f64 = 281_474_976_710_656.0; // 256^6
const SIGNIFICANCE: f64 = 4_503_599_627_370_496.0; // 2^52
const OVERFLOW: f64 = SIGNIFICANCE * 2.0;

/// Mix a seed string into a key of at most 256 bytes.
///
/// Works on UTF-16 code units.
fn mix_key(seed: &str) -> Vec<u8> {
    let mut key: Vec<u8> = Vec::new();
    let mut smear = 0u32;

    for (j, c) in seed.encode_utf16().enumerate() {
        let k = j & MASK;
        smear ^= u32::from(key.get(k).copied().unwrap_or(0)) * 19;
        let v = ((smear + u32::from(c)) & MASK as u32) as u8;
        match key.get_mut(k) {
            Some(slot) => *slot = v,
            None => key.push(v),
        }
    }

    key
}

/// ARC4 keystream.
#[derive(Clone)]
pub struct Arc4 {
    i: u8,
    j: u8,
    s: [u8; WIDTH],
}

impl Arc4 {
    /// Key schedule, then drop the first 256 bytes.
    pub fn new(key: &[u8]) -> Self {
        let key = if key.is_empty() { &[0][..] } else { key };

        let mut s = [0u8; WIDTH];
        for (i, v) in s.iter_mut().enumerate() {
            *v = i as u8;
        }

        let mut j = 0u8;
        for i in 0..WIDTH {
            j = j.wrapping_add(key[i % key.len()]).wrapping_add(s[i]);
            s.swap(i, j as usize);
        }

        let mut ret = Self { i: 0, j: 0, s };
        for _ in 0..WIDTH {
            ret.next_byte();
        }
        ret
    }

    pub fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        let t = self.s[self.i as usize];
        self.j = self.j.wrapping_add(t);
        self.s.swap(self.i as usize, self.j as usize);
        self.s[self.s[self.i as usize].wrapping_add(t) as usize]
    }

    /// Next `count` bytes as a big-endian integer. `count` must be at most 8.
    pub fn take(&mut self, count: usize) -> u64 {
        debug_assert!(count <= 8);
        (0..count).fold(0, |r, _| (r << 8) | u64::from(self.next_byte()))
    }
}

/// Seeded generator of doubles in `[0, 1)` with a full 52-bit mantissa.
#[derive(Clone)]
pub struct SeedRandom {
    arc4: Arc4,
}

impl SeedRandom {
    pub fn new(seed: &str) -> Self {
        Self {
            arc4: Arc4::new(&mix_key(seed)),
        }
    }

    pub fn next_f64(&mut self) -> f64 {
        let mut n = self.arc4.take(CHUNKS) as f64;
        let mut d = START_DENOM;
        let mut x = 0u32;

        while n < SIGNIFICANCE {
            n = (n + f64::from(x)) * WIDTH as f64;
            d *= WIDTH as f64;
            x = self.arc4.next_byte().into();
        }
        while n >= OVERFLOW {
            n /= 2.0;
            d /= 2.0;
            x >>= 1;
        }

        (n + f64::from(x)) / d
    }
}

impl UnitRng for SeedRandom {
    fn next_unit(&mut self) -> f64 {
        self.next_f64()
    }
}

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

//! Byte transform applied as the last step of seed derivation.
//!
//! The transform is treated as an injected dependency: anything implementing
//! [`SeedTransform`] can be handed to [`derive_seed`](crate::seed::derive_seed).
//! [`host_transform`] returns the process-wide default, which reproduces the
//! routine the content host ships with its reader.

use once_cell::sync::Lazy;

use crate::error::TransformError;

/// Length-preserving, deterministic byte transform.
pub trait SeedTransform: Send + Sync {
    fn transform(&self, input: &[u8]) -> Result<Vec<u8>, TransformError>;
}

impl<F> SeedTransform for F
where
    F: Fn(&[u8]) -> Vec<u8> + Send + Sync,
{
    fn transform(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(self(input))
    }
}

/// Bit `i` set means byte `i` has its low bit flipped.
const FLIP_MASK: u32 = 0x0031_62c7;
/// Only the first 22 bytes are ever touched.
const FLIP_WINDOW: usize = 22;

/// Default transform, as observed from the host's embedded module.
#[derive(Debug)]
pub struct HostTransform {
    flip: [bool; FLIP_WINDOW],
}

impl HostTransform {
    fn new() -> Self {
        let mut flip = [false; FLIP_WINDOW];
        for (i, f) in flip.iter_mut().enumerate() {
            *f = FLIP_MASK & (1 << i) != 0;
        }
        log::debug!(
            "host seed transform ready ({} of {} leading bytes flipped)",
            flip.iter().filter(|&&f| f).count(),
            FLIP_WINDOW,
        );

        Self { flip }
    }
}

impl SeedTransform for HostTransform {
    fn transform(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut out = input.to_vec();
        for (b, &f) in out.iter_mut().zip(&self.flip) {
            if f {
                *b ^= 1;
            }
        }
        Ok(out)
    }
}

static HOST_TRANSFORM: Lazy<HostTransform> = Lazy::new(HostTransform::new);

/// Shared default transform. Initialised once, on first use, from any thread.
pub fn host_transform() -> &'static HostTransform {
    &HOST_TRANSFORM
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(s: &str) -> String {
        let out = host_transform().transform(s.as_bytes()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn matches_host_output() {
        assert_eq!(
            apply("0123456789abcdefghijklmnopqrstuvwxyz"),
            "1033457688abcedffhijjmmnopqrstuvwxyz",
        );
        assert_eq!(
            apply("a436fcfb7e44c73a7bd3e2360a3d29ee"),
            "`526fcgc7d44c62a6bd3d3360a3d29ee",
        );
    }

    #[test]
    fn preserves_length() {
        for n in [0, 1, 21, 22, 23, 64] {
            let input = vec![b'x'; n];
            assert_eq!(host_transform().transform(&input).unwrap().len(), n);
        }
    }

    #[test]
    fn is_an_involution() {
        let input = b"3a7bd3e2360a3d29eea436fcfb7e44c7";
        let once = host_transform().transform(input).unwrap();
        let twice = host_transform().transform(&once).unwrap();
        assert_eq!(&twice[..], &input[..]);
    }

    #[test]
    fn same_instance_everywhere() {
        let a = std::thread::spawn(|| host_transform() as *const HostTransform as usize)
            .join()
            .unwrap();
        assert_eq!(a, host_transform() as *const HostTransform as usize);
    }

    #[test]
    fn closures_are_transforms() {
        let upper = |b: &[u8]| b.to_ascii_uppercase();
        assert_eq!(upper.transform(b"abc").unwrap(), b"ABC");
    }
}

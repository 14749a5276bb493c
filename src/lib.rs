//! Library to undo a seeded tile shuffle on images.
//!
//! The content host cuts each image into fixed-size tiles and shuffles
//! the tiles within groups of equal size. This library rebuilds the
//! original from:
//!
//! * The scrambled raster.
//! * The image locator, from which the seed is derived ([`derive_seed`]).
//!
//! The shuffle is reproduced exactly, so the result is pixel-identical
//! to the original. See [`descramble_tile`] for the whole pipeline on a
//! decoded image, or [`reconstruct::descramble`] for any ndarray.

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
//

pub mod error;
pub mod geometry;
pub mod page;
pub mod prng;
pub mod raster;
pub mod reconstruct;
pub mod seed;
pub mod shuffle;
pub mod transform;

#[doc(inline)]
pub use crate::error::{Error, Result, TransformError};
#[doc(inline)]
pub use crate::raster::RasterImage;
#[doc(inline)]
pub use crate::seed::{derive_seed, Seed};
#[doc(inline)]
pub use crate::transform::{host_transform, SeedTransform};

/// Slice size used by the content host.
pub const DEFAULT_SLICE_SIZE: usize = 50;

/// Rebuild a scrambled image.
///
/// Consumes the scrambled raster and returns the reconstructed one, with
/// the same size and colour type.
pub fn descramble_tile(source: RasterImage, slice_size: usize, seed: &Seed) -> Result<RasterImage> {
    let pixels = reconstruct::descramble(source.pixels(), slice_size, seed)?;
    Ok(source.with_pixels(pixels))
}

/// Scramble an image the way the content host does. Inverse of
/// [`descramble_tile`].
pub fn scramble_tile(source: RasterImage, slice_size: usize, seed: &Seed) -> Result<RasterImage> {
    let pixels = reconstruct::scramble(source.pixels(), slice_size, seed)?;
    Ok(source.with_pixels(pixels))
}

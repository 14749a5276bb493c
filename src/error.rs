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

//! Error types.
//!
//! All failures are per-image. Nothing here is retried: every operation
//! is pure, so the same inputs fail the same way.

use thiserror::Error;

/// Errors produced while deriving a seed or rebuilding an image.
#[derive(Debug, Error)]
pub enum Error {
    /// Locator has no `expires` query parameter.
    #[error("locator has no `expires` parameter: {0}")]
    MissingExpiry(String),

    /// Locator is not a URL, even after resolving against `https:`.
    #[error("locator is not a valid URL: {0}")]
    InvalidLocator(String),

    /// Locator has no usable checksum path segment.
    #[error("locator has no checksum segment: {0}")]
    MissingChecksum(String),

    /// The seed transform failed.
    #[error("seed transform failed: {0}")]
    Transform(#[from] TransformError),

    /// A tile rectangle fell outside the raster. Indicates a geometry bug.
    #[error("tile geometry error: {0}")]
    Geometry(String),

    /// Permutation length does not match its group.
    #[error("group {group} has {expected} tiles but its permutation has {actual}")]
    GroupSizeMismatch {
        group: usize,
        expected: usize,
        actual: usize,
    },

    /// Slice size of zero.
    #[error("slice size must be non-zero")]
    InvalidSliceSize,

    /// Page metadata could not be parsed.
    #[error("invalid page metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// Page script has no metadata object.
    #[error("page script has no `_pdata_` object")]
    MissingMetadata,

    /// Pixel buffer length does not match the declared dimensions.
    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Errors from a [`SeedTransform`](crate::transform::SeedTransform).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("transform is unavailable")]
    Unavailable,

    #[error("transform returned {actual} bytes for {expected} bytes of input")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("transform output is not valid UTF-8")]
    InvalidUtf8,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

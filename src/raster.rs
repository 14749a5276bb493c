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

//! Decoded raster bitmap.

use image::{ColorType, DynamicImage, ImageBuffer};
use ndarray::prelude::*;

use crate::error::{Error, Result};

/// Pixel bytes of shape `(height, width, bytes_per_pixel)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    color: ColorType,
    pixels: Array3<u8>,
}

impl RasterImage {
    /// Wrap row-major pixel bytes.
    pub fn from_raw(width: u32, height: u32, color: ColorType, bytes: Vec<u8>) -> Result<Self> {
        let shape = (
            height as usize,
            width as usize,
            color.bytes_per_pixel() as usize,
        );
        let expected = shape.0 * shape.1 * shape.2;
        let actual = bytes.len();

        let pixels = Array3::from_shape_vec(shape, bytes)
            .map_err(|_| Error::BufferSize { expected, actual })?;
        Ok(Self { color, pixels })
    }

    pub fn from_dynamic(im: DynamicImage) -> Result<Self> {
        let (width, height, color) = (im.width(), im.height(), im.color());
        Self::from_raw(width, height, color, im.into_bytes())
    }

    pub(crate) fn with_pixels(&self, pixels: Array3<u8>) -> Self {
        Self {
            color: self.color,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.len_of(Axis(1)) as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.len_of(Axis(0)) as u32
    }

    pub fn color(&self) -> ColorType {
        self.color
    }

    pub fn pixels(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    /// Row-major bytes, if the buffer is in standard layout.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.pixels.as_slice()
    }

    /// Convert back into an [`image`] buffer. `None` for colour types
    /// `image` cannot hold in a [`DynamicImage`].
    pub fn into_dynamic(self) -> Option<DynamicImage> {
        let (w, h) = (self.width(), self.height());
        let bytes = self.pixels.as_standard_layout().into_owned().into_raw_vec();

        fn u16s(b: Vec<u8>) -> Vec<u16> {
            b.chunks_exact(2).map(|c| u16::from_ne_bytes([c[0], c[1]])).collect()
        }
        fn f32s(b: Vec<u8>) -> Vec<f32> {
            b.chunks_exact(4)
                .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect()
        }

        Some(match self.color {
            ColorType::L8 => DynamicImage::ImageLuma8(ImageBuffer::from_raw(w, h, bytes)?),
            ColorType::La8 => DynamicImage::ImageLumaA8(ImageBuffer::from_raw(w, h, bytes)?),
            ColorType::Rgb8 => DynamicImage::ImageRgb8(ImageBuffer::from_raw(w, h, bytes)?),
            ColorType::Rgba8 => DynamicImage::ImageRgba8(ImageBuffer::from_raw(w, h, bytes)?),
            ColorType::L16 => DynamicImage::ImageLuma16(ImageBuffer::from_raw(w, h, u16s(bytes))?),
            ColorType::La16 => DynamicImage::ImageLumaA16(ImageBuffer::from_raw(w, h, u16s(bytes))?),
            ColorType::Rgb16 => DynamicImage::ImageRgb16(ImageBuffer::from_raw(w, h, u16s(bytes))?),
            ColorType::Rgba16 => DynamicImage::ImageRgba16(ImageBuffer::from_raw(w, h, u16s(bytes))?),
            ColorType::Rgb32F => DynamicImage::ImageRgb32F(ImageBuffer::from_raw(w, h, f32s(bytes))?),
            ColorType::Rgba32F => DynamicImage::ImageRgba32F(ImageBuffer::from_raw(w, h, f32s(bytes))?),
            _ => return None,
        })
    }
}

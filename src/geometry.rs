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

//! Tile layout of an image.
//!
//! An image is cut into `slice_size` square tiles in row-major order. Tiles
//! in the last column/row are truncated to fit. Tiles with the same size form
//! a group, and groups are permuted independently. With a single slice size
//! there are at most four groups: interior, right edge, bottom edge, corner.

use crate::error::{Error, Result};

/// One tile, in destination coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Position within its group.
    pub index: usize,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Rectangular block of same-sized tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGroup {
    pub width: usize,
    pub height: usize,
    /// Origin of the first tile.
    pub x: usize,
    pub y: usize,
    pub cols: usize,
    pub rows: usize,
    pub tiles: Vec<Tile>,
}

impl TileGroup {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: 0,
            cols: 0,
            rows: 0,
            tiles: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Origin of grid cell `s` of this group, counted row-major.
    pub fn cell_origin(&self, s: usize) -> (usize, usize) {
        let row = s / self.cols;
        let col = s - row * self.cols;
        (self.x + col * self.width, self.y + row * self.height)
    }

    /// Fill in origin and block shape once all tiles are collected.
    fn close(&mut self) -> Result<()> {
        let first = self.tiles[0];
        self.x = first.x;
        self.y = first.y;
        self.cols = match self.tiles.iter().position(|t| t.y != first.y) {
            Some(n) => n,
            None => self.tiles.len(),
        };

        if self.tiles.len() % self.cols != 0 {
            return Err(Error::Geometry(format!(
                "{} tiles of {}x{} do not form a block of {} columns",
                self.tiles.len(),
                self.width,
                self.height,
                self.cols,
            )));
        }
        self.rows = self.tiles.len() / self.cols;

        Ok(())
    }
}

/// All tile groups of a `width` x `height` image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    slice_size: usize,
    groups: Vec<TileGroup>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize, slice_size: usize) -> Result<Self> {
        if slice_size == 0 {
            return Err(Error::InvalidSliceSize);
        }

        let cols = width.div_ceil(slice_size);
        let rows = height.div_ceil(slice_size);

        let mut groups: Vec<TileGroup> = Vec::new();
        for i in 0..cols * rows {
            let (row, col) = (i / cols, i % cols);
            let (x, y) = (col * slice_size, row * slice_size);
            let w = slice_size.min(width - x);
            let h = slice_size.min(height - y);

            let g = match groups.iter().position(|g| g.width == w && g.height == h) {
                Some(g) => g,
                None => {
                    groups.push(TileGroup::new(w, h));
                    groups.len() - 1
                }
            };
            let group = &mut groups[g];
            group.tiles.push(Tile {
                index: group.tiles.len(),
                x,
                y,
                width: w,
                height: h,
            });
        }

        for g in &mut groups {
            g.close()?;
        }

        log::debug!(
            "{width}x{height} at slice {slice_size}: {} tiles in {} groups",
            cols * rows,
            groups.len(),
        );

        Ok(Self {
            width,
            height,
            slice_size,
            groups,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn slice_size(&self) -> usize {
        self.slice_size
    }

    pub fn groups(&self) -> &[TileGroup] {
        &self.groups
    }

    pub fn tile_count(&self) -> usize {
        self.groups.iter().map(TileGroup::len).sum()
    }

    /// Tiles of all groups, in row-major order.
    pub fn tiles(&self) -> Vec<Tile> {
        let mut tiles: Vec<_> = self.groups.iter().flat_map(|g| g.tiles.iter().copied()).collect();
        tiles.sort_unstable_by_key(|t| (t.y, t.x));
        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(g: &TileGroup) -> (usize, usize, usize, usize, usize, usize) {
        (g.width, g.height, g.x, g.y, g.cols, g.rows)
    }

    #[test]
    fn edge_groups() {
        let grid = TileGrid::new(105, 105, 50).unwrap();
        assert_eq!(grid.tile_count(), 9);

        let groups: Vec<_> = grid.groups().iter().map(shape).collect();
        assert_eq!(
            groups,
            [
                (50, 50, 0, 0, 2, 2),
                (5, 50, 100, 0, 1, 2),
                (50, 5, 0, 100, 2, 1),
                (5, 5, 100, 100, 1, 1),
            ],
        );
        assert_eq!(grid.groups()[0].len(), 4);
        assert_eq!(grid.groups()[1].len(), 2);
        assert_eq!(grid.groups()[2].len(), 2);
        assert_eq!(grid.groups()[3].len(), 1);
    }

    #[test]
    fn exact_multiple_is_one_group() {
        let grid = TileGrid::new(200, 150, 50).unwrap();
        assert_eq!(grid.groups().len(), 1);
        assert_eq!(shape(&grid.groups()[0]), (50, 50, 0, 0, 4, 3));
    }

    #[test]
    fn single_pixel() {
        let grid = TileGrid::new(1, 1, 50).unwrap();
        assert_eq!(grid.groups().len(), 1);
        assert_eq!(shape(&grid.groups()[0]), (1, 1, 0, 0, 1, 1));
    }

    #[test]
    fn only_right_edge() {
        let grid = TileGrid::new(120, 100, 50).unwrap();
        let groups: Vec<_> = grid.groups().iter().map(shape).collect();
        assert_eq!(groups, [(50, 50, 0, 0, 2, 2), (20, 50, 100, 0, 1, 2)]);
    }

    #[test]
    fn single_row_of_tiles() {
        let grid = TileGrid::new(230, 30, 50).unwrap();
        let groups: Vec<_> = grid.groups().iter().map(shape).collect();
        assert_eq!(groups, [(50, 30, 0, 0, 4, 1), (30, 30, 200, 0, 1, 1)]);
    }

    #[test]
    fn empty_image() {
        let grid = TileGrid::new(0, 10, 50).unwrap();
        assert!(grid.groups().is_empty());
        assert_eq!(grid.tile_count(), 0);
    }

    #[test]
    fn zero_slice_size() {
        assert!(matches!(TileGrid::new(10, 10, 0), Err(Error::InvalidSliceSize)));
    }

    #[test]
    fn group_local_indices() {
        let grid = TileGrid::new(105, 105, 50).unwrap();
        for g in grid.groups() {
            for (i, t) in g.tiles.iter().enumerate() {
                assert_eq!(t.index, i);
                assert_eq!((t.width, t.height), (g.width, g.height));
                assert_eq!(g.cell_origin(i), (t.x, t.y));
            }
        }
    }

    #[test]
    fn tiles_cover_every_pixel_once() {
        for (w, h, s) in [(105, 105, 50), (1, 1, 50), (37, 263, 16), (64, 64, 8), (7, 5, 3)] {
            let grid = TileGrid::new(w, h, s).unwrap();
            let mut hits = vec![0u8; w * h];
            for t in grid.tiles() {
                for y in t.y..t.y + t.height {
                    for x in t.x..t.x + t.width {
                        hits[y * w + x] += 1;
                    }
                }
            }
            assert!(hits.iter().all(|&c| c == 1), "{w}x{h} at {s}");
            assert_eq!(grid.tile_count(), w.div_ceil(s) * h.div_ceil(s));
            assert!(grid.groups().len() <= 4);
        }
    }
}

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

use ndarray::parallel::prelude::*;
use ndarray::prelude::*;
use ndarray::Slice;

use crate::error::{Error, Result};
use crate::geometry::TileGrid;
use crate::prng::SeedRandom;
use crate::seed::Seed;
use crate::shuffle::sample_permutation;

/// Copy of one tile-sized rectangle. Coordinates are `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMove {
    pub from: (usize, usize),
    pub to: (usize, usize),
    pub width: usize,
    pub height: usize,
}

impl TileMove {
    fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            ..self
        }
    }
}

/// One permutation per group.
///
/// Every group gets a fresh generator seeded with the same `seed`, so the
/// groups are independent and computed in parallel.
pub fn permutations(grid: &TileGrid, seed: &Seed) -> Vec<Vec<usize>> {
    grid.groups()
        .par_iter()
        .enumerate()
        .map(|(gi, g)| {
            log::debug!(
                "group {gi}: {} tiles of {}x{} ({}x{} block)",
                g.len(),
                g.width,
                g.height,
                g.cols,
                g.rows,
            );
            let mut random = SeedRandom::new(seed.as_str());
            sample_permutation(g.len(), &mut random)
        })
        .collect()
}

/// Turn per-group permutations into the tile copies that undo the scramble.
///
/// Slot `i` of a group receives the content of the group's grid cell
/// `perm[i]` in the scrambled image.
pub fn plan(grid: &TileGrid, perms: &[Vec<usize>]) -> Result<Vec<TileMove>> {
    let groups = grid.groups();
    if perms.len() > groups.len() {
        return Err(Error::GroupSizeMismatch {
            group: groups.len(),
            expected: 0,
            actual: perms[groups.len()].len(),
        });
    }

    let mut moves = Vec::with_capacity(grid.tile_count());
    for (gi, g) in groups.iter().enumerate() {
        let perm = perms.get(gi).map_or(&[][..], Vec::as_slice);
        if perm.len() != g.len() {
            return Err(Error::GroupSizeMismatch {
                group: gi,
                expected: g.len(),
                actual: perm.len(),
            });
        }

        let mut seen = vec![false; g.len()];
        for (tile, &s) in g.tiles.iter().zip(perm) {
            match seen.get_mut(s) {
                Some(v) if !*v => *v = true,
                _ => {
                    return Err(Error::Geometry(format!(
                        "group {gi}: cell {s} is out of range or repeated"
                    )))
                }
            }

            let m = TileMove {
                from: g.cell_origin(s),
                to: (tile.x, tile.y),
                width: tile.width,
                height: tile.height,
            };
            check_bounds(grid, m.from, &m)?;
            check_bounds(grid, m.to, &m)?;
            moves.push(m);
        }
    }

    Ok(moves)
}

fn check_bounds(grid: &TileGrid, (x, y): (usize, usize), m: &TileMove) -> Result<()> {
    if x + m.width > grid.width() || y + m.height > grid.height() {
        return Err(Error::Geometry(format!(
            "{}x{} tile at ({x}, {y}) exceeds {}x{} raster",
            m.width,
            m.height,
            grid.width(),
            grid.height(),
        )));
    }
    Ok(())
}

fn grid_of<A, D: Dimension>(arr: &ArrayView<'_, A, D>, slice_size: usize) -> Result<TileGrid> {
    if arr.ndim() < 2 {
        return Err(Error::Geometry(format!(
            "raster needs at least 2 axes, got {}",
            arr.ndim()
        )));
    }
    TileGrid::new(arr.len_of(Axis(1)), arr.len_of(Axis(0)), slice_size)
}

fn tile_view<'a, A, D: Dimension>(
    mut arr: ArrayView<'a, A, D>,
    (x, y): (usize, usize),
    width: usize,
    height: usize,
) -> ArrayView<'a, A, D> {
    arr.slice_axis_inplace(Axis(0), Slice::from(y..y + height));
    arr.slice_axis_inplace(Axis(1), Slice::from(x..x + width));
    arr
}

/// Apply moves from `arr` into a copy of it.
///
/// Destination tiles never overlap, so the output is split into bands of
/// one tile row and each band is filled on its own thread.
fn apply_moves<A, D>(arr: ArrayView<'_, A, D>, moves: &[TileMove], slice_size: usize) -> Array<A, D>
where
    A: Clone + Send + Sync,
    D: Dimension,
{
    let mut bands = vec![Vec::new(); arr.len_of(Axis(0)).div_ceil(slice_size)];
    for m in moves {
        bands[m.to.1 / slice_size].push(*m);
    }

    let mut out = arr.to_owned();
    out.axis_chunks_iter_mut(Axis(0), slice_size)
        .into_par_iter()
        .zip(bands.par_iter().enumerate())
        .for_each(|(mut band, (b, moves))| {
            for m in moves {
                let src = tile_view(arr.view(), m.from, m.width, m.height);

                let y = m.to.1 - b * slice_size;
                let mut dst = band.view_mut();
                dst.slice_axis_inplace(Axis(0), Slice::from(y..y + m.height));
                dst.slice_axis_inplace(Axis(1), Slice::from(m.to.0..m.to.0 + m.width));
                dst.assign(&src);
            }
        });

    out
}

/// Rebuild a scrambled array.
///
/// Only the first two axes (rows, columns) are rearranged; any further axes
/// (channels) move along with their pixel.
pub fn descramble<A, D>(arr: ArrayView<'_, A, D>, slice_size: usize, seed: &Seed) -> Result<Array<A, D>>
where
    A: Clone + Send + Sync,
    D: Dimension,
{
    let grid = grid_of(&arr, slice_size)?;
    let moves = plan(&grid, &permutations(&grid, seed))?;
    Ok(apply_moves(arr, &moves, slice_size))
}

/// Scramble an array the way the content host does. Inverse of [`descramble`].
pub fn scramble<A, D>(arr: ArrayView<'_, A, D>, slice_size: usize, seed: &Seed) -> Result<Array<A, D>>
where
    A: Clone + Send + Sync,
    D: Dimension,
{
    let grid = grid_of(&arr, slice_size)?;
    let moves: Vec<_> = plan(&grid, &permutations(&grid, seed))?
        .into_iter()
        .map(TileMove::reversed)
        .collect();
    Ok(apply_moves(arr, &moves, slice_size))
}

//! Dense row-major 2D storage.
//!
//! `Grid<Color>` is the pixel buffer and `Grid<Vec2>` is the vector field; both
//! share indexing, bounds policy and row partitioning from here.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Width and height of a grid, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    #[inline]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Square dimensions
    #[inline]
    pub const fn splat(side: usize) -> Self {
        Self::new(side, side)
    }

    #[inline]
    pub const fn area(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Row-major flat index; no bounds check
    #[inline]
    pub const fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Inverse of [`index`](Self::index)
    #[inline]
    pub const fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }
}

/// Dense 2D array of `T`
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    dims: Dimensions,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Grid filled with `value`. Zero-sized grids are rejected.
    pub fn new(dims: Dimensions, value: T) -> Result<Self> {
        if dims.width == 0 || dims.height == 0 {
            return Err(Error::InvalidDimensions {
                width: dims.width,
                height: dims.height,
            });
        }
        Ok(Self {
            dims,
            data: vec![value; dims.area()],
        })
    }

    /// Overwrite every cell
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Nearest-index lookup that falls back to `default` outside the grid
    #[inline]
    pub fn at_or(&self, x: usize, y: usize, default: T) -> T {
        self.get(x, y).cloned().unwrap_or(default)
    }
}

impl<T> Grid<T> {
    /// Grid whose cell `(x, y)` is `f(x, y)`
    pub fn from_fn(dims: Dimensions, mut f: impl FnMut(usize, usize) -> T) -> Result<Self> {
        if dims.width == 0 || dims.height == 0 {
            return Err(Error::InvalidDimensions {
                width: dims.width,
                height: dims.height,
            });
        }
        let mut data = Vec::with_capacity(dims.area());
        for y in 0..dims.height {
            for x in 0..dims.width {
                data.push(f(x, y));
            }
        }
        Ok(Self { dims, data })
    }

    /// Wrap existing row-major data; `data.len()` must equal `dims.area()`
    pub fn from_vec(dims: Dimensions, data: Vec<T>) -> Result<Self> {
        if dims.width == 0 || dims.height == 0 {
            return Err(Error::InvalidDimensions {
                width: dims.width,
                height: dims.height,
            });
        }
        if data.len() != dims.area() {
            return Err(Error::CellCount {
                expected: dims.area(),
                actual: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    #[inline]
    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dims.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dims.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cell at `(x, y)`. The caller keeps coordinates in range; out of range panics.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> &T {
        debug_assert!(
            self.dims.contains(x, y),
            "grid access ({}, {}) outside {}x{}",
            x,
            y,
            self.dims.width,
            self.dims.height
        );
        &self.data[self.dims.index(x, y)]
    }

    /// Mutable cell at `(x, y)`, same contract as [`at`](Self::at)
    #[inline]
    pub fn at_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(
            self.dims.contains(x, y),
            "grid access ({}, {}) outside {}x{}",
            x,
            y,
            self.dims.width,
            self.dims.height
        );
        let idx = self.dims.index(x, y);
        &mut self.data[idx]
    }

    /// Bounds-checked access
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if self.dims.contains(x, y) {
            Some(&self.data[self.dims.index(x, y)])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if self.dims.contains(x, y) {
            let idx = self.dims.index(x, y);
            Some(&mut self.data[idx])
        } else {
            None
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// One row as a slice
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.dims.width;
        &self.data[start..start + self.dims.width]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Cells paired with their `(x, y)` coordinates
    pub fn enumerate_2d(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let dims = self.dims;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (dims.coords(i), v))
    }

    pub fn enumerate_2d_mut(&mut self) -> impl Iterator<Item = ((usize, usize), &mut T)> {
        let dims = self.dims;
        self.data
            .iter_mut()
            .enumerate()
            .map(move |(i, v)| (dims.coords(i), v))
    }

    /// Split the grid into at most `count` disjoint bands of whole rows.
    ///
    /// Rows are divided as evenly as possible; the first `height % count`
    /// bands get one extra row. Each band borrows its rows exclusively.
    pub fn row_bands_mut(&mut self, count: usize) -> Vec<RowBand<'_, T>> {
        let width = self.dims.width;
        let height = self.dims.height;
        let count = count.clamp(1, height.max(1));
        let base = height / count;
        let extra = height % count;

        let mut bands = Vec::with_capacity(count);
        let mut rest: &mut [T] = &mut self.data;
        let mut y_start = 0;
        for i in 0..count {
            let rows = base + usize::from(i < extra);
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(rows * width);
            bands.push(RowBand {
                y_start,
                width,
                cells: head,
            });
            rest = tail;
            y_start += rows;
        }
        bands
    }
}

impl<T> std::ops::Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        self.at(x, y)
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        self.at_mut(x, y)
    }
}

/// Exclusive view of rows `[y_start, y_start + rows)` of a grid
#[derive(Debug)]
pub struct RowBand<'a, T> {
    y_start: usize,
    width: usize,
    cells: &'a mut [T],
}

impl<'a, T> RowBand<'a, T> {
    /// First row (in grid coordinates) covered by this band
    #[inline]
    pub fn y_start(&self) -> usize {
        self.y_start
    }

    /// One past the last row covered
    #[inline]
    pub fn y_end(&self) -> usize {
        self.y_start + self.rows()
    }

    #[inline]
    pub fn rows(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.cells.len() / self.width
        }
    }

    /// Mutable row by grid `y`; must lie inside the band
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = (y - self.y_start) * self.width;
        &mut self.cells[start..start + self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    #[test]
    fn index_is_row_major() {
        let grid = Grid::from_fn(Dimensions::new(4, 3), |x, y| (x, y)).unwrap();
        assert_eq!(grid.as_slice()[6], (2, 1));
        assert_eq!(grid[(3, 2)], (3, 2));
        assert_eq!(grid.dims().coords(6), (2, 1));
        assert_eq!(grid.row(2), &[(0, 2), (1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn zero_sized_grids_are_rejected() {
        assert!(matches!(
            Grid::new(Dimensions::new(0, 5), 0u8),
            Err(Error::InvalidDimensions { width: 0, height: 5 })
        ));
        let short = Grid::from_vec(Dimensions::new(2, 2), vec![Vec2::ZERO; 3]);
        assert!(matches!(
            short,
            Err(Error::CellCount {
                expected: 4,
                actual: 3
            })
        ));
        assert_eq!(
            short.unwrap_err().to_string(),
            "grid data has 3 cells, expected 4"
        );
    }

    #[test]
    fn at_or_falls_back_outside() {
        let grid = Grid::new(Dimensions::new(2, 2), 7).unwrap();
        assert_eq!(grid.at_or(1, 1, 0), 7);
        assert_eq!(grid.at_or(2, 0, 0), 0);
        assert_eq!(grid.at_or(0, usize::MAX, -1), -1);
        assert!(grid.get(5, 5).is_none());
    }

    #[test]
    fn row_bands_cover_every_row_once() {
        let mut grid = Grid::new(Dimensions::new(3, 10), 0u32).unwrap();
        let bands = grid.row_bands_mut(4);
        let ranges: Vec<_> = bands.iter().map(|b| (b.y_start(), b.y_end())).collect();
        assert_eq!(ranges, [(0, 3), (3, 6), (6, 8), (8, 10)]);
    }

    #[test]
    fn more_bands_than_rows_collapses_to_rows() {
        let mut grid = Grid::new(Dimensions::new(2, 3), 0u32).unwrap();
        let mut bands = grid.row_bands_mut(16);
        assert_eq!(bands.len(), 3);
        for band in &mut bands {
            let y = band.y_start();
            band.row_mut(y).fill(y as u32 + 1);
        }
        drop(bands);
        assert_eq!(grid.as_slice(), &[1, 1, 2, 2, 3, 3]);
    }
}

use crate::error::{Result, UlamError};

/// Row-major flat square grid. No per-cell objects.
/// Coordinates are `(row, col)`, both zero-based, row 0 at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub size: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![T::default(); size * size],
            size,
        }
    }

    /// Build from nested rows; fails unless every row has `rows.len()` cells.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for row in rows {
            if row.len() != size {
                return Err(UlamError::NonSquare {
                    rows: size,
                    cols: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self { data, size })
    }

    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.size && col < self.size);
        row * self.size + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.idx(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, v: T) {
        let i = self.idx(row, col);
        self.data[i] = v;
    }

    /// Set the cell if `(row, col)` lies inside the grid. Returns whether it did.
    #[inline]
    pub fn set_if_inside(&mut self, row: i64, col: i64, v: T) -> bool {
        match self.inside(row, col) {
            Some((r, c)) => {
                self.set(r, c, v);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn inside(&self, row: i64, col: i64) -> Option<(usize, usize)> {
        inside(self.size, row, col)
    }

    pub fn cells(&self) -> usize {
        self.data.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks(self.size.max(1))
    }
}

impl Grid<bool> {
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Map signed coordinates to grid coordinates when they fall inside a `size`x`size` grid.
#[inline]
pub fn inside(size: usize, row: i64, col: i64) -> Option<(usize, usize)> {
    if row < 0 || col < 0 || row >= size as i64 || col >= size as i64 {
        return None;
    }
    Some((row as usize, col as usize))
}

//! Spiral indexing: which integer the walk places on which cell.
//!
//! The walk starts at the center `(size/2, size/2)` and runs legs of
//! `up 1, left 1, down 2, right 2, up 3, left 3, ...`, turning counter-clockwise
//! as displayed with row 0 at the top. With this leg order the first `size²`
//! steps tile the grid exactly for odd and even sizes alike.

use crate::error::{Result, UlamError};
use crate::grid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Heading {
    Up,
    Left,
    Down,
    Right,
}

impl Heading {
    #[inline]
    fn delta(self) -> (i64, i64) {
        match self {
            Heading::Up => (-1, 0),
            Heading::Left => (0, -1),
            Heading::Down => (1, 0),
            Heading::Right => (0, 1),
        }
    }

    #[inline]
    fn turn(self) -> Self {
        match self {
            Heading::Up => Heading::Left,
            Heading::Left => Heading::Down,
            Heading::Down => Heading::Right,
            Heading::Right => Heading::Up,
        }
    }
}

/// One step of the walk. Coordinates are signed because an off-center start
/// can carry the walk past the grid edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiralCell {
    pub step: u64,
    pub value: u64,
    pub row: i64,
    pub col: i64,
}

/// Spiral layout over a `size`x`size` grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spiral {
    size: usize,
    offset: u64,
    start: (usize, usize),
}

impl Spiral {
    pub fn centered(size: usize, offset: u64) -> Self {
        Self {
            size,
            offset,
            start: (size / 2, size / 2),
        }
    }

    /// Move the start cell. It must lie inside the grid.
    pub fn with_start(self, row: usize, col: usize) -> Result<Self> {
        if row >= self.size || col >= self.size {
            return Err(UlamError::StartOutside {
                row,
                col,
                size: self.size,
            });
        }
        Ok(Self {
            start: (row, col),
            ..self
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn start(&self) -> (usize, usize) {
        self.start
    }

    pub fn capacity(&self) -> u64 {
        (self.size as u64).saturating_mul(self.size as u64)
    }

    /// Walk the first `steps` cells. More steps than the grid holds is an error.
    pub fn walk(&self, steps: u64) -> Result<SpiralWalk> {
        let capacity = self.capacity();
        if steps > capacity {
            return Err(UlamError::OutOfBounds {
                requested: steps,
                capacity,
            });
        }
        if steps > 0 && self.offset.checked_add(steps - 1).is_none() {
            return Err(UlamError::invalid(
                "offset",
                format!("offset {} + {} steps overflows u64", self.offset, steps),
            ));
        }
        Ok(SpiralWalk {
            row: self.start.0 as i64,
            col: self.start.1 as i64,
            step: 0,
            value: self.offset,
            remaining: steps,
            heading: Heading::Up,
            leg_len: 1,
            leg_left: 1,
            legs_at_len: 0,
        })
    }

    /// Walk every cell of the grid.
    pub fn full_walk(&self) -> Result<SpiralWalk> {
        self.walk(self.capacity())
    }

    /// Grid cell holding `value`, if the walk of `capacity()` steps reaches it inside the grid.
    pub fn coord_of(&self, value: u64) -> Option<(usize, usize)> {
        let k = value.checked_sub(self.offset)?;
        if k >= self.capacity() {
            return None;
        }
        let (dr, dc) = step_offset(k);
        grid::inside(
            self.size,
            self.start.0 as i64 + dr,
            self.start.1 as i64 + dc,
        )
    }

    /// Value the walk places at `(row, col)`, if it gets there within `capacity()` steps.
    pub fn value_at(&self, row: usize, col: usize) -> Option<u64> {
        if row >= self.size || col >= self.size {
            return None;
        }
        let k = offset_step(
            row as i64 - self.start.0 as i64,
            col as i64 - self.start.1 as i64,
        );
        if k >= self.capacity() {
            return None;
        }
        self.offset.checked_add(k)
    }
}

/// Lazy state machine over the spiral: current heading, steps left in the
/// current leg, and how many legs have run at the current length.
/// Finite and not restartable; call [`Spiral::walk`] again to restart.
#[derive(Clone, Debug)]
pub struct SpiralWalk {
    row: i64,
    col: i64,
    step: u64,
    value: u64,
    remaining: u64,
    heading: Heading,
    leg_len: u64,
    leg_left: u64,
    legs_at_len: u8,
}

impl Iterator for SpiralWalk {
    type Item = SpiralCell;

    fn next(&mut self) -> Option<SpiralCell> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let cell = SpiralCell {
            step: self.step,
            value: self.value,
            row: self.row,
            col: self.col,
        };

        let (dr, dc) = self.heading.delta();
        self.row += dr;
        self.col += dc;
        self.leg_left -= 1;
        if self.leg_left == 0 {
            self.heading = self.heading.turn();
            self.legs_at_len += 1;
            if self.legs_at_len == 2 {
                self.legs_at_len = 0;
                self.leg_len += 1;
            }
            self.leg_left = self.leg_len;
        }
        self.step += 1;
        self.value = self.value.wrapping_add(1);

        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SpiralWalk {}

/// Closed-form position of step `k` relative to the start cell.
///
/// Legs come in pairs of equal length `m`; pair `m` covers steps
/// `m(m-1)+1 ..= m(m+1)`. Odd pairs run up then left, even pairs down then right.
pub fn step_offset(k: u64) -> (i64, i64) {
    if k == 0 {
        return (0, 0);
    }
    let k = k as u128;
    let mut m = ((4 * k + 1).isqrt() - 1) / 2;
    while m * (m + 1) < k {
        m += 1;
    }
    let t = (k - m * (m - 1)) as i64;
    let m = m as i64;
    if m % 2 == 1 {
        let a = (m - 1) / 2;
        if t <= m { (a - t, a) } else { (a - m, a - (t - m)) }
    } else {
        let b = m / 2;
        if t <= m { (t - b, -b) } else { (b, t - m - b) }
    }
}

/// Inverse of [`step_offset`]: the step at which the walk reaches `(dr, dc)`.
pub fn offset_step(dr: i64, dc: i64) -> u64 {
    if dr == 0 && dc == 0 {
        return 0;
    }
    let (m, t) = if dc >= 0 && dr >= -dc - 1 && dr < dc {
        // up leg of pair 2dc+1
        (2 * dc + 1, dc - dr)
    } else if dr < 0 && dc >= dr && dc <= -dr - 2 {
        // left leg of pair -2dr-1
        let a = -dr - 1;
        let m = 2 * a + 1;
        (m, m + a - dc)
    } else if dc < 0 && dr > dc && dr <= -dc {
        // down leg of pair -2dc
        (-2 * dc, dr - dc)
    } else {
        // right leg of pair 2dr
        let m = 2 * dr;
        (m, m + dc + dr)
    };
    (m as u64) * (m as u64 - 1) + t as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: usize, offset: u64) -> Vec<Vec<u64>> {
        let mut rows = vec![vec![0u64; size]; size];
        for cell in Spiral::centered(size, offset).full_walk().unwrap() {
            rows[cell.row as usize][cell.col as usize] = cell.value;
        }
        rows
    }

    #[test]
    fn five_by_five_layout() {
        assert_eq!(
            layout(5, 1),
            vec![
                vec![13, 12, 11, 10, 25],
                vec![14, 3, 2, 9, 24],
                vec![15, 4, 1, 8, 23],
                vec![16, 5, 6, 7, 22],
                vec![17, 18, 19, 20, 21],
            ]
        );
    }

    #[test]
    fn even_sizes_tile_the_grid() {
        assert_eq!(layout(2, 1), vec![vec![3, 2], vec![4, 1]]);
        assert_eq!(
            layout(4, 1),
            vec![
                vec![13, 12, 11, 10],
                vec![14, 3, 2, 9],
                vec![15, 4, 1, 8],
                vec![16, 5, 6, 7],
            ]
        );
    }

    #[test]
    fn walk_rejects_more_steps_than_cells() {
        let err = Spiral::centered(3, 1).walk(10).unwrap_err();
        assert!(matches!(
            err,
            UlamError::OutOfBounds {
                requested: 10,
                capacity: 9
            }
        ));
    }

    #[test]
    fn walk_rejects_value_overflow() {
        let err = Spiral::centered(3, u64::MAX - 3).walk(9).unwrap_err();
        assert!(matches!(err, UlamError::InvalidConfig { field: "offset", .. }));
        assert!(Spiral::centered(3, u64::MAX - 8).walk(9).is_ok());
    }

    #[test]
    fn empty_grid_walks_nothing() {
        assert_eq!(Spiral::centered(0, 1).full_walk().unwrap().count(), 0);
    }

    #[test]
    fn start_must_be_inside() {
        assert!(matches!(
            Spiral::centered(4, 1).with_start(4, 0),
            Err(UlamError::StartOutside { row: 4, col: 0, size: 4 })
        ));
        let s = Spiral::centered(4, 1).with_start(0, 0).unwrap();
        assert_eq!(s.start(), (0, 0));
    }

    #[test]
    fn closed_forms_match_layout() {
        let s = Spiral::centered(5, 1);
        assert_eq!(s.coord_of(1), Some((2, 2)));
        assert_eq!(s.coord_of(10), Some((0, 3)));
        assert_eq!(s.coord_of(26), None);
        assert_eq!(s.coord_of(0), None);
        assert_eq!(s.value_at(4, 0), Some(17));
        assert_eq!(s.value_at(0, 4), Some(25));
        assert_eq!(s.value_at(5, 0), None);
    }

    #[test]
    fn off_center_start_leaves_the_grid() {
        let s = Spiral::centered(3, 1).with_start(0, 0).unwrap();
        let inside = s
            .full_walk()
            .unwrap()
            .filter(|c| grid::inside(3, c.row, c.col).is_some())
            .count();
        assert!(inside < 9);
        assert_eq!(s.value_at(2, 2), None);
        assert_eq!(s.value_at(0, 0), Some(1));
    }
}

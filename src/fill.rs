use tracing::debug;

use crate::error::{Result, UlamError};
use crate::grid::Grid;
use crate::primes::PrimePredicate;
use crate::spiral::Spiral;

/// Write the first `limit` spiral values into `grid`, starting from `offset` at the center.
///
/// Cells the walk does not reach keep their current value (0 on a fresh grid).
pub fn fill_values(grid: &mut Grid<u64>, offset: u64, limit: u64) -> Result<&mut Grid<u64>> {
    let spiral = Spiral::centered(grid.size, offset);
    fill_values_with(grid, spiral, limit)
}

/// Same as [`fill_values`] for an arbitrary spiral layout. Steps that leave the
/// grid are skipped.
pub fn fill_values_with(
    grid: &mut Grid<u64>,
    spiral: Spiral,
    limit: u64,
) -> Result<&mut Grid<u64>> {
    if spiral.size() != grid.size {
        return Err(UlamError::SizeMismatch {
            spiral: spiral.size(),
            grid: grid.size,
        });
    }
    let mut written = 0usize;
    for cell in spiral.walk(limit)? {
        if grid.set_if_inside(cell.row, cell.col, cell.value) {
            written += 1;
        }
    }
    debug!(size = grid.size, offset = spiral.offset(), limit, written, "spiral values filled");
    Ok(grid)
}

/// Fill `grid` with prime flags for the first `limit` spiral values.
///
/// Every reached cell is overwritten with `predicate(value)`; unreached cells are untouched.
/// A predicate error aborts the fill before any cell is written and is returned as is.
pub fn fill_primes<'a, P>(
    grid: &'a mut Grid<bool>,
    offset: u64,
    limit: u64,
    predicate: &P,
) -> Result<&'a mut Grid<bool>>
where
    P: PrimePredicate + ?Sized,
{
    let spiral = Spiral::centered(grid.size, offset);
    let walk = spiral.walk(limit)?;
    let mut flags = Vec::with_capacity(walk.len());
    for cell in walk {
        let Some((row, col)) = grid.inside(cell.row, cell.col) else {
            continue;
        };
        flags.push((grid.idx(row, col), predicate.check(cell.value)?));
    }
    let primes = flags.iter().filter(|(_, f)| *f).count();
    for (i, flag) in flags {
        grid.data[i] = flag;
    }
    debug!(size = grid.size, offset, limit, primes, "prime flags filled");
    Ok(grid)
}

/// Derive the prime mask of a value grid: `mask[r][c] = predicate(values[r][c])`.
pub fn prime_mask<P>(values: &Grid<u64>, predicate: &P) -> Result<Grid<bool>>
where
    P: PrimePredicate + ?Sized,
{
    let data = values
        .data
        .iter()
        .map(|&v| predicate.check(v))
        .collect::<std::result::Result<Vec<bool>, _>>()?;
    Ok(Grid {
        data,
        size: values.size,
    })
}

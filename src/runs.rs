//! Gap-tolerant run detection along four line families.
//!
//! Each [`Direction`] maps `(line, pos)` to a grid cell, so the scan is written
//! once. A run extends across at most `gap_tolerance` consecutive `false`
//! cells and qualifies when it holds at least `min_run` `true` cells. Its span
//! runs from the first to the last `true` cell; trailing gaps are not part of it.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, UlamError};
use crate::grid::Grid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// ↘, cells with constant `col - row`.
    MainDiagonal,
    /// ↙, cells with constant `row + col`.
    AntiDiagonal,
    Horizontal,
    Vertical,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::MainDiagonal,
        Direction::AntiDiagonal,
        Direction::Horizontal,
        Direction::Vertical,
    ];

    #[inline]
    pub fn bit(self) -> u8 {
        match self {
            Direction::MainDiagonal => 1,
            Direction::AntiDiagonal => 2,
            Direction::Horizontal => 4,
            Direction::Vertical => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::MainDiagonal => "main-diagonal",
            Direction::AntiDiagonal => "anti-diagonal",
            Direction::Horizontal => "horizontal",
            Direction::Vertical => "vertical",
        }
    }

    /// Number of parallel lines in a `size`x`size` grid.
    pub fn line_count(self, size: usize) -> usize {
        match self {
            Direction::MainDiagonal | Direction::AntiDiagonal => (2 * size).saturating_sub(1),
            Direction::Horizontal | Direction::Vertical => size,
        }
    }

    pub fn line_len(self, size: usize, line: usize) -> usize {
        match self {
            Direction::MainDiagonal | Direction::AntiDiagonal => {
                size - line.abs_diff(size - 1)
            }
            Direction::Horizontal | Direction::Vertical => size,
        }
    }

    /// Grid cell at position `pos` along `line`. Positions run top to bottom
    /// (left to right for rows).
    ///
    /// Main diagonal `line` holds `col - row = line - (size - 1)`; anti-diagonal
    /// `line` holds `row + col = line`.
    #[inline]
    pub fn cell(self, size: usize, line: usize, pos: usize) -> (usize, usize) {
        match self {
            Direction::MainDiagonal => {
                if line + 1 >= size {
                    (pos, pos + line + 1 - size)
                } else {
                    (pos + size - 1 - line, pos)
                }
            }
            Direction::AntiDiagonal => {
                let first_row = (line + 1).saturating_sub(size);
                let row = first_row + pos;
                (row, line - row)
            }
            Direction::Horizontal => (line, pos),
            Direction::Vertical => (pos, line),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main-diagonal" | "main" | "diagonal" => Ok(Direction::MainDiagonal),
            "anti-diagonal" | "anti" => Ok(Direction::AntiDiagonal),
            "horizontal" | "h" => Ok(Direction::Horizontal),
            "vertical" | "v" => Ok(Direction::Vertical),
            other => Err(format!(
                "unknown direction '{other}' (expected main-diagonal, anti-diagonal, horizontal, vertical)"
            )),
        }
    }
}

/// A gap-tolerant stretch along one line. `end` is inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// `true` cells in the span.
    pub hits: usize,
    /// `false` cells bridged inside the span.
    pub gaps: usize,
}

impl Span {
    fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
            hits: 1,
            gaps: 0,
        }
    }

    /// Cells in the span, gaps included.
    pub fn width(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Maximal spans of `true` cells in a 1D sequence, bridging up to
/// `gap_tolerance` consecutive `false` cells. No length filter is applied.
pub fn find_spans<I>(cells: I, gap_tolerance: usize) -> Vec<Span>
where
    I: IntoIterator<Item = bool>,
{
    let mut spans = Vec::new();
    let mut current: Option<Span> = None;
    let mut gap = 0usize;

    for (pos, on) in cells.into_iter().enumerate() {
        if on {
            if let Some(span) = current.as_mut() {
                span.gaps += gap;
                span.hits += 1;
                span.end = pos;
            } else {
                current = Some(Span::at(pos));
            }
            gap = 0;
        } else if current.is_some() {
            gap += 1;
            if gap > gap_tolerance {
                spans.extend(current.take());
                gap = 0;
            }
        }
    }
    spans.extend(current);
    spans
}

/// A qualifying run on one line of one direction. `start..=end` are positions along the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Run {
    pub direction: Direction,
    pub line: usize,
    pub start: usize,
    pub end: usize,
    /// Count of `true` cells in the span.
    pub length: usize,
    pub gaps: usize,
}

impl Run {
    fn new(direction: Direction, line: usize, span: Span) -> Self {
        Self {
            direction,
            line,
            start: span.start,
            end: span.end,
            length: span.hits,
            gaps: span.gaps,
        }
    }

    pub fn span(&self) -> usize {
        self.end - self.start + 1
    }

    /// Grid cells covered by the run, gap cells included.
    pub fn cells(&self, size: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.start..=self.end).map(move |pos| self.direction.cell(size, self.line, pos))
    }
}

/// Cells covered by qualifying runs, with one bit per covering direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunMask {
    pub cells: Grid<u8>,
}

impl RunMask {
    pub fn new(size: usize) -> Self {
        Self {
            cells: Grid::new(size),
        }
    }

    pub fn from_runs(size: usize, runs: &[Run]) -> Self {
        let mut mask = Self::new(size);
        for run in runs {
            mask.mark(run);
        }
        mask
    }

    pub fn mark(&mut self, run: &Run) {
        let size = self.cells.size;
        let bit = run.direction.bit();
        for (row, col) in run.cells(size) {
            let i = self.cells.idx(row, col);
            self.cells.data[i] |= bit;
        }
    }

    pub fn size(&self) -> usize {
        self.cells.size
    }

    #[inline]
    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        self.cells.get(row, col) != 0
    }

    #[inline]
    pub fn covered_by(&self, row: usize, col: usize, direction: Direction) -> bool {
        self.cells.get(row, col) & direction.bit() != 0
    }

    pub fn directions_at(&self, row: usize, col: usize) -> impl Iterator<Item = Direction> {
        let bits = self.cells.get(row, col);
        Direction::ALL.into_iter().filter(move |d| bits & d.bit() != 0)
    }

    /// Cells covered by at least one direction.
    pub fn covered_count(&self) -> usize {
        self.cells.data.iter().filter(|&&b| b != 0).count()
    }

    pub fn direction_count(&self, direction: Direction) -> usize {
        let bit = direction.bit();
        self.cells.data.iter().filter(|&&b| b & bit != 0).count()
    }

    /// Union over all directions.
    pub fn to_mask(&self) -> Grid<bool> {
        Grid {
            data: self.cells.data.iter().map(|&b| b != 0).collect(),
            size: self.cells.size,
        }
    }
}

/// Check detection parameters and return the requested directions in canonical order, deduplicated.
pub fn checked_directions(min_run: usize, directions: &[Direction]) -> Result<Vec<Direction>> {
    if min_run < 1 {
        return Err(UlamError::invalid("min_run", "must be at least 1"));
    }
    if directions.is_empty() {
        return Err(UlamError::invalid("directions", "at least one direction is required"));
    }
    Ok(Direction::ALL
        .into_iter()
        .filter(|d| directions.contains(d))
        .collect())
}

/// All qualifying runs in `mask`, grouped by direction (canonical order), then by line, then by position.
pub fn find_runs(
    mask: &Grid<bool>,
    gap_tolerance: usize,
    min_run: usize,
    directions: &[Direction],
) -> Result<Vec<Run>> {
    let directions = checked_directions(min_run, directions)?;
    let size = mask.size;
    let mut runs = Vec::new();

    for direction in directions {
        // Scan lines in parallel; collect keeps line order.
        let per_line: Vec<Vec<Run>> = (0..direction.line_count(size))
            .into_par_iter()
            .map(|line| {
                let cells = (0..direction.line_len(size, line)).map(|pos| {
                    let (row, col) = direction.cell(size, line, pos);
                    mask.get(row, col)
                });
                find_spans(cells, gap_tolerance)
                    .into_iter()
                    .filter(|span| span.hits >= min_run)
                    .map(|span| Run::new(direction, line, span))
                    .collect()
            })
            .collect();
        let before = runs.len();
        runs.extend(per_line.into_iter().flatten());
        debug!(
            direction = direction.name(),
            runs = runs.len() - before,
            gap_tolerance,
            min_run,
            "direction scanned"
        );
    }

    Ok(runs)
}

/// Mask of every cell inside a qualifying run in any of `directions`.
pub fn detect_segments(
    mask: &Grid<bool>,
    gap_tolerance: usize,
    min_run: usize,
    directions: &[Direction],
) -> Result<RunMask> {
    let runs = find_runs(mask, gap_tolerance, min_run, directions)?;
    Ok(RunMask::from_runs(mask.size, &runs))
}

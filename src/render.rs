use rayon::prelude::*;

use crate::grid::Grid;
use crate::runs::{Direction, RunMask};

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const PRIME: [u8; 4] = [30, 60, 200, 255];
const CENTER: [u8; 4] = [220, 30, 30, 255];
const SEGMENT: [u8; 4] = [220, 30, 30, 255];
const OVERLAP: [u8; 4] = [20, 20, 20, 255];

fn direction_color(direction: Direction) -> [u8; 4] {
    match direction {
        Direction::MainDiagonal => [220, 30, 30, 255],
        Direction::AntiDiagonal => [30, 150, 60, 255],
        Direction::Horizontal => [240, 160, 20, 255],
        Direction::Vertical => [140, 40, 200, 255],
    }
}

/// Paint one RGBA pixel per cell, rows in parallel.
fn paint<F>(size: usize, color: F) -> Vec<u8>
where
    F: Fn(usize, usize) -> [u8; 4] + Sync,
{
    let mut rgba = vec![0u8; size * size * 4];
    if size == 0 {
        return rgba;
    }
    rgba.par_chunks_mut(size * 4)
        .enumerate()
        .for_each(|(row, pixels)| {
            for col in 0..size {
                pixels[col * 4..col * 4 + 4].copy_from_slice(&color(row, col));
            }
        });
    rgba
}

/// Primes in blue, the spiral start in red.
pub fn render_spiral(primes: &Grid<bool>, center: (usize, usize)) -> Vec<u8> {
    paint(primes.size, |row, col| {
        if (row, col) == center {
            CENTER
        } else if primes.get(row, col) {
            PRIME
        } else {
            BACKGROUND
        }
    })
}

/// Primes in blue, cells of qualifying runs in red on top.
pub fn render_segments(primes: &Grid<bool>, runs: &RunMask) -> Vec<u8> {
    debug_assert_eq!(primes.size, runs.size());
    paint(primes.size, |row, col| {
        if runs.is_covered(row, col) {
            SEGMENT
        } else if primes.get(row, col) {
            PRIME
        } else {
            BACKGROUND
        }
    })
}

/// One color per covering direction; cells covered by several directions are dark.
pub fn render_directions(runs: &RunMask) -> Vec<u8> {
    paint(runs.size(), |row, col| {
        let mut dirs = runs.directions_at(row, col);
        match (dirs.next(), dirs.next()) {
            (None, _) => BACKGROUND,
            (Some(d), None) => direction_color(d),
            (Some(_), Some(_)) => OVERLAP,
        }
    })
}

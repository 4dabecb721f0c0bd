use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, UlamError};
use crate::fill::prime_mask;
use crate::grid::Grid;
use crate::primes::PrimePredicate;
use crate::runs::{Direction, RunMask, detect_segments};

/// Fraction of the grid covered by qualifying runs in all four directions.
///
/// `values` holds spiral values; they are reduced to a prime mask first.
pub fn ulam_goodness<P>(
    values: &Grid<u64>,
    predicate: &P,
    gap_tolerance: usize,
    min_run: usize,
) -> Result<f64>
where
    P: PrimePredicate + ?Sized,
{
    let mask = prime_mask(values, predicate)?;
    mask_goodness(&mask, gap_tolerance, min_run, &Direction::ALL)
}

/// Goodness of an already computed prime mask over the given directions.
pub fn mask_goodness(
    mask: &Grid<bool>,
    gap_tolerance: usize,
    min_run: usize,
    directions: &[Direction],
) -> Result<f64> {
    let runs = detect_segments(mask, gap_tolerance, min_run, directions)?;
    let score = coverage(&runs);
    debug!(size = mask.size, gap_tolerance, min_run, score, "goodness scored");
    Ok(score)
}

/// `covered / size²`; an empty grid scores 0.
pub fn coverage(runs: &RunMask) -> f64 {
    let cells = runs.size() * runs.size();
    if cells == 0 {
        return 0.0;
    }
    runs.covered_count() as f64 / cells as f64
}

/// Per-direction weights in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DirectionWeights {
    pub main_diagonal: f64,
    pub anti_diagonal: f64,
    pub horizontal: f64,
    pub vertical: f64,
}

impl Default for DirectionWeights {
    fn default() -> Self {
        Self {
            main_diagonal: 1.0,
            anti_diagonal: 1.0,
            horizontal: 1.0,
            vertical: 1.0,
        }
    }
}

impl DirectionWeights {
    pub fn get(&self, direction: Direction) -> f64 {
        match direction {
            Direction::MainDiagonal => self.main_diagonal,
            Direction::AntiDiagonal => self.anti_diagonal,
            Direction::Horizontal => self.horizontal,
            Direction::Vertical => self.vertical,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for direction in Direction::ALL {
            let w = self.get(direction);
            if !(0.0..=1.0).contains(&w) {
                return Err(UlamError::invalid(
                    "weights",
                    format!("{direction} weight {w} is outside [0, 1]"),
                ));
            }
        }
        Ok(())
    }
}

/// Coverage where each cell counts the largest weight among the directions covering it.
///
/// Cells are summed in row-major order, so repeated calls round identically.
pub fn weighted_coverage(runs: &RunMask, weights: &DirectionWeights) -> Result<f64> {
    weights.validate()?;
    let cells = runs.size() * runs.size();
    if cells == 0 {
        return Ok(0.0);
    }
    let mut total = 0.0f64;
    for row in 0..runs.size() {
        for col in 0..runs.size() {
            total += runs
                .directions_at(row, col)
                .map(|d| weights.get(d))
                .fold(0.0, f64::max);
        }
    }
    Ok(total / cells as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::fill_values;
    use crate::primes::TrialDivision;

    #[test]
    fn single_non_prime_cell_scores_zero() {
        let values = Grid::from_rows(vec![vec![4u64]]).unwrap();
        assert_eq!(ulam_goodness(&values, &TrialDivision, 0, 1).unwrap(), 0.0);
    }

    #[test]
    fn single_prime_cell_with_min_run_one_scores_one() {
        let values = Grid::from_rows(vec![vec![7u64]]).unwrap();
        assert_eq!(ulam_goodness(&values, &TrialDivision, 0, 1).unwrap(), 1.0);
    }

    #[test]
    fn all_true_mask_scores_exactly_one() {
        let mask = Grid::from_rows(vec![vec![true; 6]; 6]).unwrap();
        assert_eq!(mask_goodness(&mask, 0, 6, &Direction::ALL).unwrap(), 1.0);
        assert_eq!(mask_goodness(&mask, 0, 7, &Direction::ALL).unwrap(), 0.0);
    }

    #[test]
    fn all_false_mask_scores_zero() {
        let mask = Grid::<bool>::new(8);
        assert_eq!(mask_goodness(&mask, 3, 1, &Direction::ALL).unwrap(), 0.0);
    }

    #[test]
    fn empty_grid_scores_zero() {
        let mask = Grid::<bool>::new(0);
        assert_eq!(mask_goodness(&mask, 0, 1, &Direction::ALL).unwrap(), 0.0);
    }

    #[test]
    fn repeated_scores_are_bit_identical() {
        // offset 41 puts n² + n + 41 on the main diagonal: 40 primes in a row
        let mut values = Grid::<u64>::new(41);
        fill_values(&mut values, 41, 41 * 41).unwrap();
        let a = ulam_goodness(&values, &TrialDivision, 2, 4).unwrap();
        let b = ulam_goodness(&values, &TrialDivision, 2, 4).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
        assert!(a >= 40.0 / 1681.0 && a < 1.0);
    }

    #[test]
    fn uniform_weights_match_plain_coverage() {
        let mut values = Grid::<u64>::new(21);
        fill_values(&mut values, 1, 21 * 21).unwrap();
        let mask = prime_mask(&values, &TrialDivision).unwrap();
        let runs = detect_segments(&mask, 1, 3, &Direction::ALL).unwrap();
        let weighted = weighted_coverage(&runs, &DirectionWeights::default()).unwrap();
        assert_eq!(weighted, coverage(&runs));
    }

    #[test]
    fn weights_pick_the_strongest_direction() {
        let mut mask = Grid::<bool>::new(4);
        for i in 0..4 {
            mask.set(0, i, true);
            mask.set(i, 0, true);
        }
        let runs = detect_segments(&mask, 0, 4, &Direction::ALL).unwrap();
        let weights = DirectionWeights {
            horizontal: 0.5,
            vertical: 0.25,
            ..DirectionWeights::default()
        };
        // row 0: (0,0) counts 0.5, three more at 0.5; column 0: three cells at 0.25
        let expected = (4.0 * 0.5 + 3.0 * 0.25) / 16.0;
        assert_eq!(weighted_coverage(&runs, &weights).unwrap(), expected);
    }

    #[test]
    fn weights_outside_unit_interval_are_rejected() {
        let runs = RunMask::new(2);
        let weights = DirectionWeights {
            anti_diagonal: 1.5,
            ..DirectionWeights::default()
        };
        assert!(matches!(
            weighted_coverage(&runs, &weights),
            Err(UlamError::InvalidConfig { field: "weights", .. })
        ));
        let nan = DirectionWeights {
            vertical: f64::NAN,
            ..DirectionWeights::default()
        };
        assert!(nan.validate().is_err());
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{Result, UlamError};
use crate::goodness::DirectionWeights;
use crate::runs::{Direction, checked_directions};

/// Upper bound on `padding`.
pub const MAX_PADDING: usize = 1 << 16;
/// Upper bound on the grid side.
pub const MAX_SIDE: usize = 1 << 20;

/// All tunable parameters. Loaded from JSON and overridden by CLI flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Params {
    // Spiral
    /// Total spiral steps to fill.
    pub limit: u64,
    /// Value placed at the center cell.
    pub offset: u64,
    /// Cells added to the side of the smallest square holding `limit`.
    pub padding: usize,

    // Run detection; signed so negative input can be reported
    pub gap_tolerance: i64,
    pub min_run: i64,
    pub directions: Vec<Direction>,

    // Scoring
    pub weights: DirectionWeights,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            limit: 100_000,
            offset: 1,
            padding: 10,
            gap_tolerance: 1,
            min_run: 5,
            directions: Direction::ALL.to_vec(),
            weights: DirectionWeights::default(),
        }
    }
}

/// Parameters after validation, in the types the core operates on.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub size: usize,
    pub limit: u64,
    pub offset: u64,
    pub gap_tolerance: usize,
    pub min_run: usize,
    pub directions: Vec<Direction>,
    pub weights: DirectionWeights,
}

impl Settings {
    /// Largest value the spiral places.
    pub fn max_value(&self) -> u64 {
        self.offset.saturating_add(self.limit).saturating_sub(1)
    }
}

impl Params {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| UlamError::invalid("config", e.to_string()))
    }

    /// Side of the square grid: `round(sqrt(limit)) + padding`, grown when needed so `limit` fits.
    pub fn grid_size(&self) -> usize {
        let side = ((self.limit as f64).sqrt().round() as usize).saturating_add(self.padding);
        let mut side = side.max(1);
        while (side as u64).saturating_mul(side as u64) < self.limit {
            side += 1;
        }
        side
    }

    /// Validate against a grid of `grid_size()`.
    pub fn validate(&self) -> Result<Settings> {
        self.validate_for(self.grid_size())
    }

    /// Validate against a caller-supplied grid side.
    pub fn validate_for(&self, size: usize) -> Result<Settings> {
        if self.gap_tolerance < 0 {
            return Err(UlamError::invalid(
                "gap_tolerance",
                format!("must be non-negative, got {}", self.gap_tolerance),
            ));
        }
        if self.min_run < 1 {
            return Err(UlamError::invalid(
                "min_run",
                format!("must be at least 1, got {}", self.min_run),
            ));
        }
        if self.limit == 0 {
            return Err(UlamError::invalid("limit", "must be positive"));
        }
        if self.padding > MAX_PADDING {
            return Err(UlamError::invalid(
                "padding",
                format!("at most {MAX_PADDING}, got {}", self.padding),
            ));
        }
        if size > MAX_SIDE {
            return Err(UlamError::invalid(
                "limit",
                format!("needs a {size}x{size} grid, sides are capped at {MAX_SIDE}"),
            ));
        }
        let capacity = (size as u64).saturating_mul(size as u64);
        if self.limit > capacity {
            return Err(UlamError::OutOfBounds {
                requested: self.limit,
                capacity,
            });
        }
        if self.offset.checked_add(self.limit).is_none() {
            return Err(UlamError::invalid("offset", "offset + limit overflows u64"));
        }
        let directions = checked_directions(self.min_run as usize, &self.directions)?;
        self.weights.validate()?;

        Ok(Settings {
            size,
            limit: self.limit,
            offset: self.offset,
            gap_tolerance: self.gap_tolerance as usize,
            min_run: self.min_run as usize,
            directions,
            weights: self.weights,
        })
    }
}

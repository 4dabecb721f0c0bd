pub mod config;
pub mod error;
pub mod fill;
pub mod goodness;
pub mod grid;
pub mod primes;
pub mod render;
pub mod runs;
pub mod spiral;

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use config::{Params, Settings};
use error::Result;
use grid::Grid;
use primes::PrimePredicate;
use runs::{Run, RunMask};
use spiral::Spiral;

pub use error::{ErrorKind, UlamError};

pub struct Analysis {
    pub settings: Settings,
    pub center: (usize, usize),
    pub values: Grid<u64>,
    pub primes: Grid<bool>,
    pub runs: Vec<Run>,
    pub run_mask: RunMask,
    pub score: f64,
    pub weighted_score: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Summary suitable for printing as JSON.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub size: usize,
    pub limit: u64,
    pub offset: u64,
    pub gap_tolerance: usize,
    pub min_run: usize,
    pub primes: usize,
    pub covered: usize,
    pub score: f64,
    pub weighted_score: f64,
    pub runs_by_direction: Vec<(String, usize)>,
    pub longest: Option<Run>,
    pub timings: Vec<Timing>,
}

impl Analysis {
    pub fn report(&self, timings: &[Timing]) -> Report {
        let runs_by_direction = self
            .settings
            .directions
            .iter()
            .map(|d| {
                let n = self.runs.iter().filter(|r| r.direction == *d).count();
                (d.name().to_string(), n)
            })
            .collect();
        Report {
            size: self.settings.size,
            limit: self.settings.limit,
            offset: self.settings.offset,
            gap_tolerance: self.settings.gap_tolerance,
            min_run: self.settings.min_run,
            primes: self.primes.count_true(),
            covered: self.run_mask.covered_count(),
            score: self.score,
            weighted_score: self.weighted_score,
            runs_by_direction,
            longest: self.runs.iter().max_by_key(|r| r.length).copied(),
            timings: timings.to_vec(),
        }
    }
}

fn elapsed_ms(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1000.0
}

/// Fill, mask, detect and score one configuration.
pub fn analyze<P>(params: &Params, predicate: &P) -> Result<(Analysis, Vec<Timing>)>
where
    P: PrimePredicate + ?Sized,
{
    let settings = params.validate()?;
    analyze_settings(settings, predicate)
}

fn analyze_settings<P>(settings: Settings, predicate: &P) -> Result<(Analysis, Vec<Timing>)>
where
    P: PrimePredicate + ?Sized,
{
    let mut timings = Vec::new();
    let total_start = Instant::now();
    let size = settings.size;

    // 1. Spiral values
    let t = Instant::now();
    let mut values = Grid::<u64>::new(size);
    fill::fill_values(&mut values, settings.offset, settings.limit)?;
    timings.push(Timing {
        name: "spiral_fill",
        ms: elapsed_ms(t),
    });

    // 2. Prime mask over reached cells only; unreached cells hold the 0 sentinel
    let t = Instant::now();
    let mut primes = Grid::<bool>::new(size);
    fill::fill_primes(&mut primes, settings.offset, settings.limit, predicate)?;
    timings.push(Timing {
        name: "prime_mask",
        ms: elapsed_ms(t),
    });

    // 3. Runs in every requested direction
    let t = Instant::now();
    let runs = runs::find_runs(
        &primes,
        settings.gap_tolerance,
        settings.min_run,
        &settings.directions,
    )?;
    let run_mask = RunMask::from_runs(size, &runs);
    timings.push(Timing {
        name: "run_detect",
        ms: elapsed_ms(t),
    });

    // 4. Scores
    let t = Instant::now();
    let score = goodness::coverage(&run_mask);
    let weighted_score = goodness::weighted_coverage(&run_mask, &settings.weights)?;
    timings.push(Timing {
        name: "goodness",
        ms: elapsed_ms(t),
    });

    timings.push(Timing {
        name: "TOTAL",
        ms: elapsed_ms(total_start),
    });

    let center = Spiral::centered(size, settings.offset).start();
    debug!(runs = runs.len(), covered = run_mask.covered_count(), "analysis done");
    info!(size, offset = settings.offset, score, "ulam goodness");

    let analysis = Analysis {
        settings,
        center,
        values,
        primes,
        runs,
        run_mask,
        score,
        weighted_score,
    };
    Ok((analysis, timings))
}

/// Score offsets `offset + 2j + 1` for `j in 0..frames`, one frame each.
pub fn sweep_offsets<P>(params: &Params, frames: usize, predicate: &P) -> Result<Vec<(u64, f64)>>
where
    P: PrimePredicate + ?Sized,
{
    let base = params.validate()?;
    let mut scores = Vec::with_capacity(frames);
    for j in 0..frames as u64 {
        let offset = base.offset.checked_add(2 * j + 1).ok_or_else(|| {
            UlamError::invalid("offset", "sweep offset overflows u64")
        })?;
        let frame = Params {
            offset,
            ..params.clone()
        };
        let settings = frame.validate_for(base.size)?;
        let (analysis, _) = analyze_settings(settings, predicate)?;
        debug!(frame = j, offset, score = analysis.score, "sweep frame");
        scores.push((offset, analysis.score));
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::{Sieve, TrialDivision};
    use crate::runs::Direction;

    fn small() -> Params {
        Params {
            limit: 400,
            offset: 41,
            padding: 1,
            gap_tolerance: 0,
            min_run: 10,
            ..Params::default()
        }
    }

    #[test]
    fn pipeline_matches_direct_scoring() {
        let params = small();
        let (analysis, timings) = analyze(&params, &TrialDivision).unwrap();
        assert_eq!(analysis.settings.size, 21);
        assert_eq!(analysis.center, (10, 10));
        assert_eq!(timings.last().map(|t| t.name), Some("TOTAL"));

        let direct = goodness::mask_goodness(&analysis.primes, 0, 10, &Direction::ALL).unwrap();
        assert_eq!(analysis.score, direct);
        assert_eq!(analysis.weighted_score, analysis.score);
        assert!(analysis.score > 0.0);
    }

    #[test]
    fn sieve_and_trial_division_agree() {
        let params = small();
        let settings = params.validate().unwrap();
        let sieve = Sieve::up_to(settings.max_value()).unwrap();
        let (a, _) = analyze(&params, &sieve).unwrap();
        let (b, _) = analyze(&params, &TrialDivision).unwrap();
        assert_eq!(a.primes, b.primes);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
    }

    #[test]
    fn undersized_sieve_fails_the_whole_analysis() {
        let params = small();
        let err = analyze(&params, &Sieve::up_to(100).unwrap()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::PredicateFailure);
    }

    #[test]
    fn sweep_uses_odd_steps_from_offset() {
        let params = Params {
            limit: 100,
            offset: 1,
            padding: 0,
            min_run: 3,
            ..Params::default()
        };
        let scores = sweep_offsets(&params, 3, &TrialDivision).unwrap();
        let offsets: Vec<u64> = scores.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![2, 4, 6]);
        assert!(scores.iter().all(|(_, s)| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn report_summarises_runs() {
        let (analysis, timings) = analyze(&small(), &TrialDivision).unwrap();
        let report = analysis.report(&timings);
        assert_eq!(report.covered, analysis.run_mask.covered_count());
        assert_eq!(report.runs_by_direction.len(), 4);
        let total: usize = report.runs_by_direction.iter().map(|(_, n)| n).sum();
        assert_eq!(total, analysis.runs.len());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"score\""));
    }
}

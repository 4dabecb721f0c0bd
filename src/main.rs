use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{Level, warn};
use tracing_subscriber::FmtSubscriber;

use ulam::config::Params;
use ulam::primes::{PrimePredicate, Sieve, TrialDivision};
use ulam::render;
use ulam::runs::Direction;

/// Fill an Ulam spiral, detect prime line segments, and score how much of the grid they cover.
#[derive(Parser)]
#[command(name = "ulam")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ulam spiral segment detector", long_about = None)]
struct Cli {
    /// JSON file with parameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Spiral steps to fill
    #[arg(long)]
    limit: Option<u64>,

    /// Value placed at the center
    #[arg(long)]
    offset: Option<u64>,

    /// Extra cells per grid side
    #[arg(long)]
    padding: Option<usize>,

    /// Consecutive non-prime cells a run may bridge
    #[arg(long, allow_negative_numbers = true)]
    gap_tolerance: Option<i64>,

    /// Prime cells a run needs to count
    #[arg(long, allow_negative_numbers = true)]
    min_run: Option<i64>,

    /// Comma-separated subset of main-diagonal, anti-diagonal, horizontal, vertical
    #[arg(long, value_delimiter = ',')]
    directions: Option<Vec<Direction>>,

    /// Also score this many offsets `offset + 2j + 1`
    #[arg(long, default_value_t = 0)]
    frames: usize,

    /// Use trial division instead of a sieve
    #[arg(long)]
    trial_division: bool,

    /// Directory for PNG output; nothing is written without it
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn params(&self) -> anyhow::Result<Params> {
        let mut params = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Params::from_json(&text)?
            }
            None => Params::default(),
        };
        if let Some(v) = self.limit {
            params.limit = v;
        }
        if let Some(v) = self.offset {
            params.offset = v;
        }
        if let Some(v) = self.padding {
            params.padding = v;
        }
        if let Some(v) = self.gap_tolerance {
            params.gap_tolerance = v;
        }
        if let Some(v) = self.min_run {
            params.min_run = v;
        }
        if let Some(v) = &self.directions {
            params.directions = v.clone();
        }
        Ok(params)
    }
}

fn save_png(dir: &Path, name: &str, rgba: &[u8], size: usize) -> anyhow::Result<()> {
    let path = dir.join(name);
    image::save_buffer(&path, rgba, size as u32, size as u32, image::ColorType::Rgba8)
        .with_context(|| format!("saving {}", path.display()))?;
    eprintln!("Saved {}", path.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: could not install logger: {e}");
    }

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        let code = e
            .downcast_ref::<ulam::UlamError>()
            .map(|e| e.exit_code())
            .unwrap_or(1);
        std::process::exit(code);
    }
}

/// Largest value any sweep frame reaches: `offset + 2 * frames + limit - 2`.
fn sieve_range(offset: u64, limit: u64, frames: usize) -> u64 {
    offset
        .saturating_add((frames as u64).saturating_mul(2))
        .saturating_add(limit)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let params = cli.params()?;
    let settings = params.validate()?;

    let sieve = if cli.trial_division {
        None
    } else {
        let max = sieve_range(settings.offset, settings.limit, cli.frames);
        match Sieve::up_to(max) {
            Ok(sieve) => Some(sieve),
            Err(e) => {
                warn!("{e}; falling back to trial division");
                None
            }
        }
    };
    let predicate: &dyn PrimePredicate = match &sieve {
        Some(sieve) => sieve,
        None => &TrialDivision,
    };

    eprintln!(
        "Analyzing {}x{} spiral: limit={}, offset={}, gap={}, min_run={}",
        settings.size,
        settings.size,
        settings.limit,
        settings.offset,
        settings.gap_tolerance,
        settings.min_run
    );

    let (analysis, timings) = ulam::analyze(&params, predicate)?;

    eprintln!("\nTimings:");
    for t in &timings {
        eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    let report = analysis.report(&timings);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("runs:      {}", analysis.runs.len());
        println!("covered:   {} / {}", report.covered, settings.size * settings.size);
        println!("goodness:  {:.6}", analysis.score);
        println!("weighted:  {:.6}", analysis.weighted_score);
    }

    if cli.frames > 0 {
        let scores = ulam::sweep_offsets(&params, cli.frames, predicate)?;
        for (offset, score) in scores {
            println!("offset {offset:>10}  goodness {score:.6}");
        }
    }

    if let Some(dir) = &cli.out {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let size = settings.size;
        save_png(dir, "spiral.png", &render::render_spiral(&analysis.primes, analysis.center), size)?;
        save_png(
            dir,
            "segments.png",
            &render::render_segments(&analysis.primes, &analysis.run_mask),
            size,
        )?;
        save_png(dir, "directions.png", &render::render_directions(&analysis.run_mask), size)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sieve_range_saturates() {
        assert_eq!(sieve_range(1, 100, 3), 107);
        assert_eq!(sieve_range(1, 100, usize::MAX), u64::MAX);
        assert_eq!(sieve_range(u64::MAX - 1, 1, 0), u64::MAX);
        assert!(Sieve::up_to(sieve_range(u64::MAX - 10, 10, 4)).is_err());
    }
}

//! Normalizer: raw scraped CSV in, cleaned CSV out.
//!
//! The steps run in a fixed order and each relies on what the previous one
//! established: headers are normalized before salary columns are discovered,
//! inverted ranges are nulled before averages are backfilled, and medians are
//! taken only after backfill.

pub mod fields;
pub mod frame;
pub mod salary;
pub mod writer;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CleanError;
use fields::{remote_flags, to_datetimes};
use frame::{Cells, Frame};
use salary::{SALARY_AVG, SALARY_MAX, SALARY_MIN};

/// Columns written to the cleaned file, in order
pub const OUTPUT_COLUMNS: [&str; 12] = [
    "title",
    "company",
    "location",
    "salary_avg",
    "salary_min",
    "salary_max",
    "is_remote",
    "seniority",
    "category",
    "skills",
    "post_date",
    "scraped_date",
];

const DATE_COLUMNS: [&str; 2] = ["post_date", "scraped_date"];

/// Cells filled from the column median
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Imputation {
    pub filled: usize,
    pub median: Option<f64>,
}

/// What the cleaning steps changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningStats {
    pub salary_columns: Vec<String>,
    pub inverted_ranges_nulled: usize,
    pub averages_backfilled: usize,
    pub salary_avg_imputed: Imputation,
    pub salary_min_imputed: Imputation,
    pub salary_max_imputed: Imputation,
}

/// Result of one Normalizer run
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub output: PathBuf,
    pub rows_written: usize,
    pub columns: Vec<String>,
    pub stats: CleaningStats,
}

/// Apply every cleaning step to an already-parsed frame
///
/// Header normalization and duplicate elimination happen when the frame is
/// parsed; this covers the remaining steps and the final projection.
pub fn clean_frame(mut frame: Frame) -> (Frame, CleaningStats) {
    let rows = frame.rows();
    let mut stats = CleaningStats {
        salary_columns: salary::salary_columns(&frame),
        ..Default::default()
    };

    for name in &stats.salary_columns {
        if let Some(cells) = frame.take(name) {
            frame.set(name, Cells::Decimal(salary::to_decimal(cells)));
        }
    }

    let mut take_salary = |name: &str| match frame.take(name) {
        Some(cells) => salary::to_decimal(cells),
        None => vec![None; rows],
    };
    let mut avg = take_salary(SALARY_AVG);
    let mut min = take_salary(SALARY_MIN);
    let mut max = take_salary(SALARY_MAX);

    stats.inverted_ranges_nulled = salary::null_inverted_ranges(&mut min, &mut max);
    stats.averages_backfilled = salary::backfill_average(&mut avg, &min, &max);

    for (values, slot) in [
        (&mut avg, &mut stats.salary_avg_imputed),
        (&mut min, &mut stats.salary_min_imputed),
        (&mut max, &mut stats.salary_max_imputed),
    ] {
        let (filled, median) = salary::impute_median(values);
        *slot = Imputation { filled, median };
    }

    frame.set(SALARY_AVG, Cells::Decimal(avg));
    frame.set(SALARY_MIN, Cells::Decimal(min));
    frame.set(SALARY_MAX, Cells::Decimal(max));

    let remote = remote_flags(frame.take("is_remote"), rows);
    frame.set("is_remote", Cells::Flag(remote));

    for name in DATE_COLUMNS {
        if let Some(cells) = frame.take(name) {
            frame.set(name, Cells::DateTime(to_datetimes(cells)));
        }
    }

    (frame.project(&OUTPUT_COLUMNS), stats)
}

/// Clean `input` and overwrite `output` with the result
pub fn clean_file(input: &Path, output: &Path) -> Result<CleanReport, CleanError> {
    info!("Loading raw data from {}", input.display());
    let frame = Frame::read_csv(input)?;
    info!("Loaded {} records with {} columns", frame.rows(), frame.columns().len());
    debug!("Normalized columns: {:?}", frame.names().collect::<Vec<_>>());
    if !frame.contains("is_remote") {
        warn!("No is_remote column; every row is marked on-site");
    }

    let (cleaned, stats) = clean_frame(frame);

    info!("Salary columns found: {:?}", stats.salary_columns);
    if stats.inverted_ranges_nulled > 0 {
        warn!(
            "Nulled {} salary ranges where salary_min > salary_max",
            stats.inverted_ranges_nulled
        );
    }
    info!("Backfilled {} salary_avg values from min/max", stats.averages_backfilled);
    for (name, imputed) in [
        (SALARY_AVG, &stats.salary_avg_imputed),
        (SALARY_MIN, &stats.salary_min_imputed),
        (SALARY_MAX, &stats.salary_max_imputed),
    ] {
        match imputed.median {
            Some(median) => info!("Filled {} {} values with median {}", imputed.filled, name, median),
            None => warn!("{} has no values at all; left empty", name),
        }
    }

    writer::write_file(&cleaned, output)?;

    let report = CleanReport {
        output: output.to_path_buf(),
        rows_written: cleaned.rows(),
        columns: cleaned.names().map(str::to_string).collect(),
        stats,
    };
    info!("Saved {} records to {}", report.rows_written, output.display());
    Ok(report)
}

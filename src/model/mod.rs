//! Aggregation model: reconcile independently parsed runs onto one test axis.

pub mod error;

pub use error::ValidationError;

use crate::log::RunResult;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub position: usize,
    /// None for a gap: run too short, stat absent, or value unparseable.
    pub value: Option<i64>,
}

/// One run's values for one instrument, one point per reference position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSeries {
    pub run: usize,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedSeries {
    pub instrument: String,
    pub per_run: Vec<RunSeries>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedDataset {
    /// Input index of the run whose tests define the axis.
    pub reference_run: usize,
    pub run_count: usize,
    /// Test identifiers of the reference run, indexed by position.
    pub identifiers: Vec<String>,
    pub series: Vec<AlignedSeries>,
}

/// Validate that all runs executed the same test sequence and align them.
///
/// Performs:
/// - reject an empty run list, and any run without a single support entry
/// - pick the longest run as reference (ties keep input order)
/// - require every run to be a prefix of the reference, by identifier
/// - emit one series per instrument supported in at least one run
pub fn reconcile(results: &[RunResult]) -> Result<AlignedDataset, ValidationError> {
    if results.is_empty() {
        return Err(ValidationError::NoData);
    }

    if let Some(run) = results.iter().position(|r| r.support.is_empty()) {
        return Err(ValidationError::NoInstrumentsFound { run });
    }

    // Shorter runs are treated as truncated (crashed or aborted) prefixes.
    // `sort_by` is stable, so equal lengths keep input order.
    let mut order: Vec<usize> = (0..results.len()).collect();
    order.sort_by(|&a, &b| results[b].tests.len().cmp(&results[a].tests.len()));

    let reference_run = order[0];
    let reference = &results[reference_run].tests;

    for &run in &order {
        for (position, test) in results[run].tests.iter().enumerate() {
            let expected = &reference[position].identifier;
            if &test.identifier != expected {
                return Err(ValidationError::SequenceMismatch {
                    run,
                    position,
                    expected: expected.clone(),
                    found: test.identifier.clone(),
                });
            }
        }
    }

    let instruments: BTreeSet<&str> = results
        .iter()
        .flat_map(|r| {
            r.support
                .iter()
                .filter(|(_, supported)| **supported)
                .map(|(name, _)| name.as_str())
        })
        .collect();

    let series = instruments
        .into_iter()
        .map(|instrument| AlignedSeries {
            instrument: instrument.to_string(),
            per_run: order
                .iter()
                .filter(|&&run| results[run].is_supported(instrument))
                .map(|&run| RunSeries {
                    run,
                    points: align_points(&results[run], instrument, reference.len()),
                })
                .collect(),
        })
        .collect();

    Ok(AlignedDataset {
        reference_run,
        run_count: results.len(),
        identifiers: reference.iter().map(|t| t.identifier.clone()).collect(),
        series,
    })
}

fn align_points(run: &RunResult, instrument: &str, len: usize) -> Vec<Point> {
    (0..len)
        .map(|position| Point {
            position,
            value: run
                .tests
                .get(position)
                .and_then(|t| t.memory.get(instrument).copied().flatten()),
        })
        .collect()
}

use thiserror::Error;

/// Reasons a set of runs cannot be charted together.
///
/// Runs are referred to by their position in the input, starting at 0.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No logs to compare")]
    NoData,

    #[error("No memory stats found in run {run}")]
    NoInstrumentsFound { run: usize },

    #[error(
        "All logs must agree on names of the tests run: run {run} has {found:?} at position {position}, expected {expected:?}"
    )]
    SequenceMismatch {
        run: usize,
        position: usize,
        expected: String,
        found: String,
    },
}

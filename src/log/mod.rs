//! Log parsing for test-run logs carrying `MEMORY STAT` and `TEST-END` markers.

pub mod parse;
pub mod run;

pub use parse::parse_run;
pub use run::{RunResult, TestRecord};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Instrument name -> whether the run's platform reports it.
pub type SupportTable = BTreeMap<String, bool>;

/// Instrument name -> value recorded after a test.
///
/// `None` marks a value that was present but did not parse as an integer.
pub type MemoryMap = BTreeMap<String, Option<i64>>;

/// Memory stats accumulated up to a single `TEST-END` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRecord {
    pub identifier: String,
    pub memory: MemoryMap,
}

/// Everything extracted from one run's log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub support: SupportTable,
    pub tests: Vec<TestRecord>,
}

impl RunResult {
    /// Every instrument name seen anywhere in the run, supported or not.
    pub fn instruments(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.support.keys().map(String::as_str).collect();
        for test in &self.tests {
            names.extend(test.memory.keys().map(String::as_str));
        }
        names
    }

    /// True only for instruments registered as supported before the first test.
    pub fn is_supported(&self, instrument: &str) -> bool {
        self.support.get(instrument).copied().unwrap_or(false)
    }
}

use crate::log::run::{MemoryMap, RunResult, TestRecord};
use regex::Regex;
use std::sync::LazyLock;

const STAT_MARKER: &str = "MEMORY STAT ";
const AFTER_TEST: &str = " after test: ";
const NOT_SUPPORTED: &str = " not supported";
const TEST_END_MARKER: &str = "TEST-END | ";
const TEST_END_DELIM: &str = " |";

// Leading integer, parseInt style: whitespace, optional sign, digits, then anything.
static INT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?[0-9]+)").expect("integer prefix regex"));

/// Parse one run's log text into its support table and per-test records.
///
/// Recognized lines:
/// MEMORY STAT resident after test: 1048576
/// MEMORY STAT heapAllocated not supported
/// TEST-END | http://mochi.test:8888/a.html | finished in 12ms
///
/// Stats accumulate until the next `TEST-END`, which closes a record. Support
/// is only decided before the first record closes. Lines that don't match are
/// skipped; this never fails.
///
/// Values are read like a lenient parseInt (leading digits of `123abc` give
/// 123). A value that does not fit in `i64` is stored as `None`, a gap, rather
/// than a rounded number.
pub fn parse_run(text: &str) -> RunResult {
    let mut run = RunResult::default();
    let mut current = MemoryMap::new();

    // `lines()` accepts both "\n" and "\r\n" and a missing final separator.
    for line in text.lines() {
        if let Some(i) = line.find(STAT_MARKER) {
            let rest = &line[i + STAT_MARKER.len()..];

            if let Some(j) = rest.find(AFTER_TEST) {
                let name = &rest[..j];
                let value = parse_int_prefix(&rest[j + AFTER_TEST.len()..]);
                current.insert(name.to_string(), value);
                if run.tests.is_empty() {
                    run.support.insert(name.to_string(), true);
                }
            } else if run.tests.is_empty() {
                // Platforms only announce unsupported stats ahead of the first test.
                if let Some(j) = rest.find(NOT_SUPPORTED) {
                    run.support.insert(rest[..j].to_string(), false);
                }
            }
        } else if let Some(i) = line.find(TEST_END_MARKER) {
            let rest = &line[i + TEST_END_MARKER.len()..];
            let Some(j) = rest.find(TEST_END_DELIM) else {
                continue;
            };
            run.tests.push(TestRecord {
                identifier: rest[..j].to_string(),
                memory: std::mem::take(&mut current),
            });
        }
    }

    run
}

/// `None` when no leading integer is present or it overflows.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let caps = INT_PREFIX.captures(s)?;
    caps.get(1)?.as_str().parse().ok()
}

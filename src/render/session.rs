//! Chart session: everything the page needs, owned in one place.

use crate::model::AlignedDataset;
use crate::query::LogQuery;
use crate::render::format::format_bytes;
use serde::Serialize;

// Color wheel; a series keeps its color as long as its label seed is stable.
const PALETTE: [&str; 8] = [
    "#b5b6a9", "#858772", "#785f43", "#96557e", "#4682b4", "#65b9ac", "#73c03a", "#cb513a",
];

const Y_TICKS: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub x: usize,
    pub y: Option<i64>,
    /// Formatted hover value, "N/A" for gaps.
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub color: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tick {
    pub value: i64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogInputs {
    pub first: Option<String>,
    pub additional: Vec<String>,
    pub search: String,
}

/// Serialized payload embedded in the HTML page.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub title: String,
    /// X axis labels: reference test identifiers.
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    pub y_ticks: Vec<Tick>,
    pub inputs: LogInputs,
}

/// One reconciled comparison, handed to a renderer.
#[derive(Debug, Clone)]
pub struct ChartSession {
    title: String,
    query: LogQuery,
    dataset: AlignedDataset,
}

impl ChartSession {
    pub fn new(title: impl Into<String>, query: LogQuery, dataset: AlignedDataset) -> Self {
        Self {
            title: title.into(),
            query,
            dataset,
        }
    }

    pub fn dataset(&self) -> &AlignedDataset {
        &self.dataset
    }

    /// `"<run>:<instrument>"` when comparing runs, the bare instrument otherwise.
    ///
    /// `run` is the input index, not the position after sorting by length.
    pub fn series_label(&self, run: usize, instrument: &str) -> String {
        if self.dataset.run_count > 1 {
            format!("{}:{}", run, instrument)
        } else {
            instrument.to_string()
        }
    }

    pub fn chart_data(&self) -> ChartData {
        let mut series = Vec::new();
        for aligned in &self.dataset.series {
            for run_series in &aligned.per_run {
                series.push(ChartSeries {
                    name: self.series_label(run_series.run, &aligned.instrument),
                    color: series_color(run_series.run, &aligned.instrument).to_string(),
                    points: run_series
                        .points
                        .iter()
                        .map(|p| ChartPoint {
                            x: p.position,
                            y: p.value,
                            label: p.value.map_or_else(|| "N/A".to_string(), format_bytes),
                        })
                        .collect(),
                });
            }
        }

        let max = series
            .iter()
            .flat_map(|s| s.points.iter().filter_map(|p| p.y))
            .max()
            .unwrap_or(0)
            .max(0);

        ChartData {
            title: self.title.clone(),
            labels: self.dataset.identifiers.clone(),
            y_ticks: y_ticks(max),
            series,
            inputs: LogInputs {
                first: self.query.first().map(str::to_string),
                additional: self.query.additional().to_vec(),
                search: self.query.to_search(),
            },
        }
    }
}

fn series_color(run: usize, instrument: &str) -> &'static str {
    let seed = format!("{}{}", run, instrument);
    let hash: usize = seed.chars().map(|c| c as usize).sum();
    PALETTE[hash % PALETTE.len()]
}

fn y_ticks(max: i64) -> Vec<Tick> {
    if max == 0 {
        return Vec::new();
    }
    (0..=Y_TICKS as i64)
        .map(|i| {
            // Widen so values near i64::MAX don't overflow before dividing.
            let value = (i128::from(max) * i128::from(i) / Y_TICKS as i128) as i64;
            Tick {
                value,
                label: format_bytes(value),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::parse_run;
    use crate::model::reconcile;
    use pretty_assertions::assert_eq;

    fn session(texts: &[&str]) -> ChartSession {
        let runs: Vec<_> = texts.iter().map(|t| parse_run(t)).collect();
        let dataset = reconcile(&runs).unwrap();
        let query = LogQuery::from_urls(texts.iter().enumerate().map(|(i, _)| format!("run{i}.log")))
            .unwrap();
        ChartSession::new("memory", query, dataset)
    }

    const RUN: &str = "MEMORY STAT resident after test: 1048576\n\
                       TEST-END | http://a/ | OK\n\
                       MEMORY STAT resident after test: 2097152\n\
                       TEST-END | http://b/ | OK\n";

    #[test]
    fn single_run_uses_bare_instrument_names() {
        let data = session(&[RUN]).chart_data();

        assert_eq!(data.labels, vec!["http://a/", "http://b/"]);
        assert_eq!(data.series.len(), 1);
        assert_eq!(data.series[0].name, "resident");
        assert_eq!(data.series[0].points[0].label, "1.00 MB");
        assert_eq!(data.series[0].points[1].label, "2.00 MB");
        assert_eq!(data.inputs.first.as_deref(), Some("run0.log"));
        assert!(data.inputs.additional.is_empty());
    }

    #[test]
    fn multiple_runs_are_prefixed_and_gaps_are_na() {
        let short = "MEMORY STAT resident after test: 1048576\nTEST-END | http://a/ | OK\n";
        let data = session(&[short, RUN]).chart_data();

        let names: Vec<&str> = data.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["1:resident", "0:resident"]);
        assert_eq!(data.series[1].points[1].y, None);
        assert_eq!(data.series[1].points[1].label, "N/A");
        assert_eq!(data.inputs.additional, vec!["run1.log".to_string()]);
    }

    #[test]
    fn colors_are_stable_per_label_seed() {
        assert_eq!(series_color(0, "resident"), series_color(0, "resident"));
        assert!(PALETTE.contains(&series_color(3, "vsize")));
    }

    #[test]
    fn ticks_span_the_largest_value() {
        let ticks = y_ticks(4 * 1048576);
        let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["", "1.00 MB", "2.00 MB", "3.00 MB", "4.00 MB"]);
        assert!(y_ticks(0).is_empty());
    }

    #[test]
    fn ticks_handle_the_largest_parseable_value() {
        let text = format!("MEMORY STAT resident after test: {}\nTEST-END | a | ok\n", i64::MAX);
        let dataset = reconcile(&[parse_run(&text)]).unwrap();
        let query = LogQuery::from_urls(["run.log"]).unwrap();

        let data = ChartSession::new("memory", query, dataset).chart_data();

        let values: Vec<i64> = data.y_ticks.iter().map(|t| t.value).collect();
        assert_eq!(values.len(), 5);
        assert_eq!(values[0], 0);
        assert_eq!(values[2], i64::MAX / 2);
        assert_eq!(values[4], i64::MAX);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }
}

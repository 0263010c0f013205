//! Daily health metrics shown on the home dashboard.

use crate::config::StoreConfig;
use crate::resource::{FixtureSource, Record, ResourceStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Steps,
    Sleep,
    Water,
    HeartRate,
    Mood,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: String,
    pub kind: MetricKind,
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub goal: Option<f64>,
}

impl Record for Metric {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

impl Metric {
    /// Fraction of the goal reached, clamped to `0.0..=1.0`.
    pub fn progress(&self) -> Option<f64> {
        self.goal
            .filter(|goal| *goal > 0.0)
            .map(|goal| (self.value / goal).clamp(0.0, 1.0))
    }

    /// Value formatted for display, e.g. `8,432 steps` or `7.5 h`.
    pub fn display_value(&self) -> String {
        match self.kind {
            MetricKind::Steps => format!("{} {}", format_count(self.value), self.unit),
            MetricKind::HeartRate => format!("{:.0} {}", self.value, self.unit),
            MetricKind::Sleep | MetricKind::Water => format!("{:.1} {}", self.value, self.unit),
            MetricKind::Mood => format!("{:.0}/{}", self.value, self.unit),
        }
    }
}

/// Whole count with thousands separators. Values that are not a finite,
/// non-negative count are shown as they are instead of being coerced to zero.
fn format_count(value: f64) -> String {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= 0.0 && rounded <= u64::MAX as f64 {
        group_thousands(rounded as u64)
    } else {
        format!("{value:.0}")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn metric(
    id: &str,
    kind: MetricKind,
    label: &str,
    value: f64,
    unit: &str,
    goal: Option<f64>,
) -> Metric {
    Metric {
        id: id.to_owned(),
        kind,
        label: label.to_owned(),
        value,
        unit: unit.to_owned(),
        goal,
    }
}

/// Sample data served by the fixture source.
pub fn fixtures() -> Vec<Metric> {
    vec![
        metric("steps", MetricKind::Steps, "Steps", 8432.0, "steps", Some(10_000.0)),
        metric("sleep", MetricKind::Sleep, "Sleep", 7.5, "h", Some(8.0)),
        metric("water", MetricKind::Water, "Water", 1.8, "L", Some(2.5)),
        metric("heart-rate", MetricKind::HeartRate, "Resting heart rate", 62.0, "bpm", None),
        metric("mood", MetricKind::Mood, "Mood", 4.0, "5", None),
    ]
}

pub type MetricsStore = ResourceStore<FixtureSource<Metric>>;

/// Metrics store backed by the fixture data.
pub fn metrics_store(config: &StoreConfig) -> MetricsStore {
    let source = FixtureSource::new(fixtures()).with_latency(config.fixture_latency());
    ResourceStore::builder(source).name("metrics").config(config).build()
}

use std::{fmt, io, str::Utf8Error};

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::internal::{render_label_values, MetricUpgrade};

use super::types::{Labels, Timestamp};

/// The type a metric was declared with in a `# TYPE` line.
/// https://prometheus.io/docs/concepts/metric_types/
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MetricType {
    /// No `# TYPE` line was seen, or the type was declared as `untyped`
    #[default]
    Untyped,

    /// A cumulative value that only goes up, or is reset to zero on restart
    Counter,

    /// A single numerical value that can arbitrarily go up and down
    Gauge,

    /// Observations counted into configurable buckets, exposed as
    /// `<name>_bucket{le="..."}`, `<name>_sum` and `<name>_count`
    Histogram,

    /// Observations summarised into quantiles over a sliding window, exposed as
    /// `<name>{quantile="..."}`, `<name>_sum` and `<name>_count`
    Summary,

    /// Any other declared type, kept verbatim
    Other(String),
}

impl MetricType {
    pub fn as_str(&self) -> &str {
        match self {
            MetricType::Untyped => "untyped",
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Histogram => "histogram",
            MetricType::Summary => "summary",
            MetricType::Other(s) => s,
        }
    }
}

impl From<&str> for MetricType {
    fn from(value: &str) -> Self {
        match value {
            "" | "untyped" => MetricType::Untyped,
            "counter" => MetricType::Counter,
            "gauge" => MetricType::Gauge,
            "histogram" => MetricType::Histogram,
            "summary" => MetricType::Summary,
            other => MetricType::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MetricType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single observation: one line of the exposition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    pub labels: Labels,
    pub value: f64,
    pub timestamp: Timestamp,
}

impl Sample {
    pub fn new(name: String, labels: Labels, value: f64, timestamp: Timestamp) -> Sample {
        Sample {
            name,
            labels,
            value,
            timestamp,
        }
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels: Vec<(&str, &str)> = self
            .labels
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        labels.sort_by_key(|l| l.0);

        write!(f, "{}{} ", self.name, render_label_values(&labels))?;
        render_value(f, self.value)?;
        if self.timestamp != 0 {
            write!(f, " {}", self.timestamp)?;
        }

        Ok(())
    }
}

fn render_value(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        f.write_str("NaN")
    } else if value == f64::INFINITY {
        f.write_str("+Inf")
    } else if value == f64::NEG_INFINITY {
        f.write_str("-Inf")
    } else {
        write!(f, "{}", value)
    }
}

/// A named, typed group of samples. Sample names share the metric name as a
/// prefix, e.g. `http_request_duration_seconds_bucket` belongs to
/// `http_request_duration_seconds`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Metric {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub samples: Vec<Sample>,
}

impl Metric {
    pub fn new(name: String) -> Metric {
        Metric {
            name,
            ..Default::default()
        }
    }

    /// All samples called exactly `name`, in the order they appeared
    pub fn find_samples<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Sample> + 'a {
        self.samples.iter().filter(move |s| s.name == name)
    }

    /// Reinterprets this metric as a richer shape, e.g. `metric.upgrade::<HistogramMetric>()`
    pub fn upgrade<T: MetricUpgrade>(&self) -> Result<T, UpgradeError> {
        T::upgrade(self)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.description.is_empty() {
            writeln!(f, "# HELP {} {}", self.name, self.description)?;
        }

        if self.metric_type != MetricType::Untyped {
            writeln!(f, "# TYPE {} {}", self.name, self.metric_type)?;
        }

        for sample in self.samples.iter() {
            writeln!(f, "{}", sample)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub upper_bound: f64,
    /// Cumulative count of observations less than or equal to `upper_bound`
    pub count: f64,
}

/// A histogram rebuilt from the `_bucket`, `_sum` and `_count` samples of a
/// [`Metric`]. Buckets keep the order they appeared in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramMetric {
    pub metric: Metric,
    pub buckets: Vec<HistogramBucket>,
    pub sum: f64,
    pub count: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quantile {
    pub quantile: f64,
    pub value: f64,
}

/// A summary rebuilt from the quantile, `_sum` and `_count` samples of a [`Metric`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetric {
    pub metric: Metric,
    pub quantiles: Vec<Quantile>,
    pub sum: f64,
    pub count: f64,
}

/// Parsed metrics split up by their declared type, with histograms and
/// summaries already upgraded. Each collection keeps appearance order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsExposition {
    pub counters: Vec<Metric>,
    pub gauges: Vec<Metric>,
    pub untyped: Vec<Metric>,
    pub histograms: Vec<HistogramMetric>,
    pub summaries: Vec<SummaryMetric>,
    pub other: Vec<Metric>,
}

impl MetricsExposition {
    pub fn new() -> MetricsExposition {
        Self::default()
    }

    pub fn from_metrics(metrics: Vec<Metric>) -> Result<MetricsExposition, UpgradeError> {
        let mut exposition = MetricsExposition::new();

        for metric in metrics.into_iter() {
            match metric.metric_type {
                MetricType::Counter => exposition.counters.push(metric),
                MetricType::Gauge => exposition.gauges.push(metric),
                MetricType::Untyped => exposition.untyped.push(metric),
                MetricType::Histogram => exposition.histograms.push(metric.upgrade()?),
                MetricType::Summary => exposition.summaries.push(metric.upgrade()?),
                MetricType::Other(_) => exposition.other.push(metric),
            }
        }

        Ok(exposition)
    }

    pub fn len(&self) -> usize {
        self.counters.len()
            + self.gauges.len()
            + self.untyped.len()
            + self.histograms.len()
            + self.summaries.len()
            + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("missing metric name")]
    MissingMetricName,
    #[error("missing metric type")]
    MissingType,
    #[error("missing sample value")]
    MissingValue,
    #[error("invalid float64 value `{0}`")]
    InvalidValue(String),
    #[error("invalid int64 timestamp `{0}`")]
    InvalidTimestamp(String),
    #[error("{0}")]
    Grammar(String),
}

/// A malformed line. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to parse line {line}: {kind}")]
pub struct ParseError {
    /// 0-based line number in the input
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> ParseError {
        ParseError { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpgradeError {
    #[error("metric {name} is a {found}, not a {expected}")]
    WrongType {
        name: String,
        expected: MetricType,
        found: MetricType,
    },
    #[error("metric {0} has no sum sample")]
    MissingSum(String),
    #[error("metric {0} has {1} sum samples")]
    DuplicateSum(String, usize),
    #[error("metric {0} has no count sample")]
    MissingCount(String),
    #[error("metric {0} has {1} count samples")]
    DuplicateCount(String, usize),
    #[error("invalid le label in {name}: {value:?}")]
    InvalidBound { name: String, value: Option<String> },
    #[error("invalid quantile label in {name}: {value:?}")]
    InvalidQuantile { name: String, value: Option<String> },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("unexpected HTTP status code {0}")]
    UnexpectedStatusCode(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("exposition is not valid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Upgrade(#[from] UpgradeError),
}

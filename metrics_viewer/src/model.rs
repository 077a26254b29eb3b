//! The in-memory metric model
//!
//! A [`Sample`] is one exposed measurement, a [`MetricFamily`] groups every
//! sample sharing a name and a [`Snapshot`] is one polling cycle's aggregated
//! result. Every type here renders back to the exposition text format through
//! `Display`.

use std::{
    collections::BTreeSet,
    fmt,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

/// Errors produced when building a [`LabelSet`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// The same label name appeared twice
    #[error("duplicate label name: {0}")]
    Duplicate(String),
    /// A label had an empty name
    #[error("empty label name")]
    EmptyName,
}

/// Errors produced when reading a [`MetricType`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown metric type: {0}")]
pub struct UnknownMetricType(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Metric types declared by `# TYPE` lines
pub enum MetricType {
    /// A value that can arbitrarily go up and down
    Gauge,
    /// A monotonically increasing value
    Counter,
    /// Observations counted into configurable buckets
    Histogram,
    /// A histogram whose buckets may go down
    GaugeHistogram,
    /// Observations summarized into quantiles
    Summary,
    /// A set of boolean states
    StateSet,
    /// Constant textual information
    Info,
    /// No type information, `untyped` in the Prometheus dialect
    Unknown,
}

impl MetricType {
    /// The keyword used for this type in a `# TYPE` line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gauge => "gauge",
            Self::Counter => "counter",
            Self::Histogram => "histogram",
            Self::GaugeHistogram => "gaugehistogram",
            Self::Summary => "summary",
            Self::StateSet => "stateset",
            Self::Info => "info",
            Self::Unknown => "unknown",
        }
    }

    /// Suffixes of the derived families a type declaration also covers
    #[must_use]
    pub fn derived_suffixes(self) -> &'static [&'static str] {
        match self {
            Self::Histogram | Self::GaugeHistogram => &["_bucket", "_sum", "_count", "_created"],
            Self::Summary => &["_sum", "_count", "_created"],
            Self::Counter => &["_total", "_created"],
            _ => &[],
        }
    }
}

impl FromStr for MetricType {
    type Err = UnknownMetricType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counter" => Ok(Self::Counter),
            "gauge" => Ok(Self::Gauge),
            "histogram" => Ok(Self::Histogram),
            "gaugehistogram" => Ok(Self::GaugeHistogram),
            "summary" => Ok(Self::Summary),
            "stateset" => Ok(Self::StateSet),
            "info" => Ok(Self::Info),
            "unknown" | "untyped" => Ok(Self::Unknown),
            _ => Err(UnknownMetricType(s.to_string())),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of labels attached to a [`Sample`]
///
/// Pairs are kept sorted by name and names are unique, so equality, ordering
/// and hashing do not depend on the order labels were written in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelSet {
    pairs: Vec<(String, String)>,
}

impl LabelSet {
    /// Create an empty [`LabelSet`]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a [`LabelSet`] from `(name, value)` pairs in any order
    ///
    /// # Errors
    ///
    /// Returns an error if a name is empty or appears more than once.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut pairs: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if pairs.iter().any(|(name, _)| name.is_empty()) {
            return Err(LabelError::EmptyName);
        }
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some(dup) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(LabelError::Duplicate(dup[0].0.clone()));
        }
        Ok(Self { pairs })
    }

    /// Look up the value of label `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .binary_search_by(|(k, _)| k.as_str().cmp(name))
            .ok()
            .map(|idx| self.pairs[idx].1.as_str())
    }

    /// Number of labels in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the set holds no labels
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate `(name, value)` pairs sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate label names sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    /// A copy of this set holding only the labels for which `keep` is true
    #[must_use]
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&str) -> bool,
    {
        Self {
            pairs: self
                .pairs
                .iter()
                .filter(|(k, _)| keep(k))
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pairs.is_empty() {
            return Ok(());
        }
        f.write_str("{")?;
        for (idx, (name, value)) in self.pairs.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{name}=\"{}\"", escape(value, true))?;
        }
        f.write_str("}")
    }
}

fn escape(s: &str, quote: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '"' if quote => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() && value.is_sign_positive() {
        "+Inf".to_string()
    } else if value.is_infinite() {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One exposed measurement
pub struct Sample {
    /// The metric name, never empty
    pub name: String,
    /// The labels of this sample
    pub labels: LabelSet,
    /// The sample value
    pub value: f64,
    /// Optional timestamp in milliseconds since Unix epoch
    pub timestamp: Option<i64>,
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", self.name, self.labels, format_value(self.value))?;
        if let Some(ts) = self.timestamp {
            write!(f, " {ts}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Every sample sharing one metric name, in exposition order
pub struct MetricFamily {
    /// The name shared by all `samples`
    pub name: String,
    /// The type declared for this family, if any
    pub metric_type: Option<MetricType>,
    /// The help text declared for this family, if any
    pub help: Option<String>,
    /// The samples of this family
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    /// Create an empty family named `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metric_type: None,
            help: None,
            samples: Vec::new(),
        }
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(help) = &self.help {
            writeln!(f, "# HELP {} {}", self.name, escape(help, false))?;
        }
        if let Some(metric_type) = self.metric_type {
            writeln!(f, "# TYPE {} {metric_type}", self.name)?;
        }
        for sample in &self.samples {
            writeln!(f, "{sample}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One polling cycle's filtered and aggregated result
pub struct Snapshot {
    /// Cycle number, starting at 1
    pub cycle: u64,
    /// When the cycle's data was fetched
    pub timestamp: SystemTime,
    /// Aggregated families in exposition order
    pub families: Vec<MetricFamily>,
    /// Label names that were configured to be ignored and actually seen
    pub ignored_labels: BTreeSet<String>,
}

impl Snapshot {
    /// Look up a family by name
    #[must_use]
    pub fn family(&self, name: &str) -> Option<&MetricFamily> {
        self.families.iter().find(|family| family.name == name)
    }

    /// Total number of samples across all families
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.families.iter().map(|family| family.samples.len()).sum()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        let ignored: Vec<&str> = self.ignored_labels.iter().map(String::as_str).collect();
        writeln!(
            f,
            "# cycle {} at {millis} ignoring [{}]",
            self.cycle,
            ignored.join(",")
        )?;
        for family in &self.families {
            write!(f, "{family}")?;
        }
        Ok(())
    }
}

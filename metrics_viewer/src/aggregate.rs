//! Label based aggregation
//!
//! Samples of a family that are identical once the ignored labels are
//! removed collapse into one sample whose value is the sum of theirs. The
//! labels that were configured to be ignored and did show up in the input are
//! reported back so callers can tell a no-op configuration from a real one.

use std::{collections::BTreeSet, convert::Infallible, fmt, str::FromStr};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use crate::model::{LabelSet, MetricFamily, Sample};

/// Label names ignored by default
pub const DEFAULT_IGNORE_LABELS: &str = "start,end,status";

/// The label names to drop from the aggregation key
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum IgnoreSet {
    /// Ignore exactly these names
    Labels(BTreeSet<String>),
    /// Ignore every label, one sample per family remains. Written `ALL`.
    All,
    /// Ignore nothing, aggregation passes samples through. Written `NONE`.
    Nothing,
}

impl IgnoreSet {
    /// Whether label `name` is dropped from the aggregation key
    #[must_use]
    pub fn ignores(&self, name: &str) -> bool {
        match self {
            Self::Labels(names) => names.contains(name),
            Self::All => true,
            Self::Nothing => false,
        }
    }

    /// The aggregation key of a sample with `labels`
    #[must_use]
    pub fn key(&self, labels: &LabelSet) -> LabelSet {
        match self {
            Self::Labels(_) => labels.filtered(|name| !self.ignores(name)),
            Self::All => LabelSet::new(),
            Self::Nothing => labels.clone(),
        }
    }

    /// Explicitly configured names that are absent from `ignored`
    #[must_use]
    pub fn unused<'a>(&'a self, ignored: &BTreeSet<String>) -> Vec<&'a str> {
        match self {
            Self::Labels(names) => names
                .iter()
                .filter(|name| !ignored.contains(*name))
                .map(String::as_str)
                .collect(),
            Self::All | Self::Nothing => Vec::new(),
        }
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        DEFAULT_IGNORE_LABELS
            .parse()
            .unwrap_or(Self::Labels(BTreeSet::new()))
    }
}

impl FromStr for IgnoreSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "ALL" => Self::All,
            "NONE" => Self::Nothing,
            list => Self::Labels(
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        })
    }
}

impl TryFrom<String> for IgnoreSet {
    type Error = Infallible;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for IgnoreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Labels(names) => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                f.write_str(&names.join(","))
            }
            Self::All => f.write_str("ALL"),
            Self::Nothing => f.write_str("NONE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// The output of [`aggregate`]
pub struct Aggregated {
    /// Aggregated families, in input order
    pub families: Vec<MetricFamily>,
    /// Configured ignore labels that appeared in the input
    pub ignored: BTreeSet<String>,
}

/// Collapse samples that share an aggregation key, summing their values
///
/// Output families keep their input order and the samples of a family are
/// ordered by the first occurrence of their group. A group's timestamp is the
/// latest of its members'.
#[must_use]
pub fn aggregate(families: Vec<MetricFamily>, ignore: &IgnoreSet) -> Aggregated {
    let ignored = actually_ignored(&families, ignore);

    if *ignore == IgnoreSet::Nothing {
        return Aggregated { families, ignored };
    }

    let families = families
        .into_iter()
        .map(|family| aggregate_family(family, ignore))
        .collect();

    Aggregated { families, ignored }
}

fn aggregate_family(family: MetricFamily, ignore: &IgnoreSet) -> MetricFamily {
    let mut groups: FxHashMap<LabelSet, usize> = FxHashMap::default();
    let mut samples: Vec<Sample> = Vec::new();

    for sample in family.samples {
        let key = ignore.key(&sample.labels);
        if let Some(&pos) = groups.get(&key) {
            let group = &mut samples[pos];
            group.value += sample.value;
            group.timestamp = match (group.timestamp, sample.timestamp) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
        } else {
            groups.insert(key.clone(), samples.len());
            samples.push(Sample {
                name: sample.name,
                labels: key,
                value: sample.value,
                timestamp: sample.timestamp,
            });
        }
    }

    MetricFamily { samples, ..family }
}

fn actually_ignored(families: &[MetricFamily], ignore: &IgnoreSet) -> BTreeSet<String> {
    if *ignore == IgnoreSet::Nothing {
        return BTreeSet::new();
    }
    let observed: FxHashSet<&str> = families
        .iter()
        .flat_map(|family| family.samples.iter())
        .flat_map(|sample| sample.labels.names())
        .collect();
    observed
        .into_iter()
        .filter(|name| ignore.ignores(name))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use proptest::prelude::*;

    fn families(text: &str) -> Vec<MetricFamily> {
        let parsed = parse(text);
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        parsed.families
    }

    fn ignore(list: &str) -> IgnoreSet {
        list.parse().unwrap()
    }

    const REQUESTS: &str = r#"
http_requests_total{path="/a",status="200",start="1"} 3
http_requests_total{path="/b",status="200",start="1"} 4
http_requests_total{path="/a",status="500",start="2"} 5
http_requests_total{path="/b",status="404",start="3"} 6
cpu_usage{host="x"} 1.5
"#;

    #[test]
    fn ignore_set_parsing() {
        assert_eq!(ignore("ALL"), IgnoreSet::All);
        assert_eq!(ignore(" NONE "), IgnoreSet::Nothing);
        assert_eq!(
            ignore("start, end,,status"),
            IgnoreSet::Labels(["end", "start", "status"].map(String::from).into())
        );
        assert_eq!(ignore(""), IgnoreSet::Labels(BTreeSet::new()));
        assert_eq!(IgnoreSet::default(), ignore(DEFAULT_IGNORE_LABELS));
        assert_eq!(IgnoreSet::default().to_string(), "end,start,status");
    }

    #[test]
    fn explicit_labels_collapse_and_sum() {
        let out = aggregate(families(REQUESTS), &ignore("status,start"));

        let requests = &out.families[0];
        assert_eq!(requests.samples.len(), 2);
        assert_eq!(requests.samples[0].labels.get("path"), Some("/a"));
        assert_eq!(requests.samples[0].labels.len(), 1);
        assert_eq!(requests.samples[0].value, 8.0);
        assert_eq!(requests.samples[1].labels.get("path"), Some("/b"));
        assert_eq!(requests.samples[1].value, 10.0);

        assert_eq!(out.families[1].samples[0].value, 1.5);
        assert_eq!(out.ignored, BTreeSet::from(["start", "status"].map(String::from)));
    }

    #[test]
    fn nothing_is_identity() {
        let input = families(REQUESTS);
        let out = aggregate(input.clone(), &IgnoreSet::Nothing);
        assert_eq!(out.families, input);
        assert!(out.ignored.is_empty());
    }

    #[test]
    fn nothing_keeps_duplicate_samples_apart() {
        let input = families("up 1\nup 1\n");
        let out = aggregate(input, &IgnoreSet::Nothing);
        assert_eq!(out.families[0].samples.len(), 2);
    }

    #[test]
    fn all_collapses_to_one_sample_per_family() {
        let out = aggregate(families(REQUESTS), &IgnoreSet::All);

        assert_eq!(out.families.len(), 2);
        assert_eq!(out.families[0].samples.len(), 1);
        assert!(out.families[0].samples[0].labels.is_empty());
        assert_eq!(out.families[0].samples[0].value, 18.0);
        assert_eq!(out.families[1].samples.len(), 1);
        assert_eq!(
            out.ignored,
            BTreeSet::from(["host", "path", "start", "status"].map(String::from))
        );
    }

    #[test]
    fn reports_only_labels_that_appeared() {
        let input = families("m{host=\"a\",pod=\"p1\"} 1\nm{host=\"a\",pod=\"p2\"} 2\n");
        let config = ignore("status,pod");
        let out = aggregate(input, &config);

        assert_eq!(out.ignored, BTreeSet::from(["pod".to_string()]));
        assert_eq!(config.unused(&out.ignored), vec!["status"]);
        assert_eq!(out.families[0].samples.len(), 1);
        assert_eq!(out.families[0].samples[0].value, 3.0);
    }

    #[test]
    fn nan_propagates() {
        let out = aggregate(families("m{a=\"1\"} 1\nm{a=\"2\"} NaN\n"), &IgnoreSet::All);
        assert!(out.families[0].samples[0].value.is_nan());
    }

    #[test]
    fn group_timestamp_is_latest() {
        let out = aggregate(
            families("m{a=\"1\"} 1 100\nm{a=\"2\"} 1 300\nm{a=\"3\"} 1\n"),
            &IgnoreSet::All,
        );
        assert_eq!(out.families[0].samples[0].timestamp, Some(300));
    }

    #[test]
    fn metadata_survives_aggregation() {
        let out = aggregate(
            families("# TYPE m counter\n# HELP m Things.\nm{a=\"1\"} 1\n"),
            &IgnoreSet::All,
        );
        assert_eq!(out.families[0].help.as_deref(), Some("Things."));
        assert!(out.families[0].metric_type.is_some());
    }

    fn sample_strategy() -> impl Strategy<Value = Sample> {
        (
            prop::sample::select(vec!["a", "b", "c"]),
            prop::sample::select(vec!["x", "y"]),
            prop::option::of(prop::sample::select(vec!["200", "500"])),
            -1000i32..1000,
        )
            .prop_map(|(host, pod, status, value)| {
                let mut pairs = vec![("host", host), ("pod", pod)];
                if let Some(status) = status {
                    pairs.push(("status", status));
                }
                Sample {
                    name: "m".to_string(),
                    labels: LabelSet::from_pairs(pairs).unwrap(),
                    value: f64::from(value),
                    timestamp: None,
                }
            })
    }

    fn ignore_strategy() -> impl Strategy<Value = IgnoreSet> {
        prop::sample::select(vec!["ALL", "NONE", "status", "pod,status", "host", ""])
            .prop_map(|s| s.parse::<IgnoreSet>().unwrap())
    }

    fn family_of(samples: Vec<Sample>) -> Vec<MetricFamily> {
        let mut family = MetricFamily::new("m");
        family.samples = samples;
        vec![family]
    }

    proptest! {
        #[test]
        fn prop_aggregation_is_a_fixed_point(
            samples in prop::collection::vec(sample_strategy(), 0..30),
            ignore in ignore_strategy(),
        ) {
            let once = aggregate(family_of(samples), &ignore);
            let twice = aggregate(once.families.clone(), &ignore);
            prop_assert_eq!(once.families, twice.families);
        }

        #[test]
        fn prop_all_sums_everything(
            samples in prop::collection::vec(sample_strategy(), 1..30),
        ) {
            let expected: f64 = samples.iter().map(|s| s.value).sum();
            let out = aggregate(family_of(samples), &IgnoreSet::All);
            prop_assert_eq!(out.families[0].samples.len(), 1);
            prop_assert_eq!(out.families[0].samples[0].value, expected);
        }

        #[test]
        fn prop_grouping_ignores_input_order(
            samples in prop::collection::vec(sample_strategy(), 0..30),
            ignore in ignore_strategy(),
        ) {
            let mut reversed = samples.clone();
            reversed.reverse();

            let sorted = |families: Vec<MetricFamily>| {
                let mut samples: Vec<(LabelSet, i64)> = families
                    .into_iter()
                    .flat_map(|family| family.samples)
                    .map(|sample| (sample.labels, sample.value as i64))
                    .collect();
                samples.sort();
                samples
            };

            let forward = aggregate(family_of(samples), &ignore);
            let backward = aggregate(family_of(reversed), &ignore);
            prop_assert_eq!(sorted(forward.families), sorted(backward.families));
            prop_assert_eq!(forward.ignored, backward.ignored);
        }
    }
}

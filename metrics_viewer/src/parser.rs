//! OpenMetrics / Prometheus text format parser
//!
//! This module provides a parser for the text exposition format.
//! <https://github.com/prometheus/docs/blob/main/content/docs/instrumenting/exposition_formats.md>
//!
//! Parsing never fails as a whole. A line that cannot be understood becomes a
//! [`Warning`] and is skipped, the remaining lines are still parsed.

use rustc_hash::FxHashMap;

use crate::model::{LabelError, LabelSet, MetricFamily, MetricType, Sample, UnknownMetricType};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
/// Errors that can occur while parsing a single line
pub enum ParseError {
    /// Unknown metric type in TYPE line
    #[error(transparent)]
    UnknownMetricType(#[from] UnknownMetricType),
    /// Invalid format in the line
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    /// Invalid value that cannot be parsed as a number
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Invalid timestamp that cannot be parsed as an integer
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Missing value in metric line
    #[error("missing value")]
    MissingValue,
    /// Missing name in metric line
    #[error("missing metric name")]
    MissingName,
    /// Metric name with characters outside `[a-zA-Z_:][a-zA-Z0-9_:]*`
    #[error("invalid metric name: {0}")]
    InvalidName(String),
    /// Invalid label format
    #[error("invalid label: {0}")]
    InvalidLabel(String),
    /// Label set could not be built
    #[error(transparent)]
    Label(#[from] LabelError),
}

#[derive(Debug, Clone, PartialEq)]
/// A non-fatal problem found while parsing
pub struct Warning {
    /// 1-based line number of the offending line
    pub line: usize,
    /// What went wrong
    pub error: ParseError,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// The result of parsing one exposition text
pub struct Parsed {
    /// Families in first-seen order
    pub families: Vec<MetricFamily>,
    /// Lines that were skipped, in input order
    pub warnings: Vec<Warning>,
}

/// Parse `text` into families and warnings with a fresh [`Parser`]
#[must_use]
pub fn parse(text: &str) -> Parsed {
    Parser::new().parse_text(text)
}

#[derive(Debug, Default)]
/// Parser for the text exposition format
///
/// The parser remembers `# TYPE` and `# HELP` metadata across the lines of
/// one text so it can be attached to the families it belongs to.
pub struct Parser {
    typemap: FxHashMap<String, MetricType>,
    helpmap: FxHashMap<String, String>,
}

/// One parsed line
#[derive(Debug, PartialEq)]
enum Line {
    Sample(Sample),
    Metadata,
}

impl Parser {
    /// Create a new parser instance
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a complete exposition text
    pub fn parse_text(&mut self, text: &str) -> Parsed {
        let mut parsed = Parsed::default();
        let mut index: FxHashMap<String, usize> = FxHashMap::default();

        for (idx, line) in text.lines().enumerate() {
            match self.parse_line(line) {
                Ok(Line::Metadata) => {}
                Ok(Line::Sample(sample)) => {
                    let pos = if let Some(pos) = index.get(&sample.name) {
                        *pos
                    } else {
                        parsed.families.push(MetricFamily::new(sample.name.clone()));
                        index.insert(sample.name.clone(), parsed.families.len() - 1);
                        parsed.families.len() - 1
                    };
                    parsed.families[pos].samples.push(sample);
                }
                Err(error) => parsed.warnings.push(Warning {
                    line: idx + 1,
                    error,
                }),
            }
        }

        // Metadata may trail the samples it describes, attach once at the end.
        for family in &mut parsed.families {
            family.metric_type = self.typemap.get(&family.name).copied();
            family.help = self.helpmap.get(&family.name).cloned();
        }

        parsed
    }

    fn parse_line(&mut self, line: &str) -> Result<Line, ParseError> {
        let line = line.trim();

        if line.is_empty() {
            return Ok(Line::Metadata);
        }

        if let Some(comment) = line.strip_prefix('#') {
            let comment = comment.trim_start();
            if let Some(rest) = comment.strip_prefix("TYPE ") {
                self.parse_type_line(rest)?;
            } else if let Some(rest) = comment.strip_prefix("HELP ") {
                self.parse_help_line(rest)?;
            }
            return Ok(Line::Metadata);
        }

        Self::parse_metric_line(line).map(Line::Sample)
    }

    fn parse_type_line(&mut self, rest: &str) -> Result<(), ParseError> {
        let mut parts = rest.split_ascii_whitespace();

        let name = parts.next().ok_or_else(|| {
            ParseError::InvalidFormat("Missing metric name in TYPE line".to_string())
        })?;

        let metric_type_str = parts.next().ok_or_else(|| {
            ParseError::InvalidFormat("Missing metric type in TYPE line".to_string())
        })?;

        let metric_type: MetricType = metric_type_str.parse()?;

        for suffix in metric_type.derived_suffixes() {
            self.typemap
                .entry(format!("{name}{suffix}"))
                .or_insert(metric_type);
        }

        self.typemap.insert(name.to_owned(), metric_type);
        Ok(())
    }

    fn parse_help_line(&mut self, rest: &str) -> Result<(), ParseError> {
        let (name, text) = rest.split_once(' ').unwrap_or((rest, ""));
        if name.is_empty() {
            return Err(ParseError::InvalidFormat(
                "Missing metric name in HELP line".to_string(),
            ));
        }
        self.helpmap.insert(name.to_owned(), unescape_help(text.trim()));
        Ok(())
    }

    fn parse_metric_line(line: &str) -> Result<Sample, ParseError> {
        let name_end = line
            .find(|c: char| c == '{' || c.is_whitespace())
            .unwrap_or(line.len());
        let name = &line[..name_end];
        if name.is_empty() {
            return Err(ParseError::MissingName);
        }
        if !is_valid_metric_name(name) {
            return Err(ParseError::InvalidName(name.to_string()));
        }

        let rest = &line[name_end..];
        let (labels, rest) = if let Some(block) = rest.strip_prefix('{') {
            let (pairs, consumed) = Self::parse_labels(block)?;
            (LabelSet::from_pairs(pairs)?, &block[consumed..])
        } else {
            (LabelSet::new(), rest)
        };

        let (value, timestamp) = Self::parse_value_and_timestamp(rest)?;

        Ok(Sample {
            name: name.to_string(),
            labels,
            value,
            timestamp,
        })
    }

    /// Parse the inside of a `{...}` block. Returns the label pairs and the
    /// number of bytes consumed including the closing brace.
    fn parse_labels(block: &str) -> Result<(Vec<(String, String)>, usize), ParseError> {
        let mut labels = Vec::new();
        let mut chars = block.char_indices().peekable();

        loop {
            while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

            match chars.peek() {
                None => {
                    return Err(ParseError::InvalidFormat(
                        "Unclosed labels bracket".to_string(),
                    ));
                }
                Some(&(idx, '}')) => return Ok((labels, idx + 1)),
                Some(_) => {}
            }

            let mut label_name = String::new();
            while let Some((_, c)) =
                chars.next_if(|(_, c)| *c != '=' && *c != '}' && *c != ',' && !c.is_whitespace())
            {
                label_name.push(c);
            }
            if label_name.is_empty() {
                return Err(ParseError::InvalidLabel("Empty label key".to_string()));
            }

            while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
            if chars.next_if(|(_, c)| *c == '=').is_none() {
                return Err(ParseError::InvalidLabel(format!(
                    "Label missing '=': {label_name}"
                )));
            }
            while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
            if chars.next_if(|(_, c)| *c == '"').is_none() {
                return Err(ParseError::InvalidLabel(
                    "Label value must be quoted".to_string(),
                ));
            }

            let mut value = String::new();
            loop {
                match chars.next() {
                    Some((_, '\\')) => match chars.next() {
                        Some((_, '\\')) => value.push('\\'),
                        Some((_, '"')) => value.push('"'),
                        Some((_, 'n')) => value.push('\n'),
                        Some((_, c)) => {
                            return Err(ParseError::InvalidLabel(format!(
                                "Invalid escape sequence: \\{c}"
                            )));
                        }
                        None => {
                            return Err(ParseError::InvalidLabel(
                                "Backslash at end of label value".to_string(),
                            ));
                        }
                    },
                    Some((_, '"')) => break,
                    Some((_, c)) => value.push(c),
                    None => {
                        return Err(ParseError::InvalidLabel(
                            "Label value quotes not properly paired".to_string(),
                        ));
                    }
                }
            }
            labels.push((label_name, value));

            while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
            match chars.peek() {
                Some(&(_, ',')) => {
                    chars.next();
                }
                Some(&(_, '}')) => {}
                Some(&(_, c)) => {
                    return Err(ParseError::InvalidLabel(format!(
                        "Unexpected character after label value: {c}"
                    )));
                }
                None => {
                    return Err(ParseError::InvalidFormat(
                        "Unclosed labels bracket".to_string(),
                    ));
                }
            }
        }
    }

    fn parse_value_and_timestamp(value_str: &str) -> Result<(f64, Option<i64>), ParseError> {
        let mut parts = value_str.split_whitespace();

        let value_part = parts.next().ok_or(ParseError::MissingValue)?;

        let value = match value_part {
            "NaN" => f64::NAN,
            "+Inf" | "Inf" => f64::INFINITY,
            "-Inf" => f64::NEG_INFINITY,
            _ => value_part
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidValue(value_part.to_string()))?,
        };

        let timestamp = match parts.next() {
            None => None,
            // OpenMetrics exemplar, not part of the sample
            Some("#") => return Ok((value, None)),
            Some(ts_str) => Some(
                parse_timestamp(ts_str)
                    .ok_or_else(|| ParseError::InvalidTimestamp(ts_str.to_string()))?,
            ),
        };

        match parts.next() {
            None | Some("#") => Ok((value, timestamp)),
            Some(extra) => Err(ParseError::InvalidFormat(format!(
                "Unexpected trailing token: {extra}"
            ))),
        }
    }
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// HELP text escapes only `\\` and `\n`, anything else is kept verbatim.
fn unescape_help(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Timestamp in milliseconds since Unix epoch.
///
/// Integers are Prometheus style milliseconds. A fractional or exponent
/// form is OpenMetrics style seconds and is converted.
#[allow(clippy::cast_possible_truncation)]
fn parse_timestamp(token: &str) -> Option<i64> {
    if !token.contains(['.', 'e', 'E']) {
        return token.parse::<i64>().ok();
    }
    let millis = (token.parse::<f64>().ok()? * 1000.0).round();
    (millis.is_finite() && millis >= i64::MIN as f64 && millis < i64::MAX as f64)
        .then_some(millis as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line(input: &str) -> Result<Sample, ParseError> {
        Parser::parse_metric_line(input)
    }

    #[test]
    fn test_parse_type_line() {
        let mut parser = Parser::new();

        assert!(parser.parse_type_line("http_requests_total counter").is_ok());
        assert_eq!(
            parser.typemap.get("http_requests_total"),
            Some(&MetricType::Counter)
        );

        assert!(
            parser
                .parse_type_line("http_request_duration_seconds histogram")
                .is_ok()
        );
        for name in [
            "http_request_duration_seconds",
            "http_request_duration_seconds_sum",
            "http_request_duration_seconds_count",
            "http_request_duration_seconds_bucket",
        ] {
            assert_eq!(parser.typemap.get(name), Some(&MetricType::Histogram));
        }

        assert!(matches!(
            parser.parse_type_line("thing bogus"),
            Err(ParseError::UnknownMetricType(_))
        ));
        assert!(matches!(
            parser.parse_type_line("thing"),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_metric_line_no_labels() {
        let result = line("http_requests_total 1027").unwrap();
        assert_eq!(result.name, "http_requests_total");
        assert_eq!(result.value, 1027.0);
        assert!(result.labels.is_empty());
    }

    #[test]
    fn test_parse_metric_line_with_labels() {
        let result = line("http_requests_total{method=\"GET\",code=\"200\"} 1027").unwrap();
        assert_eq!(result.name, "http_requests_total");
        assert_eq!(result.value, 1027.0);
        assert_eq!(result.labels.get("method"), Some("GET"));
        assert_eq!(result.labels.get("code"), Some("200"));
    }

    #[test]
    fn test_parse_metric_line_with_timestamp() {
        let result = line("http_requests_total 1027 1729113558073").unwrap();
        assert_eq!(result.timestamp, Some(1_729_113_558_073));

        let result = line("http_requests_total 1027").unwrap();
        assert_eq!(result.timestamp, None);

        assert!(matches!(
            line("http_requests_total 1027 soon"),
            Err(ParseError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            line("http_requests_total 1027 1 2"),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_exemplar_is_dropped() {
        let result = line(r#"foo_bucket{le="0.5"} 3 # {trace_id="abc"} 0.4"#).unwrap();
        assert_eq!(result.value, 3.0);
        assert_eq!(result.timestamp, None);
    }

    #[test]
    fn test_parse_invalid_value() {
        assert!(matches!(
            line("http_requests_total foobar"),
            Err(ParseError::InvalidValue(_))
        ));
        assert!(matches!(line("metric"), Err(ParseError::MissingValue)));
    }

    #[test]
    fn test_parse_empty_metric_name() {
        assert!(matches!(line("{}0"), Err(ParseError::MissingName)));
        assert!(matches!(
            line("{label=\"value\"} 1"),
            Err(ParseError::MissingName)
        ));
    }

    #[test]
    fn test_parse_invalid_labels() {
        assert!(matches!(
            line("metric{=\"value\"} 123"),
            Err(ParseError::InvalidLabel(_))
        ));
        assert!(matches!(
            line("metric{key} 123"),
            Err(ParseError::InvalidLabel(_))
        ));
        assert!(matches!(
            line("metric{key=\"a\" 123"),
            Err(ParseError::InvalidLabel(_))
        ));
        assert!(matches!(
            line("metric{key=\"a\","),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            line("metric{key=\"a\",key=\"b\"} 1"),
            Err(ParseError::Label(LabelError::Duplicate(_)))
        ));

        // Empty label value and trailing comma are allowed
        assert!(line("metric{key=\"\"} 123").is_ok());
        assert!(line("metric{key=\"v\",} 123").is_ok());
        assert!(line("metric{} 123").is_ok());
    }

    #[test]
    fn test_label_value_escaping() {
        let result = line(r#"metric{key="value with \"quotes\""} 123"#).unwrap();
        assert_eq!(result.labels.get("key"), Some("value with \"quotes\""));

        let result = line(r#"metric{key="path\\to\\file"} 123"#).unwrap();
        assert_eq!(result.labels.get("key"), Some("path\\to\\file"));

        let result = line(r#"metric{key="line1\nline2"} 123"#).unwrap();
        assert_eq!(result.labels.get("key"), Some("line1\nline2"));

        assert!(matches!(
            line("metric{key=unquoted} 123"),
            Err(ParseError::InvalidLabel(_))
        ));
        assert!(matches!(
            line(r#"metric{key="invalid\x"} 123"#),
            Err(ParseError::InvalidLabel(_))
        ));
        assert!(matches!(
            line(r#"metric{key="} 123"#),
            Err(ParseError::InvalidLabel(_))
        ));
    }

    #[test]
    fn test_label_values_with_separators() {
        let result = line(r#"metric{a="x,y",b="{}",c="1 2"} 4"#).unwrap();
        assert_eq!(result.labels.get("a"), Some("x,y"));
        assert_eq!(result.labels.get("b"), Some("{}"));
        assert_eq!(result.labels.get("c"), Some("1 2"));
        assert_eq!(result.value, 4.0);
    }

    #[test]
    fn test_special_float_values() {
        assert!(line("metric NaN").unwrap().value.is_nan());
        assert_eq!(line("metric +Inf").unwrap().value, f64::INFINITY);
        assert_eq!(line("metric -Inf").unwrap().value, f64::NEG_INFINITY);
        assert_eq!(line("metric 1.23e45").unwrap().value, 1.23e45);
        assert_eq!(line("metric -42.5").unwrap().value, -42.5);
    }

    #[test]
    fn test_parse_full_text() {
        let text = r#"
# HELP http_requests_total The total number of HTTP requests.
# TYPE http_requests_total counter
http_requests_total{method="post",code="200"} 1027 1395066363000
http_requests_total{method="post",code="400"}    3 1395066363000

# TYPE memory_usage gauge
memory_usage 5264384
"#;

        let parsed = parse(text);
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.families.len(), 2);

        let requests = &parsed.families[0];
        assert_eq!(requests.name, "http_requests_total");
        assert_eq!(requests.metric_type, Some(MetricType::Counter));
        assert_eq!(
            requests.help.as_deref(),
            Some("The total number of HTTP requests.")
        );
        assert_eq!(requests.samples.len(), 2);
        assert_eq!(requests.samples[0].value, 1027.0);
        assert_eq!(requests.samples[1].value, 3.0);

        let memory = &parsed.families[1];
        assert_eq!(memory.name, "memory_usage");
        assert_eq!(memory.metric_type, Some(MetricType::Gauge));
        assert_eq!(memory.samples[0].value, 5_264_384.0);
    }

    #[test]
    fn test_bogus_line_is_skipped() {
        let parsed = parse("cpu_usage{host=\"a\"} 42\nBOGUS LINE\nmem_usage 7\n");

        assert_eq!(parsed.families.len(), 2);
        assert_eq!(parsed.families[0].name, "cpu_usage");
        assert_eq!(parsed.families[0].samples.len(), 1);
        assert_eq!(parsed.families[0].samples[0].value, 42.0);
        assert_eq!(parsed.families[1].name, "mem_usage");
        assert_eq!(parsed.families[1].samples[0].value, 7.0);

        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].line, 2);
        assert!(matches!(
            parsed.warnings[0].error,
            ParseError::InvalidValue(_)
        ));
    }

    #[test]
    fn test_families_keep_first_seen_order() {
        let parsed = parse("b 1\na 2\nb 3\nc 4\na 5\n");
        let names: Vec<&str> = parsed.families.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(parsed.families[0].samples.len(), 2);
        assert_eq!(parsed.families[1].samples[1].value, 5.0);
    }

    #[test]
    fn test_empty_and_comment_only_input() {
        assert_eq!(parse(""), Parsed::default());
        let parsed = parse("# just a comment\n\n# EOF\n");
        assert!(parsed.families.is_empty());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_build_info_label_values_keep_spaces() {
        let result = line(
            r#"app_build_info{branch="main",commit="3f2a9c1 2026-03-02 09:14:55",edition="oss",version="7.77.3"} 1 1760000000000"#,
        )
        .unwrap();

        assert_eq!(result.name, "app_build_info");
        assert_eq!(result.labels.len(), 4);
        assert_eq!(
            result.labels.get("commit"),
            Some("3f2a9c1 2026-03-02 09:14:55")
        );
        assert_eq!(result.timestamp, Some(1_760_000_000_000));
    }

    #[test]
    fn test_fractional_timestamp_is_seconds() {
        let parsed = parse("# TYPE up gauge\nup 1 1520879607.789\n# EOF\n");
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        assert_eq!(parsed.families.len(), 1);
        assert_eq!(parsed.families[0].samples[0].timestamp, Some(1_520_879_607_789));

        assert_eq!(line("up 1 1.5e9").unwrap().timestamp, Some(1_500_000_000_000));
        assert_eq!(line("up 1 1395066363000").unwrap().timestamp, Some(1_395_066_363_000));
        assert!(matches!(
            line("up 1 1e400"),
            Err(ParseError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            line("up 1 NaN.0"),
            Err(ParseError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_help_unescapes_in_one_pass() {
        let parsed = parse(
            "# HELP path_bytes Bytes under C:\\\\new\\nSecond line \\d\npath_bytes 1\n",
        );
        assert_eq!(
            parsed.families[0].help.as_deref(),
            Some("Bytes under C:\\new\nSecond line \\d")
        );
    }

    #[test]
    fn test_invalid_metric_name_is_a_warning() {
        assert!(matches!(
            line("bad\u{fffd} 2"),
            Err(ParseError::InvalidName(_))
        ));
        assert!(matches!(line("9lives 1"), Err(ParseError::InvalidName(_))));
        assert!(line("job:requests:rate5m 3").is_ok());

        let parsed = parse("up 1\nbad\u{fffd} 2\nmem 7\n");
        assert_eq!(parsed.families.len(), 2);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].line, 2);
    }

    proptest! {
        #[test]
        fn prop_no_panic_on_any_input(input: String) {
            let _ = parse(&input);
        }

        #[test]
        fn prop_every_line_is_accounted_for(
            lines in prop::collection::vec("[a-z_]{1,8}( [0-9]{1,4}| [a-z]{1,4})", 0..20),
        ) {
            let text = lines.join("\n");
            let parsed = parse(&text);
            let samples: usize = parsed.families.iter().map(|f| f.samples.len()).sum();
            prop_assert_eq!(samples + parsed.warnings.len(), lines.len());
        }

        #[test]
        fn prop_valid_metric_names_accepted(
            name in "[a-zA-Z_:][a-zA-Z0-9_:]*",
            value in prop::num::f64::NORMAL | prop::num::f64::POSITIVE | prop::num::f64::NEGATIVE,
        ) {
            let parsed = line(&format!("{name} {value}"));
            prop_assert!(parsed.is_ok());
            let parsed = parsed.unwrap();
            prop_assert_eq!(parsed.name, name);
            prop_assert_eq!(parsed.value, value);
        }

        #[test]
        fn prop_label_escaping_roundtrip(
            name in "[a-zA-Z_][a-zA-Z0-9_]*",
            label_name in "[a-zA-Z_][a-zA-Z0-9_]*",
            raw_value in ".*",
            metric_value in "[0-9]+",
        ) {
            let escaped = raw_value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n");

            let input = format!("{name}{{{label_name}=\"{escaped}\"}} {metric_value}");
            let parsed = line(&input);
            prop_assert!(parsed.is_ok());
            let parsed = parsed.unwrap();
            prop_assert_eq!(parsed.labels.get(&label_name), Some(raw_value.as_str()));
        }

        #[test]
        fn prop_timestamp_parsing(
            name in "[a-zA-Z_][a-zA-Z0-9_]*",
            value in prop::num::f64::NORMAL,
            timestamp in prop::num::i64::ANY,
        ) {
            let parsed = line(&format!("{name} {value} {timestamp}"));
            prop_assert!(parsed.is_ok());
            prop_assert_eq!(parsed.unwrap().timestamp, Some(timestamp));
        }
    }
}

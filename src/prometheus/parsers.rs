use std::{borrow::Cow, io::Read};

use log::debug;
use pest::{iterators::Pair, Parser};

use crate::internal::ExpositionMarshal;
use crate::public::*;

#[derive(Parser)]
#[grammar = "prometheus/prometheus.pest"]
struct PrometheusParser;

/// A non-empty line, classified
#[derive(Debug, PartialEq)]
pub enum Line<'a> {
    Help { metric_name: &'a str, help: &'a str },
    Type { metric_name: &'a str, metric_type: &'a str },
    Comment,
    Sample(&'a str),
}

/// Cuts the `{...}` block out of a sample line, spanning from the first `{`
/// to the last `}` so braces inside label values don't need counting.
/// Returns the rest of the line and the block itself (empty if there is none).
pub fn extract_label_block(line: &str) -> (Cow<'_, str>, &str) {
    match (line.find('{'), line.rfind('}')) {
        (Some(open), Some(close)) if open < close => {
            let remainder = format!("{}{}", &line[..open], &line[close + 1..]);
            (Cow::Owned(remainder), &line[open..=close])
        }
        _ => (Cow::Borrowed(line), ""),
    }
}

/// Scans raw label text for `name="value"` pairs. This is deliberately not a
/// strict grammar: anything that doesn't look like a label is skipped, so
/// malformed input gives fewer labels rather than an error. Only `\"` is
/// unescaped; other escapes such as `\\` and `\n` are kept as written.
pub fn decode_labels(raw: &str) -> Labels {
    let mut labels = Labels::new();
    if raw.is_empty() {
        return labels;
    }

    let scanned = match PrometheusParser::parse(Rule::labels, raw) {
        Ok(scanned) => scanned,
        Err(e) => {
            debug!("no labels found in {}: {}", raw, e);
            return labels;
        }
    };

    for label in scanned.flatten().filter(|p| p.as_rule() == Rule::label) {
        let mut inner = label.into_inner();
        if let Some(name) = inner.next() {
            let value = inner.next().map(|v| v.as_str()).unwrap_or("");
            labels.insert(name.as_str().to_owned(), value.replace("\\\"", "\""));
        }
    }

    labels
}

/// Parses a sample value, `le` bound or quantile. Besides plain floats this
/// accepts `+Inf`, `-Inf` and `NaN` in any ASCII case, and `infinity`.
pub fn parse_metric_value(token: &str) -> Option<f64> {
    let (sign, magnitude) = match token.strip_prefix('-') {
        Some(rest) => (-1., rest),
        None => (1., token.strip_prefix('+').unwrap_or(token)),
    };

    if magnitude.eq_ignore_ascii_case("inf") || magnitude.eq_ignore_ascii_case("infinity") {
        return Some(sign * f64::INFINITY);
    }

    if magnitude.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }

    token.parse().ok()
}

pub fn parse_line(line: &str, line_number: usize) -> Result<Line<'_>, ParseError> {
    fn parse_descriptor(pair: Pair<'_, Rule>) -> (Option<&str>, Option<&str>) {
        let mut metric_name = None;
        let mut remainder = None;

        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::kw_help | Rule::kw_type => {}
                Rule::metricname => metric_name = Some(child.as_str()),
                Rule::remainder => remainder = Some(child.as_str()),
                _ => unreachable!(),
            }
        }

        (metric_name, remainder)
    }

    let grammar_error = |reason: String| ParseError::new(line_number, ParseErrorKind::Grammar(reason));

    let classified = PrometheusParser::parse(Rule::line, line)
        .map_err(|e| grammar_error(e.to_string()))?
        .next()
        .and_then(|l| l.into_inner().next())
        .ok_or_else(|| grammar_error(format!("unclassifiable line: {}", line)))?;

    match classified.as_rule() {
        Rule::helpline => match parse_descriptor(classified) {
            (Some(metric_name), help) => Ok(Line::Help {
                metric_name,
                help: help.unwrap_or(""),
            }),
            (None, _) => Err(ParseError::new(line_number, ParseErrorKind::MissingMetricName)),
        },
        Rule::typeline => match parse_descriptor(classified) {
            (Some(metric_name), Some(metric_type)) if !metric_type.trim().is_empty() => {
                Ok(Line::Type {
                    metric_name,
                    metric_type: metric_type.trim(),
                })
            }
            (Some(_), _) => Err(ParseError::new(line_number, ParseErrorKind::MissingType)),
            (None, _) => Err(ParseError::new(line_number, ParseErrorKind::MissingMetricName)),
        },
        Rule::commentline => Ok(Line::Comment),
        Rule::sampleline => Ok(Line::Sample(classified.as_str())),
        _ => unreachable!(),
    }
}

/// Parses `name{labels} value [timestamp]`. A missing timestamp is `0`.
pub fn parse_sample(line: &str, line_number: usize) -> Result<Sample, ParseError> {
    let (remainder, raw_labels) = extract_label_block(line);
    let labels = decode_labels(raw_labels);

    let mut tokens = remainder.split_whitespace();
    let (name, value) = match (tokens.next(), tokens.next()) {
        (Some(name), Some(value)) => (name, value),
        _ => return Err(ParseError::new(line_number, ParseErrorKind::MissingValue)),
    };

    let value = parse_metric_value(value).ok_or_else(|| {
        ParseError::new(line_number, ParseErrorKind::InvalidValue(value.to_owned()))
    })?;

    let timestamp = match tokens.next() {
        Some(timestamp) => timestamp.parse::<Timestamp>().map_err(|_| {
            ParseError::new(
                line_number,
                ParseErrorKind::InvalidTimestamp(timestamp.to_owned()),
            )
        })?,
        None => 0,
    };

    Ok(Sample::new(name.to_owned(), labels, value, timestamp))
}

/// Parses a whole exposition into metrics, in the order they appear. The
/// first malformed line aborts the parse.
pub fn parse_prometheus(exposition: &str) -> Result<Vec<Metric>, ParseError> {
    let mut marshal = ExpositionMarshal::empty();

    for (line_number, line) in exposition.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line, line_number)? {
            Line::Help { metric_name, help } => marshal.process_help(metric_name, help.to_owned()),
            Line::Type {
                metric_name,
                metric_type,
            } => marshal.process_type(metric_name, MetricType::from(metric_type)),
            Line::Comment => {}
            Line::Sample(sample) => marshal.process_sample(parse_sample(sample, line_number)?),
        }
    }

    let metrics = marshal.finish();
    debug!("parsed {} metrics", metrics.len());

    Ok(metrics)
}

/// Parses a raw body. Invalid UTF-8 is rejected rather than replaced.
pub fn parse_bytes(exposition: &[u8]) -> Result<Vec<Metric>, Error> {
    let exposition = std::str::from_utf8(exposition)?;

    Ok(parse_prometheus(exposition)?)
}

/// Reads the whole stream before parsing it
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Vec<Metric>, Error> {
    let mut exposition = Vec::new();
    reader.read_to_end(&mut exposition)?;

    parse_bytes(&exposition)
}

/// Parses an exposition and upgrades its histograms and summaries
pub fn parse_exposition(exposition: &str) -> Result<MetricsExposition, Error> {
    let metrics = parse_prometheus(exposition)?;

    Ok(MetricsExposition::from_metrics(metrics)?)
}

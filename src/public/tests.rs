use std::collections::HashMap;

use crate::prometheus::parse_sample;
use crate::{HistogramMetric, Metric, MetricType, MetricsExposition, Sample, UpgradeError};

fn sample(name: &str, labels: &[(&str, &str)], value: f64) -> Sample {
    let labels = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<HashMap<_, _>>();
    Sample::new(name.to_owned(), labels, value, 0)
}

#[test]
fn test_metric_type_from_str() {
    assert_eq!(MetricType::from("counter"), MetricType::Counter);
    assert_eq!(MetricType::from("gauge"), MetricType::Gauge);
    assert_eq!(MetricType::from("histogram"), MetricType::Histogram);
    assert_eq!(MetricType::from("summary"), MetricType::Summary);
    assert_eq!(MetricType::from("untyped"), MetricType::Untyped);
    assert_eq!(MetricType::from(""), MetricType::Untyped);
    assert_eq!(MetricType::from("stateset"), MetricType::Other("stateset".to_owned()));
    assert_eq!(MetricType::from("Counter"), MetricType::Other("Counter".to_owned()));
    assert_eq!(MetricType::from("stateset").to_string(), "stateset");
    assert_eq!(MetricType::default(), MetricType::Untyped);
}

#[test]
fn test_render_metric() {
    let metric = Metric {
        name: String::from("http_requests_total"),
        description: String::from("The total number of HTTP requests."),
        metric_type: MetricType::Counter,
        samples: vec![
            Sample::new(
                String::from("http_requests_total"),
                vec![
                    (String::from("method"), String::from("post")),
                    (String::from("code"), String::from("200")),
                ]
                .into_iter()
                .collect(),
                1027.,
                1395066363000,
            ),
            sample("http_requests_total", &[("path", "say \"hi\"")], f64::INFINITY),
        ],
    };

    assert_eq!(
        metric.to_string(),
        "# HELP http_requests_total The total number of HTTP requests.\n\
         # TYPE http_requests_total counter\n\
         http_requests_total{code=\"200\",method=\"post\"} 1027 1395066363000\n\
         http_requests_total{path=\"say \\\"hi\\\"\"} +Inf\n"
    );
}

#[test]
fn test_render_untyped_metric_without_labels() {
    let mut metric = Metric::new(String::from("up"));
    metric.samples.push(sample("up", &[], f64::NAN));

    assert_eq!(metric.to_string(), "up NaN\n");
}

#[test]
fn test_render_unpaired_backslash_parses_back() {
    let rendered = sample("fs_free", &[("device", "sda"), ("path", "D:\\")], 1.).to_string();
    assert_eq!(rendered, "fs_free{device=\"sda\",path=\"D:\\\\\"} 1");

    let parsed = parse_sample(&rendered, 0).unwrap();
    assert_eq!(parsed.label("device"), Some("sda"));
    assert_eq!(parsed.label("path"), Some("D:\\\\"));

    let rendered = sample("quoted", &[("a", "x\\\"y"), ("b", "z")], 2.).to_string();
    assert_eq!(rendered, "quoted{a=\"x\\\\\\\"y\",b=\"z\"} 2");

    let parsed = parse_sample(&rendered, 0).unwrap();
    assert_eq!(parsed.label("a"), Some("x\\\\\"y"));
    assert_eq!(parsed.label("b"), Some("z"));
}

#[test]
fn test_exposition_partition_keeps_order() {
    let mut first = Metric::new(String::from("a_total"));
    first.metric_type = MetricType::Counter;
    first.samples.push(sample("a_total", &[], 1.));

    let mut gauge = Metric::new(String::from("temperature"));
    gauge.metric_type = MetricType::Gauge;
    gauge.samples.push(sample("temperature", &[], 21.5));

    let mut second = Metric::new(String::from("b_total"));
    second.metric_type = MetricType::Counter;
    second.samples.push(sample("b_total", &[], 2.));

    let mut histogram = Metric::new(String::from("latency"));
    histogram.metric_type = MetricType::Histogram;
    histogram.samples = vec![
        sample("latency_bucket", &[("le", "1")], 3.),
        sample("latency_bucket", &[("le", "+Inf")], 4.),
        sample("latency_sum", &[], 2.5),
        sample("latency_count", &[], 4.),
    ];

    let mut other = Metric::new(String::from("flags"));
    other.metric_type = MetricType::from("stateset");
    other.samples.push(sample("flags", &[], 1.));

    let exposition =
        MetricsExposition::from_metrics(vec![first, gauge, histogram, second, other, Metric::new(String::from("x"))])
            .unwrap();

    assert_eq!(exposition.len(), 6);
    assert_eq!(exposition.counters.len(), 2);
    assert_eq!(exposition.counters[0].name, "a_total");
    assert_eq!(exposition.counters[1].name, "b_total");
    assert_eq!(exposition.gauges.len(), 1);
    assert_eq!(exposition.untyped.len(), 1);
    assert_eq!(exposition.other.len(), 1);
    assert!(exposition.summaries.is_empty());

    let histogram: &HistogramMetric = &exposition.histograms[0];
    assert_eq!(histogram.buckets.len(), 2);
    assert_eq!(histogram.sum, 2.5);
    assert_eq!(histogram.count, 4.);
}

#[test]
fn test_exposition_partition_fails_on_bad_histogram() {
    let mut histogram = Metric::new(String::from("latency"));
    histogram.metric_type = MetricType::Histogram;
    histogram.samples = vec![
        sample("latency_bucket", &[("le", "+Inf")], 4.),
        sample("latency_count", &[], 4.),
    ];

    let result = MetricsExposition::from_metrics(vec![histogram]);
    assert_eq!(result, Err(UpgradeError::MissingSum(String::from("latency"))));
}

#[test]
fn test_serialize_metric() {
    let mut metric = Metric::new(String::from("go_goroutines"));
    metric.description = String::from("Number of goroutines that currently exist.");
    metric.metric_type = MetricType::Gauge;
    metric.samples.push(sample("go_goroutines", &[], 166.));

    let json = serde_json::to_value(&metric).unwrap();
    assert_eq!(json["name"], "go_goroutines");
    assert_eq!(json["type"], "gauge");
    assert_eq!(json["samples"][0]["value"], 166.);
    assert_eq!(json["samples"][0]["timestamp"], 0);
}

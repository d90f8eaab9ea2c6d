use log::debug;

use crate::internal::MetricUpgrade;
use crate::public::*;

use super::parsers::parse_metric_value;

/// Exactly one `<name>_sum` and one `<name>_count` sample must be present.
fn sum_and_count(metric: &Metric) -> Result<(f64, f64), UpgradeError> {
    let sum_name = format!("{}_sum", metric.name);
    let sums: Vec<&Sample> = metric.find_samples(&sum_name).collect();
    let sum = match sums.as_slice() {
        [sum] => sum.value,
        [] => return Err(UpgradeError::MissingSum(metric.name.clone())),
        many => return Err(UpgradeError::DuplicateSum(metric.name.clone(), many.len())),
    };

    let count_name = format!("{}_count", metric.name);
    let counts: Vec<&Sample> = metric.find_samples(&count_name).collect();
    let count = match counts.as_slice() {
        [count] => count.value,
        [] => return Err(UpgradeError::MissingCount(metric.name.clone())),
        many => return Err(UpgradeError::DuplicateCount(metric.name.clone(), many.len())),
    };

    Ok((sum, count))
}

impl MetricUpgrade for HistogramMetric {
    const METRIC_TYPE: MetricType = MetricType::Histogram;

    fn upgrade(metric: &Metric) -> Result<HistogramMetric, UpgradeError> {
        Self::check_type(metric)?;

        let bucket_name = format!("{}_bucket", metric.name);
        let buckets = metric
            .find_samples(&bucket_name)
            .map(|sample| {
                let bound = sample.label("le");
                match bound.and_then(parse_metric_value) {
                    Some(upper_bound) => Ok(HistogramBucket {
                        upper_bound,
                        count: sample.value,
                    }),
                    None => Err(UpgradeError::InvalidBound {
                        name: metric.name.clone(),
                        value: bound.map(str::to_owned),
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (sum, count) = sum_and_count(metric)?;
        debug!("upgraded histogram {} with {} buckets", metric.name, buckets.len());

        Ok(HistogramMetric {
            metric: metric.clone(),
            buckets,
            sum,
            count,
        })
    }
}

impl MetricUpgrade for SummaryMetric {
    const METRIC_TYPE: MetricType = MetricType::Summary;

    fn upgrade(metric: &Metric) -> Result<SummaryMetric, UpgradeError> {
        Self::check_type(metric)?;

        let quantiles = metric
            .find_samples(&metric.name)
            .map(|sample| {
                let quantile = sample.label("quantile");
                match quantile.and_then(parse_metric_value) {
                    Some(q) => Ok(Quantile {
                        quantile: q,
                        value: sample.value,
                    }),
                    None => Err(UpgradeError::InvalidQuantile {
                        name: metric.name.clone(),
                        value: quantile.map(str::to_owned),
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (sum, count) = sum_and_count(metric)?;
        debug!("upgraded summary {} with {} quantiles", metric.name, quantiles.len());

        Ok(SummaryMetric {
            metric: metric.clone(),
            quantiles,
            sum,
            count,
        })
    }
}

pub fn upgrade_histogram(metric: &Metric) -> Result<HistogramMetric, UpgradeError> {
    metric.upgrade()
}

pub fn upgrade_summary(metric: &Metric) -> Result<SummaryMetric, UpgradeError> {
    metric.upgrade()
}

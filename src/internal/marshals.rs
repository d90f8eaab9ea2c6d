use log::trace;

use crate::{Metric, MetricType, Sample};

/// Folds parsed lines into metrics. At most one metric is open at a time; it
/// is closed as soon as a line shows up that can't belong to it.
#[derive(Debug, Default)]
pub struct ExpositionMarshal {
    current: Option<Metric>,
    metrics: Vec<Metric>,
}

impl ExpositionMarshal {
    pub fn empty() -> ExpositionMarshal {
        ExpositionMarshal {
            current: None,
            metrics: Vec::new(),
        }
    }

    pub fn process_help(&mut self, metric_name: &str, help: String) {
        self.metric_named(metric_name).description = help;
    }

    pub fn process_type(&mut self, metric_name: &str, metric_type: MetricType) {
        self.metric_named(metric_name).metric_type = metric_type;
    }

    /// Samples belong to the open metric when their name starts with its name,
    /// which is how `_bucket`, `_sum` and `_count` samples end up together.
    pub fn process_sample(&mut self, sample: Sample) {
        let owned = self
            .current
            .as_ref()
            .map_or(false, |m| sample.name.starts_with(m.name.as_str()));

        if !owned {
            self.close_current();
        }

        let metric = self.current.get_or_insert_with(|| {
            trace!("opening metric {} from sample", sample.name);
            Metric::new(sample.name.clone())
        });
        metric.samples.push(sample);
    }

    pub fn finish(mut self) -> Vec<Metric> {
        self.close_current();
        self.metrics
    }

    /// The open metric if it has this name, otherwise a freshly opened one
    fn metric_named(&mut self, metric_name: &str) -> &mut Metric {
        if self
            .current
            .as_ref()
            .map_or(false, |m| m.name != metric_name)
        {
            self.close_current();
        }

        self.current.get_or_insert_with(|| {
            trace!("opening metric {}", metric_name);
            Metric::new(metric_name.to_owned())
        })
    }

    fn close_current(&mut self) {
        if let Some(metric) = self.current.take() {
            trace!(
                "closing metric {} with {} samples",
                metric.name,
                metric.samples.len()
            );
            self.metrics.push(metric);
        }
    }
}

use crate::{Metric, MetricType, UpgradeError};

/// A shape that can be rebuilt from the flat sample list of a [`Metric`]
/// declared with [`MetricUpgrade::METRIC_TYPE`].
pub trait MetricUpgrade: Sized {
    const METRIC_TYPE: MetricType;

    fn upgrade(metric: &Metric) -> Result<Self, UpgradeError>;

    fn check_type(metric: &Metric) -> Result<(), UpgradeError> {
        if metric.metric_type != Self::METRIC_TYPE {
            return Err(UpgradeError::WrongType {
                name: metric.name.clone(),
                expected: Self::METRIC_TYPE,
                found: metric.metric_type.clone(),
            });
        }

        Ok(())
    }
}

use serde::{Deserialize, Serialize};

/// Summary of a set of `f32` samples, such as episode returns or fitness
/// values across a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub median: f32,
    pub std_dev: f32,
}

impl DescriptiveStats {
    /// Computes statistics over `values`; `None` if there are none.
    ///
    /// ```
    /// use airsoft_training::stats::DescriptiveStats;
    ///
    /// let stats = DescriptiveStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.count, 5);
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);

        let min = *values.first()?;
        let max = *values.last()?;
        let count = values.len();
        let n = count as f32;
        let mean = values.iter().sum::<f32>() / n;
        let median = values[count / 2];
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

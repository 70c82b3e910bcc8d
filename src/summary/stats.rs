//! Descriptive statistics over a completed session

use serde::Serialize;

/// Summary statistics for one session's readings
///
/// Values are kept at full precision; rounding to two decimals happens only
/// when the text artifact is rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Number of readings
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Largest reading
    pub max: f64,
    /// Smallest reading
    pub min: f64,
    /// Sample standard deviation (n - 1 denominator); 0.0 for fewer than
    /// two readings
    pub std_dev: f64,
}

impl SummaryStats {
    /// Compute statistics over a non-empty slice of readings
    ///
    /// Returns `None` for an empty slice; the caller decides how to surface
    /// the empty-session condition.
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let sum: f64 = values.iter().sum();
        let mean = sum / count as f64;

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            min = min.min(v);
            max = max.max(v);
        }

        let std_dev = if count < 2 {
            0.0
        } else {
            let variance: f64 = values
                .iter()
                .map(|&v| (v - mean).powi(2))
                .sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        };

        Some(Self {
            count,
            mean,
            max,
            min,
            std_dev,
        })
    }

    /// Render the human-readable statistics artifact
    pub fn render_report(&self) -> String {
        format!(
            "Light Sensor Data Statistics\n\
             ==========================\n\
             Total Readings: {}\n\
             Average Value: {:.2}\n\
             Maximum Value: {:.2}\n\
             Minimum Value: {:.2}\n\
             Standard Deviation: {:.2}\n",
            self.count, self.mean, self.max, self.min, self.std_dev
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_known_values() {
        let stats = SummaryStats::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.min, 2.0);
        // Sample standard deviation of this classic set is sqrt(32/7)
        assert!((stats.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_reading_has_zero_std_dev() {
        let stats = SummaryStats::compute(&[42.0]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 42.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_empty_slice_yields_none() {
        assert!(SummaryStats::compute(&[]).is_none());
    }

    #[test]
    fn test_report_format() {
        let stats = SummaryStats::compute(&[12.5, 13.0, 14.25]).unwrap();
        let report = stats.render_report();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "Light Sensor Data Statistics");
        assert_eq!(lines[1], "==========================");
        assert_eq!(lines[2], "Total Readings: 3");
        assert_eq!(lines[3], "Average Value: 13.25");
        assert_eq!(lines[4], "Maximum Value: 14.25");
        assert_eq!(lines[5], "Minimum Value: 12.50");
        assert!(lines[6].starts_with("Standard Deviation: "));
    }

    #[test]
    fn test_report_is_deterministic() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let a = SummaryStats::compute(&values).unwrap().render_report();
        let b = SummaryStats::compute(&values).unwrap().render_report();
        assert_eq!(a, b);
    }
}

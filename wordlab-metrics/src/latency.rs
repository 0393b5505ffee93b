use wordlab_core::LatencyStats;

pub struct LatencyCalculator;

impl LatencyCalculator {
    /// Summary statistics over per-call latencies in milliseconds.
    pub fn from_measurements(measurements: &[f64]) -> LatencyStats {
        if measurements.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted = measurements.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = measurements.iter().sum::<f64>() / measurements.len() as f64;

        LatencyStats {
            min_ms: sorted[0],
            max_ms: sorted[sorted.len() - 1],
            mean_ms: mean,
            p50_ms: percentile(&sorted, 50.0),
            p95_ms: percentile(&sorted, 95.0),
            count: measurements.len(),
        }
    }
}

fn percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    let index = (percentile / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[index.min(sorted_values.len() - 1)]
}

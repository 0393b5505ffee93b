use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use super::ids::ExperimentId;
use super::sweep::ExperimentConfig;

pub const RECENT_WORDS_CAPACITY: usize = 10;

/// Live view of a running experiment. Consumers only ever see clones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunProgress {
    pub experiment_id: ExperimentId,
    pub total_calls: u64,
    pub completed_calls: u64,
    pub failed_calls: u64,
    pub persistence_failures: u64,
    pub current_model: Option<String>,
    pub current_config: Option<ExperimentConfig>,
    /// Infinite until the first sample lands; serialises as `null` then.
    pub estimated_time_remaining_ms: f64,
    pub running_cost: Decimal,
    /// Most recent first.
    pub recent_words: VecDeque<String>,
}

impl RunProgress {
    pub fn new(experiment_id: ExperimentId, total_calls: u64) -> Self {
        Self {
            experiment_id,
            total_calls,
            completed_calls: 0,
            failed_calls: 0,
            persistence_failures: 0,
            current_model: None,
            current_config: None,
            estimated_time_remaining_ms: f64::INFINITY,
            running_cost: Decimal::ZERO,
            recent_words: VecDeque::with_capacity(RECENT_WORDS_CAPACITY),
        }
    }

    pub fn set_position(&mut self, model: &str, config: ExperimentConfig) {
        if self.current_model.as_deref() != Some(model) {
            self.current_model = Some(model.to_string());
        }
        self.current_config = Some(config);
    }

    /// Account for one completed call. `elapsed` is the wall time since the
    /// run started.
    pub fn record_sample(&mut self, word: &str, cost: Decimal, elapsed: Duration) {
        if self.completed_calls < self.total_calls {
            self.completed_calls += 1;
        }
        self.running_cost += cost;

        self.recent_words.push_front(word.to_string());
        self.recent_words.truncate(RECENT_WORDS_CAPACITY);

        self.estimated_time_remaining_ms = eta_ms(self.total_calls, self.completed_calls, elapsed);
    }

    pub fn record_failure(&mut self) {
        self.failed_calls += 1;
    }

    pub fn record_persistence_failure(&mut self) {
        self.persistence_failures += 1;
    }

    pub fn remaining_calls(&self) -> u64 {
        self.total_calls - self.completed_calls
    }

    pub fn fraction_complete(&self) -> f64 {
        if self.total_calls == 0 {
            return 1.0;
        }
        self.completed_calls as f64 / self.total_calls as f64
    }
}

fn eta_ms(total: u64, completed: u64, elapsed: Duration) -> f64 {
    if completed == 0 {
        return f64::INFINITY;
    }
    let per_call = elapsed.as_secs_f64() * 1000.0 / completed as f64;
    total.saturating_sub(completed) as f64 * per_call
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eta_is_infinite_before_first_sample() {
        let progress = RunProgress::new(ExperimentId::new(), 10);
        assert!(progress.estimated_time_remaining_ms.is_infinite());
    }

    #[test]
    fn test_record_sample_updates_eta_and_cost() {
        let mut progress = RunProgress::new(ExperimentId::new(), 10);
        progress.record_sample("blue", Decimal::new(5, 3), Duration::from_millis(200));
        progress.record_sample("red", Decimal::new(5, 3), Duration::from_millis(400));

        assert_eq!(progress.completed_calls, 2);
        assert_eq!(progress.running_cost, Decimal::new(10, 3));
        // 8 remaining * 200ms per call
        assert!((progress.estimated_time_remaining_ms - 1600.0).abs() < 1e-6);
        assert_eq!(progress.recent_words, vec!["red", "blue"]);
    }

    #[test]
    fn test_recent_words_ring_buffer_is_bounded() {
        let mut progress = RunProgress::new(ExperimentId::new(), 100);
        for i in 0..25 {
            progress.record_sample(&format!("w{}", i), Decimal::ZERO, Duration::from_millis(10));
        }
        assert_eq!(progress.recent_words.len(), RECENT_WORDS_CAPACITY);
        assert_eq!(progress.recent_words.front().map(String::as_str), Some("w24"));
        assert_eq!(progress.recent_words.back().map(String::as_str), Some("w15"));
    }

    #[test]
    fn test_completed_never_exceeds_total() {
        let mut progress = RunProgress::new(ExperimentId::new(), 2);
        for _ in 0..5 {
            progress.record_sample("x", Decimal::ZERO, Duration::from_millis(1));
        }
        assert_eq!(progress.completed_calls, 2);
        assert_eq!(progress.remaining_calls(), 0);
        assert_eq!(progress.estimated_time_remaining_ms, 0.0);
    }
}

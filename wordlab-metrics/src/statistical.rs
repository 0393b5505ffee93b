use serde::{Deserialize, Serialize};

/// Diversity figures for one word distribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DiversityStats {
    /// Shannon entropy in bits.
    pub entropy: f64,
    /// `entropy / log2(unique)`; 0 when fewer than two distinct words.
    pub normalized_entropy: f64,
    /// Share of the most frequent word, 0..=1.
    pub dominance: f64,
}

pub struct DiversityAnalyzer;

impl DiversityAnalyzer {
    /// Shannon entropy, in bits, of a distribution given as raw counts.
    ///
    /// Zero counts contribute nothing, so `log2(0)` is never evaluated. A
    /// single outcome (or none at all) yields exactly `0.0`.
    pub fn shannon_entropy(counts: &[u64]) -> f64 {
        let total: u64 = counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let occupied = counts.iter().filter(|&&c| c > 0).count();
        if occupied <= 1 {
            return 0.0;
        }

        let total = total as f64;
        counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / total;
                p * (1.0 / p).log2()
            })
            .sum()
    }

    pub fn analyze(counts: &[u64]) -> DiversityStats {
        let total: u64 = counts.iter().sum();
        let occupied = counts.iter().filter(|&&c| c > 0).count();
        let entropy = Self::shannon_entropy(counts);

        let normalized_entropy = if occupied < 2 {
            0.0
        } else {
            entropy / (occupied as f64).log2()
        };

        let dominance = if total == 0 {
            0.0
        } else {
            counts.iter().copied().max().unwrap_or(0) as f64 / total as f64
        };

        DiversityStats {
            entropy,
            normalized_entropy,
            dominance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_of_single_outcome_is_exactly_zero() {
        let entropy = DiversityAnalyzer::shannon_entropy(&[10]);
        assert_eq!(entropy.to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn test_entropy_ignores_zero_counts() {
        assert_eq!(DiversityAnalyzer::shannon_entropy(&[0, 7, 0]), 0.0);
        assert_eq!(DiversityAnalyzer::shannon_entropy(&[]), 0.0);
    }

    #[test]
    fn test_fair_coin_is_one_bit() {
        let entropy = DiversityAnalyzer::shannon_entropy(&[5, 5]);
        assert!((entropy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_dominance() {
        let stats = DiversityAnalyzer::analyze(&[3, 1]);
        assert!((stats.dominance - 0.75).abs() < 1e-12);
        assert!(stats.normalized_entropy > 0.0 && stats.normalized_entropy < 1.0);
    }
}

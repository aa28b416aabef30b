use std::collections::HashMap;

use crate::config::ProfileThresholds;
use crate::entry::Level;

/// Token statistics behind the `density` and `entropy` fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextProfile {
    pub tokens: usize,
    pub distinct: usize,
    /// Shannon entropy of the token distribution divided by its maximum
    /// for this many tokens; 0.0 for fewer than two tokens.
    pub normalized_entropy: f64,
}

impl TextProfile {
    pub fn of(text: &str) -> Self {
        let tokens = tokenize(text);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for token in &tokens {
            *counts.entry(token.as_str()).or_default() += 1;
        }

        let total = tokens.len();
        let normalized_entropy = if total < 2 {
            0.0
        } else {
            let n = total as f64;
            let h: f64 = counts
                .values()
                .map(|&c| {
                    let p = c as f64 / n;
                    -p * p.log2()
                })
                .sum();
            (h / n.log2()).clamp(0.0, 1.0)
        };

        Self {
            tokens: total,
            distinct: counts.len(),
            normalized_entropy,
        }
    }

    pub fn distinct_ratio(&self) -> f64 {
        if self.tokens == 0 {
            0.0
        } else {
            self.distinct as f64 / self.tokens as f64
        }
    }

    pub fn density(&self, thresholds: &ProfileThresholds) -> Level {
        let ratio = self.distinct_ratio();
        if self.tokens >= thresholds.high_min_tokens && ratio >= thresholds.high_min_ratio {
            Level::High
        } else if self.tokens >= thresholds.medium_min_tokens && ratio >= thresholds.medium_min_ratio
        {
            Level::Medium
        } else {
            Level::Low
        }
    }

    pub fn entropy(&self, thresholds: &ProfileThresholds) -> Level {
        if self.normalized_entropy >= thresholds.entropy_high {
            Level::High
        } else if self.normalized_entropy >= thresholds.entropy_medium {
            Level::Medium
        } else {
            Level::Low
        }
    }
}

/// Lowercased whitespace tokens with surrounding punctuation stripped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("  Hello, world!  (again) ... "),
            vec!["hello", "world", "again"]
        );
    }

    #[test]
    fn test_short_instruction_profile() {
        let t = ProfileThresholds::default();
        let profile = TextProfile::of("please explain how binary search works");

        assert_eq!(profile.tokens, 6);
        assert_eq!(profile.distinct, 6);
        assert_eq!(profile.density(&t), Level::Medium);
        assert_eq!(profile.entropy(&t), Level::High);
    }

    #[test]
    fn test_repetition_lowers_entropy() {
        let t = ProfileThresholds::default();
        let profile = TextProfile::of("the the the the the the the the");

        assert_eq!(profile.distinct, 1);
        assert!(profile.normalized_entropy.abs() < f64::EPSILON);
        assert_eq!(profile.entropy(&t), Level::Low);
        assert_eq!(profile.density(&t), Level::Low);
    }

    #[test]
    fn test_long_varied_text_is_dense() {
        let t = ProfileThresholds::default();
        let profile = TextProfile::of(
            "binary search halves the sorted range on every comparison until the target index is found",
        );

        assert!(profile.tokens >= t.high_min_tokens);
        assert_eq!(profile.density(&t), Level::High);
        assert_eq!(profile.entropy(&t), Level::High);
    }

    #[test]
    fn test_empty_text() {
        let profile = TextProfile::of("   ");
        assert_eq!(profile.tokens, 0);
        assert!(profile.distinct_ratio().abs() < f64::EPSILON);
    }
}

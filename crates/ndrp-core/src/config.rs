use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const ENV_NOISE_MIN_CHARS: &str = "NDRP_NOISE_MIN_CHARS";
pub const ENV_MIN_HYGIENE: &str = "NDRP_MIN_HYGIENE";

pub const DEFAULT_PLACEHOLDER: &str = "[REDACTED]";

/// Degenerate-input detection used by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Records with fewer characters than this after trimming are noise.
    pub min_chars: usize,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self { min_chars: 3 }
    }
}

/// Cutoffs for the density and entropy tiers.
///
/// Density uses two (token count, distinct ratio) pairs; entropy uses two
/// cutoffs on the normalized Shannon entropy of the token distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileThresholds {
    pub high_min_tokens: usize,
    pub high_min_ratio: f64,
    pub medium_min_tokens: usize,
    pub medium_min_ratio: f64,
    pub entropy_high: f64,
    pub entropy_medium: f64,
}

impl Default for ProfileThresholds {
    fn default() -> Self {
        Self {
            high_min_tokens: 12,
            high_min_ratio: 0.6,
            medium_min_tokens: 5,
            medium_min_ratio: 0.4,
            entropy_high: 0.85,
            entropy_medium: 0.6,
        }
    }
}

impl ProfileThresholds {
    fn check(&self) -> Result<()> {
        for (name, value) in [
            ("high_min_ratio", self.high_min_ratio),
            ("medium_min_ratio", self.medium_min_ratio),
            ("entropy_high", self.entropy_high),
            ("entropy_medium", self.entropy_medium),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "profile.{name} must be within 0..=1, got {value}"
                )));
            }
        }
        if self.medium_min_tokens > self.high_min_tokens {
            return Err(Error::InvalidConfig(
                "profile.medium_min_tokens exceeds profile.high_min_tokens".into(),
            ));
        }
        if self.entropy_medium > self.entropy_high {
            return Err(Error::InvalidConfig(
                "profile.entropy_medium exceeds profile.entropy_high".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionPattern {
    pub name: String,
    pub pattern: String,
}

impl RedactionPattern {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    pub placeholder: String,
    pub patterns: Vec<RedactionPattern>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            patterns: vec![
                RedactionPattern::new("email", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"),
                RedactionPattern::new(
                    "credential_assignment",
                    r"(?i)\b(?:api[_-]?key|secret|password|passwd|token)\s*[:=]\s*\S+",
                ),
                RedactionPattern::new("bearer_token", r"(?i)\bbearer\s+[A-Za-z0-9\-._~+/]+=*"),
                RedactionPattern::new("aws_access_key", r"\bAKIA[0-9A-Z]{16}\b"),
                RedactionPattern::new("secret_key", r"\bsk-[A-Za-z0-9]{16,}\b"),
            ],
        }
    }
}

/// Relative weights of the three hygiene components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub structural: f64,
    pub semantic: f64,
    pub redaction: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            structural: 0.5,
            semantic: 0.3,
            redaction: 0.2,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.structural + self.semantic + self.redaction
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefineConfig {
    pub noise: NoiseConfig,
    pub profile: ProfileThresholds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    pub profile: ProfileThresholds,
    pub redaction: RedactionConfig,
    pub weights: ScoringWeights,
    pub min_hygiene_score: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            profile: ProfileThresholds::default(),
            redaction: RedactionConfig::default(),
            weights: ScoringWeights::default(),
            min_hygiene_score: DEFAULT_MIN_HYGIENE,
        }
    }
}

pub const DEFAULT_MIN_HYGIENE: f64 = 70.0;

/// File-level configuration shared by the `refine` and `validate` commands.
///
/// `profile` lives at the top so the validator cross-checks entries against
/// the same thresholds the standardizer used to produce them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub noise: NoiseConfig,
    pub profile: ProfileThresholds,
    pub redaction: RedactionConfig,
    pub scoring: ScoringWeights,
    pub min_hygiene_score: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            noise: NoiseConfig::default(),
            profile: ProfileThresholds::default(),
            redaction: RedactionConfig::default(),
            scoring: ScoringWeights::default(),
            min_hygiene_score: DEFAULT_MIN_HYGIENE,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `NDRP_*` overrides resolved through `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup(ENV_NOISE_MIN_CHARS) {
            self.noise.min_chars = raw.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("{ENV_NOISE_MIN_CHARS} is not a count: '{raw}'"))
            })?;
        }
        if let Some(raw) = lookup(ENV_MIN_HYGIENE) {
            self.min_hygiene_score = raw.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("{ENV_MIN_HYGIENE} is not a number: '{raw}'"))
            })?;
        }
        self.check()?;
        Ok(self)
    }

    pub fn check(&self) -> Result<()> {
        self.profile.check()?;
        if !(0.0..=100.0).contains(&self.min_hygiene_score) {
            return Err(Error::InvalidConfig(format!(
                "min_hygiene_score must be within 0..=100, got {}",
                self.min_hygiene_score
            )));
        }
        let w = &self.scoring;
        if w.structural < 0.0 || w.semantic < 0.0 || w.redaction < 0.0 || w.total() <= 0.0 {
            return Err(Error::InvalidConfig(
                "scoring weights must be non-negative with a positive sum".into(),
            ));
        }
        Ok(())
    }

    pub fn refine(&self) -> RefineConfig {
        RefineConfig {
            noise: self.noise.clone(),
            profile: self.profile.clone(),
        }
    }

    pub fn validator(&self) -> ValidatorConfig {
        ValidatorConfig {
            profile: self.profile.clone(),
            redaction: self.redaction.clone(),
            weights: self.scoring.clone(),
            min_hygiene_score: self.min_hygiene_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_json(r#"{"noise": {"min_chars": 5}}"#).unwrap();

        assert_eq!(config.noise.min_chars, 5);
        assert_eq!(config.profile, ProfileThresholds::default());
        assert!((config.min_hygiene_score - DEFAULT_MIN_HYGIENE).abs() < f64::EPSILON);
        assert_eq!(config.redaction.placeholder, DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn test_rejects_out_of_range_ratio() {
        let result = Config::from_json(r#"{"profile": {"high_min_ratio": 1.5}}"#);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_weights() {
        let result = Config::from_json(
            r#"{"scoring": {"structural": 0, "semantic": 0, "redaction": 0}}"#,
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_overrides(|key| match key {
                ENV_NOISE_MIN_CHARS => Some("8".into()),
                ENV_MIN_HYGIENE => Some(" 85.5 ".into()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.noise.min_chars, 8);
        assert!((config.min_hygiene_score - 85.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_override() {
        let result = Config::default().with_overrides(|key| {
            (key == ENV_MIN_HYGIENE).then(|| "lots".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_component_configs_share_profile() {
        let mut config = Config::default();
        config.profile.high_min_tokens = 20;

        assert_eq!(config.refine().profile.high_min_tokens, 20);
        assert_eq!(config.validator().profile.high_min_tokens, 20);
    }
}

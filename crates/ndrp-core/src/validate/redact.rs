use regex::{NoExpand, Regex};
use serde_json::Value;

use crate::config::RedactionConfig;
use crate::error::{Error, Result};

pub const REDACTED_FIELDS: [&str; 2] = ["content", "context"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionHit {
    pub field: &'static str,
    pub pattern: String,
    pub count: usize,
}

/// Compiled sensitive-substring patterns.
#[derive(Debug, Clone)]
pub struct Redactor {
    placeholder: String,
    patterns: Vec<(String, Regex)>,
}

impl Redactor {
    pub fn new(config: &RedactionConfig) -> Result<Self> {
        let patterns = config
            .patterns
            .iter()
            .map(|p| {
                Regex::new(&p.pattern)
                    .map(|re| (p.name.clone(), re))
                    .map_err(|source| Error::InvalidPattern {
                        name: p.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            placeholder: config.placeholder.clone(),
            patterns,
        })
    }

    /// Replaces every pattern match in `text`, returning the rewritten text
    /// and the per-pattern match counts.
    pub fn redact_text(&self, text: &str) -> (String, Vec<(String, usize)>) {
        let mut out = text.to_string();
        let mut counts = Vec::new();
        for (name, re) in &self.patterns {
            let n = re.find_iter(&out).count();
            if n > 0 {
                out = re.replace_all(&out, NoExpand(&self.placeholder)).into_owned();
                counts.push((name.clone(), n));
            }
        }
        (out, counts)
    }

    /// Returns a redacted copy of `record`; the input is left untouched.
    pub fn redact_record(&self, record: &Value) -> (Value, Vec<RedactionHit>) {
        let mut copy = record.clone();
        let mut hits = Vec::new();

        if let Some(object) = copy.as_object_mut() {
            for field in REDACTED_FIELDS {
                let Some(Value::String(text)) = object.get_mut(field) else {
                    continue;
                };
                let (redacted, counts) = self.redact_text(text);
                if counts.is_empty() {
                    continue;
                }
                *text = redacted;
                hits.extend(counts.into_iter().map(|(pattern, count)| RedactionHit {
                    field,
                    pattern,
                    count,
                }));
            }
        }

        (copy, hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedactionPattern;

    fn redactor() -> Redactor {
        Redactor::new(&RedactionConfig::default()).unwrap()
    }

    #[test]
    fn test_email_and_credentials() {
        let (text, counts) =
            redactor().redact_text("mail bob@example.org, api_key=abc123 and password: hunter2");

        assert_eq!(text, "mail [REDACTED], [REDACTED] and [REDACTED]");
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), 3);
    }

    #[test]
    fn test_clean_text_untouched() {
        let (text, counts) = redactor().redact_text("nothing to see here");
        assert_eq!(text, "nothing to see here");
        assert!(counts.is_empty());
    }

    #[test]
    fn test_record_copy_only() {
        let original = serde_json::json!({
            "content": "reach me at carol@example.com",
            "context": "token: sk-abcdefghijklmnopqrstu",
            "intent": "alice@example.com"
        });

        let (copy, hits) = redactor().redact_record(&original);

        assert_eq!(original["content"], "reach me at carol@example.com");
        assert_eq!(copy["content"], "reach me at [REDACTED]");
        assert_eq!(copy["context"], "[REDACTED]");
        assert_eq!(copy["intent"], "alice@example.com");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_placeholder_is_literal() {
        let config = RedactionConfig {
            placeholder: "$1<gone>".into(),
            patterns: vec![RedactionPattern::new("digits", r"(\d+)")],
        };
        let redactor = Redactor::new(&config).unwrap();

        assert_eq!(redactor.redact_text("pin 1234").0, "pin $1<gone>");
    }

    #[test]
    fn test_invalid_pattern() {
        let config = RedactionConfig {
            placeholder: "x".into(),
            patterns: vec![RedactionPattern::new("broken", "(unclosed")],
        };
        assert!(matches!(
            Redactor::new(&config),
            Err(Error::InvalidPattern { .. })
        ));
    }
}

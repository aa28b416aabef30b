use serde_json::{Map, Value};

use super::report::IssueKind;
use super::schema::{EntrySchema, FieldKind};
use crate::config::ProfileThresholds;
use crate::entry::Level;
use crate::profile::TextProfile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Finding {
    pub field: String,
    pub kind: IssueKind,
    pub message: String,
}

impl Finding {
    fn new(field: impl Into<String>, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    fn structural(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, IssueKind::StructuralViolation, message)
    }

    fn semantic(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, IssueKind::SemanticAdvisory, message)
    }
}

/// Shape checks: presence, primitive type, enum domain and const value.
/// Unknown fields are reported as warnings unless the schema admits them.
pub(crate) fn structural(record: &Value, schema: &EntrySchema) -> Vec<Finding> {
    let Some(object) = record.as_object() else {
        return vec![Finding::structural(
            "root",
            format!("expected a JSON object, found {}", json_type(record)),
        )];
    };

    let mut findings = Vec::new();
    for spec in &schema.fields {
        let Some(value) = object.get(&spec.name) else {
            if spec.required {
                findings.push(Finding::structural(
                    &spec.name,
                    format!("'{}' is a required property", spec.name),
                ));
            }
            continue;
        };
        if let Some(message) = check_kind(&spec.kind, value) {
            findings.push(Finding::structural(&spec.name, message));
        }
    }

    if !schema.additional_properties {
        for key in object.keys() {
            if schema.field(key).is_none() {
                findings.push(Finding::new(
                    key,
                    IssueKind::UnknownField,
                    format!("'{key}' is not part of the entry schema"),
                ));
            }
        }
    }

    findings
}

fn check_kind(kind: &FieldKind, value: &Value) -> Option<String> {
    match (kind, value) {
        (FieldKind::Boolean, Value::Bool(_)) | (FieldKind::String, Value::String(_)) => None,
        (FieldKind::Enum(allowed), Value::String(s)) => (!allowed.contains(s)).then(|| {
            format!("'{s}' is not one of [{}]", allowed.join(", "))
        }),
        (FieldKind::Const(expected), Value::String(s)) => {
            (s != expected).then(|| format!("'{s}' must be the constant '{expected}'"))
        }
        (kind, other) => Some(format!(
            "expected {}, found {}",
            kind.type_name(),
            json_type(other)
        )),
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Quality checks over well-typed fields. Shape problems are left to
/// [`structural`], so a mistyped field yields no semantic finding.
pub(crate) fn semantic(record: &Map<String, Value>, thresholds: &ProfileThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    let Some(content) = record.get("content").and_then(Value::as_str) else {
        return findings;
    };

    if content.trim().is_empty() {
        findings.push(Finding::semantic("content", "content is empty after trimming"));
        return findings;
    }

    let profile = TextProfile::of(content);
    let level = |field: &str| -> Option<Level> {
        record.get(field).and_then(Value::as_str)?.parse().ok()
    };

    if level("density") == Some(Level::High) && profile.tokens < thresholds.high_min_tokens {
        findings.push(Finding::semantic(
            "density",
            format!(
                "density 'high' with {} tokens, below the high-density minimum of {}",
                profile.tokens, thresholds.high_min_tokens
            ),
        ));
    }

    if let Some(declared) = level("entropy") {
        let measured = profile.entropy(thresholds);
        if declared.distance(measured) > 1 {
            findings.push(Finding::semantic(
                "entropy",
                format!(
                    "entropy '{declared}' contradicts measured '{measured}' ({:.2})",
                    profile.normalized_entropy
                ),
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn good() -> Value {
        json!({
            "role": "user",
            "content": "please explain how binary search works",
            "intent": "explain",
            "mode": "instruction",
            "context": "",
            "structure": "coherent",
            "density": "medium",
            "entropy": "high",
            "meaning_preserved": true
        })
    }

    fn kinds(findings: &[Finding]) -> Vec<(&str, IssueKind)> {
        findings.iter().map(|f| (f.field.as_str(), f.kind)).collect()
    }

    #[test]
    fn test_conformant_record() {
        let schema = EntrySchema::ndrp_v1();
        assert!(structural(&good(), &schema).is_empty());
        assert!(semantic(good().as_object().unwrap(), &ProfileThresholds::default()).is_empty());
    }

    #[test]
    fn test_missing_and_mistyped() {
        let mut record = good();
        let object = record.as_object_mut().unwrap();
        object.remove("mode");
        object.insert("meaning_preserved".into(), json!("yes"));

        let findings = structural(&record, &EntrySchema::ndrp_v1());

        assert_eq!(
            kinds(&findings),
            vec![
                ("mode", IssueKind::StructuralViolation),
                ("meaning_preserved", IssueKind::StructuralViolation),
            ]
        );
        assert!(findings[1].message.contains("expected boolean, found string"));
    }

    #[test]
    fn test_domain_and_const() {
        let mut record = good();
        record["mode"] = json!("chat");
        record["structure"] = json!("fragmented");
        record["density"] = json!(3);

        let findings = structural(&record, &EntrySchema::ndrp_v1());

        assert_eq!(findings.len(), 3);
        assert!(findings.iter().all(|f| f.kind == IssueKind::StructuralViolation));
    }

    #[test]
    fn test_unknown_field_is_warning() {
        let mut record = good();
        record["source"] = json!("forum");

        let findings = structural(&record, &EntrySchema::ndrp_v1());

        assert_eq!(kinds(&findings), vec![("source", IssueKind::UnknownField)]);
    }

    #[test]
    fn test_open_schema_admits_extra_fields() {
        let schema = EntrySchema::from_json_schema(&json!({
            "type": "object",
            "properties": {"content": {"type": "string"}},
            "required": ["content"],
            "additionalProperties": true
        }))
        .unwrap();
        let record = json!({"content": "hello there friend", "source": "forum"});

        assert!(structural(&record, &schema).is_empty());
    }

    #[test]
    fn test_non_object() {
        let findings = structural(&json!(["role", "user"]), &EntrySchema::ndrp_v1());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "root");
        assert!(findings[0].message.contains("array"));
    }

    #[test]
    fn test_inflated_density() {
        let mut record = good();
        record["density"] = json!("high");

        let findings = semantic(record.as_object().unwrap(), &ProfileThresholds::default());

        assert_eq!(kinds(&findings), vec![("density", IssueKind::SemanticAdvisory)]);
    }

    #[test]
    fn test_contradicted_entropy() {
        let mut record = good();
        record["content"] = json!("no no no no no no no no");
        record["density"] = json!("low");
        record["entropy"] = json!("high");

        let findings = semantic(record.as_object().unwrap(), &ProfileThresholds::default());

        assert_eq!(kinds(&findings), vec![("entropy", IssueKind::SemanticAdvisory)]);
    }

    #[test]
    fn test_blank_content() {
        let mut record = good();
        record["content"] = json!("   ");

        let findings = semantic(record.as_object().unwrap(), &ProfileThresholds::default());

        assert_eq!(kinds(&findings), vec![("content", IssueKind::SemanticAdvisory)]);
    }
}

use std::path::Path;

use serde_json::Value;

use crate::entry::{Entry, Level, Mode, Role, Structure};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Enum(Vec<String>),
    Const(String),
}

impl FieldKind {
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String | Self::Enum(_) | Self::Const(_) => "string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    fn required(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
        }
    }
}

/// Field-level shape of an entry, as checked by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySchema {
    pub id: Option<String>,
    pub fields: Vec<FieldSpec>,
    pub additional_properties: bool,
}

impl EntrySchema {
    pub const NDRP_V1: &'static str = "NDRP-1.0";

    /// The built-in NDRP-1.0 entry shape.
    pub fn ndrp_v1() -> Self {
        let levels: Vec<String> = Level::ALL.iter().map(ToString::to_string).collect();
        let roles: Vec<String> = Role::ALL.iter().map(ToString::to_string).collect();
        let modes: Vec<String> = Mode::ALL.iter().map(ToString::to_string).collect();

        let fields = Entry::FIELDS
            .iter()
            .map(|&name| {
                let kind = match name {
                    "role" => FieldKind::Enum(roles.clone()),
                    "mode" => FieldKind::Enum(modes.clone()),
                    "density" | "entropy" => FieldKind::Enum(levels.clone()),
                    "structure" => FieldKind::Const(Structure::COHERENT.to_string()),
                    "meaning_preserved" => FieldKind::Boolean,
                    _ => FieldKind::String,
                };
                FieldSpec::required(name, kind)
            })
            .collect();

        Self {
            id: Some(Self::NDRP_V1.to_string()),
            fields,
            additional_properties: false,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)?;
        Self::from_json_schema(&value)
    }

    /// Reads the Draft-7 subset used for entry schemas: `properties` with
    /// `type`, `enum` or `const`, plus `required` and `additionalProperties`.
    ///
    /// Fields are ordered as listed in `required`, then the optional ones.
    pub fn from_json_schema(value: &Value) -> Result<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| Error::InvalidSchema("schema root must be an object".into()))?;
        let properties = root
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::InvalidSchema("schema has no `properties` object".into()))?;

        let required: Vec<&str> = match root.get("required") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str().ok_or_else(|| {
                        Error::InvalidSchema("`required` must list field names".into())
                    })
                })
                .collect::<Result<_>>()?,
            Some(_) => return Err(Error::InvalidSchema("`required` must be an array".into())),
        };

        if let Some(missing) = required.iter().find(|name| !properties.contains_key(**name)) {
            return Err(Error::InvalidSchema(format!(
                "required field `{missing}` has no property definition"
            )));
        }

        let mut fields = Vec::with_capacity(properties.len());
        for name in &required {
            fields.push(FieldSpec {
                name: (*name).to_string(),
                kind: parse_kind(name, &properties[*name])?,
                required: true,
            });
        }
        for (name, property) in properties {
            if !required.contains(&name.as_str()) {
                fields.push(FieldSpec {
                    name: name.clone(),
                    kind: parse_kind(name, property)?,
                    required: false,
                });
            }
        }

        let additional_properties = match root.get("additionalProperties") {
            None => true,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                return Err(Error::InvalidSchema(
                    "`additionalProperties` must be a boolean".into(),
                ))
            }
        };

        let id = root
            .get("$id")
            .or_else(|| root.get("title"))
            .and_then(Value::as_str)
            .map(String::from);

        Ok(Self {
            id,
            fields,
            additional_properties,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Default for EntrySchema {
    fn default() -> Self {
        Self::ndrp_v1()
    }
}

fn parse_kind(name: &str, property: &Value) -> Result<FieldKind> {
    if let Some(constant) = property.get("const") {
        return constant
            .as_str()
            .map(|s| FieldKind::Const(s.to_string()))
            .ok_or_else(|| Error::InvalidSchema(format!("`{name}`: only string consts are supported")));
    }

    if let Some(options) = property.get("enum") {
        let values = options
            .as_array()
            .ok_or_else(|| Error::InvalidSchema(format!("`{name}`: enum must be an array")))?
            .iter()
            .map(|v| {
                v.as_str().map(String::from).ok_or_else(|| {
                    Error::InvalidSchema(format!("`{name}`: only string enums are supported"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(FieldKind::Enum(values));
    }

    match property.get("type").and_then(Value::as_str) {
        Some("string") => Ok(FieldKind::String),
        Some("boolean") => Ok(FieldKind::Boolean),
        Some(other) => Err(Error::InvalidSchema(format!(
            "`{name}`: unsupported type `{other}`"
        ))),
        None => Err(Error::InvalidSchema(format!("`{name}`: missing `type`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIPPED: &str = include_str!("../../../../schema/entry_schema.json");

    #[test]
    fn test_builtin_covers_every_field() {
        let schema = EntrySchema::ndrp_v1();

        assert_eq!(schema.fields.len(), Entry::FIELDS.len());
        assert!(schema.fields.iter().all(|f| f.required));
        assert!(!schema.additional_properties);
        assert_eq!(
            schema.field("structure").map(|f| &f.kind),
            Some(&FieldKind::Const("coherent".into()))
        );
        assert_eq!(
            schema.field("meaning_preserved").map(|f| &f.kind),
            Some(&FieldKind::Boolean)
        );
    }

    #[test]
    fn test_shipped_schema_matches_builtin() {
        let value: Value = serde_json::from_str(SHIPPED).unwrap();
        let loaded = EntrySchema::from_json_schema(&value).unwrap();

        assert_eq!(loaded, EntrySchema::ndrp_v1());
    }

    #[test]
    fn test_optional_fields_and_default_additional() {
        let value = serde_json::json!({
            "properties": {
                "content": {"type": "string"},
                "source": {"type": "string"}
            },
            "required": ["content"]
        });

        let schema = EntrySchema::from_json_schema(&value).unwrap();

        assert!(schema.additional_properties);
        assert_eq!(schema.fields.len(), 2);
        assert!(schema.field("content").unwrap().required);
        assert!(!schema.field("source").unwrap().required);
    }

    #[test]
    fn test_rejects_unsupported_type() {
        let value = serde_json::json!({
            "properties": {"score": {"type": "number"}}
        });
        assert!(matches!(
            EntrySchema::from_json_schema(&value),
            Err(Error::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_rejects_required_without_property() {
        let value = serde_json::json!({
            "properties": {"content": {"type": "string"}},
            "required": ["content", "mode"]
        });
        assert!(EntrySchema::from_json_schema(&value).is_err());
    }
}

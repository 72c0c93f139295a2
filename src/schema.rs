//! Structural validation for untrusted provider payloads.
//!
//! A [`Schema`] describes the normalized JSON shape of one record type. The
//! checker walks the whole value and collects every violation with its path
//! instead of stopping at the first one. Types are never coerced: `"1"` is not
//! a number and `1` is not a string. Unknown object keys are ignored.
//!
//! Only after the walk is clean is the value deserialized into the typed
//! record, which also drops the unknown keys.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String,
    Number,
    Integer,
    Bool,
    /// A string that must equal the given literal.
    Literal(&'static str),
    Array(Box<Schema>),
    /// Fixed-length array with one schema per position.
    Tuple(Vec<Schema>),
    Object(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub schema: Schema,
    pub required: bool,
}

impl Field {
    pub fn required(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            schema,
            required: true,
        }
    }

    pub fn optional(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            schema,
            required: false,
        }
    }
}

impl Schema {
    pub fn array(item: Schema) -> Self {
        Self::Array(Box::new(item))
    }

    pub fn tuple(parts: impl IntoIterator<Item = Schema>) -> Self {
        Self::Tuple(parts.into_iter().collect())
    }

    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Self::Object(fields.into_iter().collect())
    }

    /// `[literal, payload]` pair; the payload is only inspected when the
    /// literal matches.
    pub fn tagged(literal: &'static str, payload: Schema) -> Self {
        Self::tuple([Self::Literal(literal), payload])
    }

    fn describe(&self) -> String {
        match self {
            Self::String => "string".into(),
            Self::Number => "number".into(),
            Self::Integer => "integer".into(),
            Self::Bool => "boolean".into(),
            Self::Literal(lit) => format!("literal \"{lit}\""),
            Self::Array(_) => "array".into(),
            Self::Tuple(parts) => format!("tuple of {} elements", parts.len()),
            Self::Object(_) => "object".into(),
        }
    }
}

/// One field-level problem, addressed by a JSONPath-like string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema validation failed with {} violation(s)", .violations.len())]
pub struct SchemaError {
    pub violations: Vec<Violation>,
}

impl SchemaError {
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation {
                path: path.into(),
                message: message.into(),
            }],
        }
    }

    pub fn paths(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.path.as_str()).collect()
    }
}

/// A record type with a declared schema.
pub trait Validated: DeserializeOwned {
    fn schema() -> Schema;
}

impl<T: Validated> Validated for Vec<T> {
    fn schema() -> Schema {
        Schema::array(T::schema())
    }
}

/// Check `raw` against `T::schema()` and build the typed value.
pub fn validate<T: Validated>(raw: Value) -> Result<T, SchemaError> {
    check(&T::schema(), &raw)?;
    serde_json::from_value(raw).map_err(|e| SchemaError::single("$", e.to_string()))
}

/// Check a value against a schema without deserializing it.
pub fn check(schema: &Schema, value: &Value) -> Result<(), SchemaError> {
    let mut violations = Vec::new();
    walk(schema, value, "$", &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaError { violations })
    }
}

fn walk(schema: &Schema, value: &Value, path: &str, out: &mut Vec<Violation>) {
    match (schema, value) {
        (Schema::String, Value::String(_))
        | (Schema::Number, Value::Number(_))
        | (Schema::Bool, Value::Bool(_)) => {}
        (Schema::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {}
        (Schema::Literal(lit), Value::String(s)) if s == lit => {}
        (Schema::Literal(lit), other) => push(
            out,
            path,
            format!("expected literal \"{lit}\", got {}", describe_value(other)),
        ),
        (Schema::Array(item), Value::Array(items)) => {
            for (i, v) in items.iter().enumerate() {
                walk(item, v, &format!("{path}[{i}]"), out);
            }
        }
        (Schema::Tuple(parts), Value::Array(items)) => {
            if parts.len() != items.len() {
                push(
                    out,
                    path,
                    format!(
                        "expected tuple of {} elements, got {}",
                        parts.len(),
                        items.len()
                    ),
                );
                return;
            }
            for (i, (part, v)) in parts.iter().zip(items).enumerate() {
                let before = out.len();
                walk(part, v, &format!("{path}[{i}]"), out);
                // wrong discriminant: the payload shape is meaningless
                if i == 0 && matches!(part, Schema::Literal(_)) && out.len() > before {
                    return;
                }
            }
        }
        (Schema::Object(fields), Value::Object(map)) => {
            for field in fields {
                let field_path = format!("{path}.{}", field.name);
                match map.get(field.name) {
                    Some(v) => walk(&field.schema, v, &field_path, out),
                    None if field.required => push(out, &field_path, "required field is missing"),
                    None => {}
                }
            }
        }
        (expected, other) => push(
            out,
            path,
            format!("expected {}, got {}", expected.describe(), describe_value(other)),
        ),
    }
}

fn push(out: &mut Vec<Violation>, path: &str, message: impl Into<String>) {
    out.push(Violation {
        path: path.to_string(),
        message: message.into(),
    });
}

fn describe_value(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pair {
        name: String,
        #[serde(default)]
        rank: Option<u32>,
    }

    impl Validated for Pair {
        fn schema() -> Schema {
            Schema::object([
                Field::required("name", Schema::String),
                Field::optional("rank", Schema::Integer),
            ])
        }
    }

    #[test]
    fn accepts_and_drops_unknown_keys() {
        let out: Pair = validate(json!({ "name": "a", "extra": true })).unwrap();
        assert_eq!(
            out,
            Pair {
                name: "a".into(),
                rank: None
            }
        );
    }

    #[test]
    fn no_type_coercion() {
        let err = validate::<Pair>(json!({ "name": 5, "rank": "3" })).unwrap_err();
        assert_eq!(err.paths(), vec!["$.name", "$.rank"]);
    }

    #[test]
    fn collects_every_violation_in_arrays() {
        let err = validate::<Vec<Pair>>(json!([{ "name": "ok" }, {}, { "name": null }])).unwrap_err();
        assert_eq!(err.paths(), vec!["$[1].name", "$[2].name"]);
        assert_eq!(err.violations[0].message, "required field is missing");
        assert_eq!(err.violations[1].message, "expected string, got null");
    }

    #[test]
    fn integer_rejects_fractions() {
        let err = check(&Schema::Integer, &json!(1.5)).unwrap_err();
        assert_eq!(err.violations[0].message, "expected integer, got number");
        assert!(check(&Schema::Number, &json!(1.5)).is_ok());
    }

    #[test]
    fn tagged_pair_checks_literal_before_payload() {
        let schema = Schema::tagged("text", Schema::String);
        assert!(check(&schema, &json!(["text", "a definition"])).is_ok());

        // wrong literal: only the discriminant is reported
        let err = check(&schema, &json!(["vis", 42])).unwrap_err();
        assert_eq!(err.paths(), vec!["$[0]"]);
        assert_eq!(err.violations[0].message, "expected literal \"text\", got string");

        let err = check(&schema, &json!(["text"])).unwrap_err();
        assert_eq!(err.violations[0].message, "expected tuple of 2 elements, got 1");
    }
}

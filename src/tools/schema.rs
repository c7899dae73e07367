/// Tool Argument Schemas
///
/// Each tool declares its arguments once as a list of `ArgSpec`. The same
/// declaration renders the JSON Schema published in `tools/list` and
/// validates incoming `tools/call` arguments, so the two cannot drift apart.

use serde_json::{Map, Value, json};

use crate::core::error::ToolError;

/// Accepted JSON type of an argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgKind {
    String,
    Number,
    Integer,
    Boolean,
    /// String restricted to the listed values.
    Enum(&'static [&'static str]),
    /// Array of `{product_id, quantity}` objects.
    LineItems,
}

/// Declaration of one tool argument.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    pub description: &'static str,
    pub default: Option<Value>,
}

impl ArgSpec {
    pub fn required(name: &'static str, kind: ArgKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
            default: None,
        }
    }

    pub fn optional(name: &'static str, kind: ArgKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    fn property_schema(&self) -> Value {
        let mut schema = match self.kind {
            ArgKind::String => json!({ "type": "string" }),
            ArgKind::Number => json!({ "type": "number" }),
            ArgKind::Integer => json!({ "type": "integer" }),
            ArgKind::Boolean => json!({ "type": "boolean" }),
            ArgKind::Enum(values) => json!({ "type": "string", "enum": values }),
            ArgKind::LineItems => json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "product_id": { "type": "string" },
                        "quantity": { "type": "integer" }
                    },
                    "required": ["product_id"]
                }
            }),
        };
        if let Some(obj) = schema.as_object_mut() {
            obj.insert("description".to_string(), json!(self.description));
            if let Some(default) = &self.default {
                obj.insert("default".to_string(), default.clone());
            }
        }
        schema
    }

    /// Check `value` against the declared kind. `Ok(None)` means "treat as absent".
    fn check(&self, value: &Value) -> Result<Option<Value>, ToolError> {
        if value.is_null() {
            return Ok(None);
        }
        let bad = |expected: &str| ToolError::invalid_argument(self.name, format!("expected {}, got {}", expected, value));
        let checked = match self.kind {
            ArgKind::String => value.as_str().map(|_| value.clone()).ok_or_else(|| bad("a string"))?,
            ArgKind::Number => value
                .as_f64()
                .filter(|n| n.is_finite())
                .map(|_| value.clone())
                .ok_or_else(|| bad("a number"))?,
            ArgKind::Integer => as_integer(value).map(Value::from).ok_or_else(|| bad("an integer"))?,
            ArgKind::Boolean => value.as_bool().map(Value::from).ok_or_else(|| bad("a boolean"))?,
            ArgKind::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => value.clone(),
                _ => {
                    return Err(ToolError::invalid_argument(
                        self.name,
                        format!("must be one of {}, got {}", allowed.join(", "), value),
                    ));
                }
            },
            ArgKind::LineItems => {
                check_line_items(self.name, value)?;
                value.clone()
            }
        };
        Ok(Some(checked))
    }
}

/// Integers may arrive as whole floats (`2.0`).
pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn check_line_items(name: &str, value: &Value) -> Result<(), ToolError> {
    let items = value
        .as_array()
        .ok_or_else(|| ToolError::invalid_argument(name, "expected an array of {product_id, quantity}"))?;
    for (i, item) in items.iter().enumerate() {
        let field = |f: &str| format!("{}[{}].{}", name, i, f);
        let obj = item
            .as_object()
            .ok_or_else(|| ToolError::invalid_argument(format!("{}[{}]", name, i), "expected an object"))?;
        match obj.get("product_id") {
            Some(Value::String(_)) => {}
            Some(other) => return Err(ToolError::invalid_argument(field("product_id"), format!("expected a string, got {}", other))),
            None => return Err(ToolError::invalid_argument(field("product_id"), "missing required field")),
        }
        if let Some(q) = obj.get("quantity").filter(|q| !q.is_null()) {
            match as_integer(q) {
                Some(n) if n >= 1 => {}
                _ => return Err(ToolError::invalid_argument(field("quantity"), format!("expected an integer >= 1, got {}", q))),
            }
        }
    }
    Ok(())
}

/// JSON Schema (`inputSchema`) for a list of arguments.
pub fn input_schema(args: &[ArgSpec]) -> Value {
    let properties: Map<String, Value> = args
        .iter()
        .map(|a| (a.name.to_string(), a.property_schema()))
        .collect();
    let required: Vec<&str> = args.iter().filter(|a| a.required).map(|a| a.name).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Validated arguments with defaults filled in.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    /// Validate raw call arguments against `specs`. Unknown keys are dropped.
    pub fn validate(specs: &[ArgSpec], raw: &Value) -> Result<Self, ToolError> {
        let empty = Map::new();
        let given = match raw {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(ToolError::invalid_argument(
                    "arguments",
                    format!("expected an object, got {}", other),
                ));
            }
        };

        let mut values = Map::new();
        for spec in specs {
            let checked = match given.get(spec.name) {
                Some(value) => spec.check(value)?,
                None => None,
            };
            match (checked, &spec.default) {
                (Some(value), _) => {
                    values.insert(spec.name.to_string(), value);
                }
                (None, Some(default)) => {
                    values.insert(spec.name.to_string(), default.clone());
                }
                (None, None) if spec.required => {
                    return Err(ToolError::invalid_argument(spec.name, "missing required argument"));
                }
                (None, None) => {}
            }
        }
        Ok(Self { values })
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_f64)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(as_integer)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn required_str(&self, name: &str) -> Result<&str, ToolError> {
        self.str(name)
            .ok_or_else(|| ToolError::invalid_argument(name, "missing required argument"))
    }

    pub fn required_f64(&self, name: &str) -> Result<f64, ToolError> {
        self.f64(name)
            .ok_or_else(|| ToolError::invalid_argument(name, "missing required argument"))
    }

    pub fn required_i64(&self, name: &str) -> Result<i64, ToolError> {
        self.i64(name)
            .ok_or_else(|| ToolError::invalid_argument(name, "missing required argument"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<ArgSpec> {
        vec![
            ArgSpec::required("query", ArgKind::String, "Search text"),
            ArgSpec::optional("jurisdiction", ArgKind::Enum(&["National", "State", "City"]), "Jurisdiction"),
            ArgSpec::optional("num_coats", ArgKind::Integer, "Coats").with_default(json!(2)),
        ]
    }

    #[test]
    fn test_schema_lists_required_and_enum() {
        let schema = input_schema(&specs());
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["jurisdiction"]["enum"], json!(["National", "State", "City"]));
        assert_eq!(schema["properties"]["num_coats"]["default"], json!(2));
    }

    #[test]
    fn test_missing_required_names_field() {
        let err = Arguments::validate(&specs(), &json!({})).unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArgument {
                field: "query".to_string(),
                reason: "missing required argument".to_string()
            }
        );
    }

    #[test]
    fn test_wrong_type_and_bad_enum() {
        let err = Arguments::validate(&specs(), &json!({"query": 12})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref field, .. } if field == "query"));

        let err = Arguments::validate(&specs(), &json!({"query": "x", "jurisdiction": "County"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref field, .. } if field == "jurisdiction"));
    }

    #[test]
    fn test_defaults_and_whole_float_integers() {
        let args = Arguments::validate(&specs(), &json!({"query": "x"})).unwrap();
        assert_eq!(args.i64("num_coats"), Some(2));
        assert_eq!(args.str("jurisdiction"), None);

        let args = Arguments::validate(&specs(), &json!({"query": "x", "num_coats": 3.0})).unwrap();
        assert_eq!(args.i64("num_coats"), Some(3));

        assert!(Arguments::validate(&specs(), &json!({"query": "x", "num_coats": 2.5})).is_err());
    }

    #[test]
    fn test_null_optional_is_absent_and_extras_ignored() {
        let args = Arguments::validate(&specs(), &json!({"query": "x", "jurisdiction": null, "extra": true})).unwrap();
        assert_eq!(args.str("jurisdiction"), None);
        assert!(args.get("extra").is_none());
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        let err = Arguments::validate(&specs(), &json!([1, 2])).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref field, .. } if field == "arguments"));
    }

    #[test]
    fn test_line_items_validation() {
        let specs = vec![ArgSpec::required("items", ArgKind::LineItems, "Items")];
        assert!(Arguments::validate(&specs, &json!({"items": [{"product_id": "HD-1", "quantity": 2}]})).is_ok());

        let err = Arguments::validate(&specs, &json!({"items": [{"product_id": "HD-1", "quantity": 0}]})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref field, .. } if field == "items[0].quantity"));

        let err = Arguments::validate(&specs, &json!({"items": [{"quantity": 1}]})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref field, .. } if field == "items[0].product_id"));
    }
}

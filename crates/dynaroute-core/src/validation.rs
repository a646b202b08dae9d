//! Value validation.
//!
//! Compiled routes treat validation as an opaque capability: a [`Validator`]
//! takes a JSON value and returns either a normalized copy of it or a
//! [`ValidationError`]. [`FieldSchema`] is the validator that ships with the
//! crate. It covers the usual field rules (types, required fields, lengths,
//! ranges, allowed values) and normalizes values by trimming strings and
//! filling in defaults.
//!
//! ```
//! use dynaroute_core::{FieldSchema, Validator, ValidationOptions};
//! use serde_json::json;
//!
//! let schema = FieldSchema::object([
//!     ("device_name", FieldSchema::string().trim().required()),
//!     ("isPublished", FieldSchema::boolean().default_value(json!(false))),
//! ]);
//!
//! let normalized = schema
//!     .validate(&json!({"device_name": "  Pump  "}), &ValidationOptions::default())
//!     .unwrap();
//! assert_eq!(normalized, json!({"device_name": "Pump", "isPublished": false}));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Options for one validation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Accept object keys that the schema does not declare.
    pub allow_unknown: bool,
}

impl ValidationOptions {
    /// Options that accept undeclared keys, as used for header validation.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            allow_unknown: true,
        }
    }
}

/// Validates a value and returns its normalized form.
pub trait Validator: Send + Sync {
    /// Validates `value`. On success returns the normalized value.
    fn validate(
        &self,
        value: &Value,
        options: &ValidationOptions,
    ) -> Result<Value, ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&Value, &ValidationOptions) -> Result<Value, ValidationError> + Send + Sync,
{
    fn validate(
        &self,
        value: &Value,
        options: &ValidationOptions,
    ) -> Result<Value, ValidationError> {
        self(value, options)
    }
}

/// A validation failure at a JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The JSON path where the error occurred, such as `$.device_name`.
    pub path: String,
    /// The error message.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Serializes the error for a response body.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "name": "ValidationError",
            "path": self.path,
            "message": self.message,
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error at '{}': {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The type-specific part of a [`FieldSchema`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// A string.
    String {
        /// Trim surrounding whitespace before checking.
        trim: bool,
        /// Minimum length in characters.
        #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        /// Maximum length in characters.
        #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        /// Accepted values. Empty accepts any string.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        allowed: Vec<String>,
    },
    /// An integer.
    Integer {
        /// Minimum value.
        #[serde(skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        /// Maximum value.
        #[serde(skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    /// Any number.
    Number {
        /// Minimum value.
        #[serde(skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Maximum value.
        #[serde(skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    /// A boolean.
    Boolean,
    /// An array.
    Array {
        /// Schema for every item. Absent accepts any item.
        #[serde(skip_serializing_if = "Option::is_none")]
        items: Option<Box<FieldSchema>>,
        /// Minimum number of items.
        #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        /// Maximum number of items.
        #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    /// An object with declared properties.
    Object {
        /// Declared properties, in declaration order.
        properties: IndexMap<String, FieldSchema>,
        /// Accept undeclared keys even when the call options do not.
        #[serde(rename = "allowUnknown")]
        allow_unknown: bool,
    },
    /// Anything.
    Any,
}

/// A field validation rule.
///
/// Built in code with the constructor and modifier methods, or deserialized
/// from a schema document:
///
/// ```json
/// { "type": "string", "trim": true, "required": true, "maxLength": 64 }
/// ```
///
/// Document keys are camelCase; the snake_case spellings (`max_length`) are
/// accepted as aliases. Unknown keys, and keys that do not apply to the
/// declared type, are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldSchemaDocument")]
pub struct FieldSchema {
    /// Type-specific rules.
    #[serde(flatten)]
    pub kind: FieldKind,
    /// The field must be present and not null.
    pub required: bool,
    /// Value used when the field is absent from its object.
    ///
    /// An explicit `null` counts as present: it is kept as `null` and the
    /// default is not applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KindTag {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Any,
}

impl KindTag {
    /// Keys that apply to this type besides the shared ones.
    const fn keys(self) -> &'static [&'static str] {
        match self {
            Self::String => &["trim", "minLength", "maxLength", "allowed"],
            Self::Integer | Self::Number => &["minimum", "maximum"],
            Self::Array => &["items", "minItems", "maxItems"],
            Self::Object => &["properties", "allowUnknown"],
            Self::Boolean | Self::Any => &[],
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        }
    }
}

/// Document form of a [`FieldSchema`], checked before conversion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FieldSchemaDocument {
    #[serde(rename = "type")]
    kind: KindTag,
    #[serde(default)]
    required: bool,
    default: Option<Value>,
    description: Option<String>,
    trim: Option<bool>,
    #[serde(alias = "min_length")]
    min_length: Option<usize>,
    #[serde(alias = "max_length")]
    max_length: Option<usize>,
    allowed: Option<Vec<String>>,
    minimum: Option<serde_json::Number>,
    maximum: Option<serde_json::Number>,
    items: Option<Box<FieldSchema>>,
    #[serde(alias = "min_items")]
    min_items: Option<usize>,
    #[serde(alias = "max_items")]
    max_items: Option<usize>,
    properties: Option<IndexMap<String, FieldSchema>>,
    #[serde(alias = "allow_unknown")]
    allow_unknown: Option<bool>,
}

impl FieldSchemaDocument {
    fn present_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        [
            ("trim", self.trim.is_some()),
            ("minLength", self.min_length.is_some()),
            ("maxLength", self.max_length.is_some()),
            ("allowed", self.allowed.is_some()),
            ("minimum", self.minimum.is_some()),
            ("maximum", self.maximum.is_some()),
            ("items", self.items.is_some()),
            ("minItems", self.min_items.is_some()),
            ("maxItems", self.max_items.is_some()),
            ("properties", self.properties.is_some()),
            ("allowUnknown", self.allow_unknown.is_some()),
        ]
        .into_iter()
        .filter_map(|(key, set)| set.then_some(key))
    }
}

fn integer_bound(key: &str, bound: Option<serde_json::Number>) -> Result<Option<i64>, String> {
    bound
        .map(|n| {
            n.as_i64()
                .ok_or_else(|| format!("`{key}` of an integer field must be an integer, got {n}"))
        })
        .transpose()
}

impl TryFrom<FieldSchemaDocument> for FieldSchema {
    type Error = String;

    fn try_from(doc: FieldSchemaDocument) -> Result<Self, Self::Error> {
        let tag = doc.kind;
        if let Some(key) = doc.present_keys().find(|key| !tag.keys().contains(key)) {
            return Err(format!("`{key}` does not apply to type `{}`", tag.name()));
        }

        let kind = match tag {
            KindTag::String => FieldKind::String {
                trim: doc.trim.unwrap_or(false),
                min_length: doc.min_length,
                max_length: doc.max_length,
                allowed: doc.allowed.unwrap_or_default(),
            },
            KindTag::Integer => FieldKind::Integer {
                minimum: integer_bound("minimum", doc.minimum)?,
                maximum: integer_bound("maximum", doc.maximum)?,
            },
            KindTag::Number => FieldKind::Number {
                minimum: doc.minimum.and_then(|n| n.as_f64()),
                maximum: doc.maximum.and_then(|n| n.as_f64()),
            },
            KindTag::Boolean => FieldKind::Boolean,
            KindTag::Array => FieldKind::Array {
                items: doc.items,
                min_items: doc.min_items,
                max_items: doc.max_items,
            },
            KindTag::Object => FieldKind::Object {
                properties: doc.properties.unwrap_or_default(),
                allow_unknown: doc.allow_unknown.unwrap_or(false),
            },
            KindTag::Any => FieldKind::Any,
        };

        Ok(Self {
            kind,
            required: doc.required,
            default: doc.default,
            description: doc.description,
        })
    }
}

impl FieldSchema {
    fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            description: None,
        }
    }

    /// A string field.
    #[must_use]
    pub fn string() -> Self {
        Self::of(FieldKind::String {
            trim: false,
            min_length: None,
            max_length: None,
            allowed: Vec::new(),
        })
    }

    /// An integer field.
    #[must_use]
    pub fn integer() -> Self {
        Self::of(FieldKind::Integer {
            minimum: None,
            maximum: None,
        })
    }

    /// A number field.
    #[must_use]
    pub fn number() -> Self {
        Self::of(FieldKind::Number {
            minimum: None,
            maximum: None,
        })
    }

    /// A boolean field.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    /// An array field whose items may be anything.
    #[must_use]
    pub fn array() -> Self {
        Self::of(FieldKind::Array {
            items: None,
            min_items: None,
            max_items: None,
        })
    }

    /// An array field whose items follow `items`.
    #[must_use]
    pub fn array_of(items: FieldSchema) -> Self {
        Self::of(FieldKind::Array {
            items: Some(Box::new(items)),
            min_items: None,
            max_items: None,
        })
    }

    /// An object with the given properties.
    #[must_use]
    pub fn object<K: Into<String>>(properties: impl IntoIterator<Item = (K, FieldSchema)>) -> Self {
        Self::of(FieldKind::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
            allow_unknown: false,
        })
    }

    /// A field that accepts any value.
    #[must_use]
    pub fn any() -> Self {
        Self::of(FieldKind::Any)
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the value used when the field is absent.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Trims surrounding whitespace from string values.
    #[must_use]
    pub fn trim(mut self) -> Self {
        if let FieldKind::String { trim, .. } = &mut self.kind {
            *trim = true;
        }
        self
    }

    /// Sets the minimum string length.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        if let FieldKind::String { min_length, .. } = &mut self.kind {
            *min_length = Some(len);
        }
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        if let FieldKind::String { max_length, .. } = &mut self.kind {
            *max_length = Some(len);
        }
        self
    }

    /// Restricts a string field to the given values.
    #[must_use]
    pub fn one_of<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        if let FieldKind::String { allowed, .. } = &mut self.kind {
            *allowed = values.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Sets the integer range.
    #[must_use]
    pub fn range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        if let FieldKind::Integer { minimum, maximum } = &mut self.kind {
            *minimum = min;
            *maximum = max;
        }
        self
    }

    /// Sets the array length bounds.
    #[must_use]
    pub fn items_between(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        if let FieldKind::Array {
            min_items,
            max_items,
            ..
        } = &mut self.kind
        {
            *min_items = min;
            *max_items = max;
        }
        self
    }

    /// Accepts undeclared keys on an object field.
    #[must_use]
    pub fn allow_unknown(mut self) -> Self {
        if let FieldKind::Object { allow_unknown, .. } = &mut self.kind {
            *allow_unknown = true;
        }
        self
    }

    fn check(
        &self,
        value: &Value,
        path: &str,
        options: &ValidationOptions,
    ) -> Result<Value, ValidationError> {
        if value.is_null() {
            if self.required {
                return Err(ValidationError::new(path, "is required"));
            }
            return Ok(Value::Null);
        }

        match &self.kind {
            FieldKind::String {
                trim,
                min_length,
                max_length,
                allowed,
            } => {
                let raw = value.as_str().ok_or_else(|| type_error(path, "string", value))?;
                let s = if *trim { raw.trim() } else { raw };
                let len = s.chars().count();

                if let Some(min) = min_length {
                    if len < *min {
                        return Err(ValidationError::new(
                            path,
                            format!("length must be at least {min} characters"),
                        ));
                    }
                }
                if let Some(max) = max_length {
                    if len > *max {
                        return Err(ValidationError::new(
                            path,
                            format!("length must be at most {max} characters"),
                        ));
                    }
                }
                if !allowed.is_empty() && !allowed.iter().any(|a| a == s) {
                    return Err(ValidationError::new(
                        path,
                        format!("must be one of [{}]", allowed.join(", ")),
                    ));
                }
                Ok(Value::String(s.to_string()))
            }

            FieldKind::Integer { minimum, maximum } => {
                let n = value.as_i64().ok_or_else(|| type_error(path, "integer", value))?;
                if minimum.is_some_and(|min| n < min) || maximum.is_some_and(|max| n > max) {
                    return Err(ValidationError::new(path, format!("{n} is out of range")));
                }
                Ok(value.clone())
            }

            FieldKind::Number { minimum, maximum } => {
                let n = value.as_f64().ok_or_else(|| type_error(path, "number", value))?;
                if minimum.is_some_and(|min| n < min) || maximum.is_some_and(|max| n > max) {
                    return Err(ValidationError::new(path, format!("{n} is out of range")));
                }
                Ok(value.clone())
            }

            FieldKind::Boolean => {
                if value.is_boolean() {
                    Ok(value.clone())
                } else {
                    Err(type_error(path, "boolean", value))
                }
            }

            FieldKind::Array {
                items,
                min_items,
                max_items,
            } => {
                let arr = value.as_array().ok_or_else(|| type_error(path, "array", value))?;
                if min_items.is_some_and(|min| arr.len() < min) {
                    return Err(ValidationError::new(path, "has too few items"));
                }
                if max_items.is_some_and(|max| arr.len() > max) {
                    return Err(ValidationError::new(path, "has too many items"));
                }

                match items {
                    Some(item_schema) => arr
                        .iter()
                        .enumerate()
                        .map(|(i, item)| item_schema.check(item, &format!("{path}[{i}]"), options))
                        .collect::<Result<Vec<_>, _>>()
                        .map(Value::Array),
                    None => Ok(value.clone()),
                }
            }

            FieldKind::Object {
                properties,
                allow_unknown,
            } => {
                let obj = value.as_object().ok_or_else(|| type_error(path, "object", value))?;
                let mut normalized = Map::with_capacity(obj.len());

                for (name, schema) in properties {
                    let field_path = format!("{path}.{name}");
                    match obj.get(name) {
                        Some(field) => {
                            normalized.insert(name.clone(), schema.check(field, &field_path, options)?);
                        }
                        None if schema.required => {
                            return Err(ValidationError::new(field_path, "is required"));
                        }
                        None => {
                            if let Some(default) = &schema.default {
                                normalized.insert(name.clone(), default.clone());
                            }
                        }
                    }
                }

                for (key, field) in obj {
                    if properties.contains_key(key) {
                        continue;
                    }
                    if !(*allow_unknown || options.allow_unknown) {
                        return Err(ValidationError::new(
                            format!("{path}.{key}"),
                            "is not allowed",
                        ));
                    }
                    normalized.insert(key.clone(), field.clone());
                }

                Ok(Value::Object(normalized))
            }

            FieldKind::Any => Ok(value.clone()),
        }
    }
}

impl Validator for FieldSchema {
    fn validate(
        &self,
        value: &Value,
        options: &ValidationOptions,
    ) -> Result<Value, ValidationError> {
        self.check(value, "$", options)
    }
}

fn type_error(path: &str, expected: &str, value: &Value) -> ValidationError {
    ValidationError::new(
        path,
        format!("expected {expected}, got {}", value_type_name(value)),
    )
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
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
    use serde_json::json;

    fn strict() -> ValidationOptions {
        ValidationOptions::default()
    }

    fn device() -> FieldSchema {
        FieldSchema::object([
            ("id", FieldSchema::string().trim()),
            ("device_name", FieldSchema::string().trim().required()),
            ("isPublished", FieldSchema::boolean().default_value(json!(false))),
            ("specialties", FieldSchema::array_of(FieldSchema::string())),
            ("type", FieldSchema::string().trim().one_of(["510k"])),
        ])
    }

    #[test]
    fn test_valid_object_is_normalized() {
        let out = device()
            .validate(&json!({"device_name": " Pump ", "type": "510k "}), &strict())
            .unwrap();
        assert_eq!(
            out,
            json!({"device_name": "Pump", "isPublished": false, "type": "510k"})
        );
    }

    #[test]
    fn test_missing_required_property() {
        let err = device().validate(&json!({}), &strict()).unwrap_err();
        assert_eq!(err.path, "$.device_name");
        assert_eq!(err.message, "is required");
    }

    #[test]
    fn test_unknown_key_rejected_unless_allowed() {
        let body = json!({"device_name": "Pump", "color": "red"});

        let err = device().validate(&body, &strict()).unwrap_err();
        assert_eq!(err.path, "$.color");

        let out = device().validate(&body, &ValidationOptions::lenient()).unwrap();
        assert_eq!(out["color"], "red");

        let out = device().allow_unknown().validate(&body, &strict()).unwrap();
        assert_eq!(out["color"], "red");
    }

    #[test]
    fn test_type_mismatch() {
        let err = device()
            .validate(&json!({"device_name": 5}), &strict())
            .unwrap_err();
        assert_eq!(err.path, "$.device_name");
        assert!(err.message.contains("expected string, got number"));
    }

    #[test]
    fn test_allowed_values() {
        let err = device()
            .validate(&json!({"device_name": "Pump", "type": "pma"}), &strict())
            .unwrap_err();
        assert!(err.message.contains("510k"));
    }

    #[test]
    fn test_array_items_checked_with_index_path() {
        let err = device()
            .validate(&json!({"device_name": "Pump", "specialties": ["a", 1]}), &strict())
            .unwrap_err();
        assert_eq!(err.path, "$.specialties[1]");
    }

    #[test]
    fn test_string_lengths_after_trim() {
        let schema = FieldSchema::string().trim().min_length(2).max_length(4);
        assert!(schema.validate(&json!(" ab "), &strict()).is_ok());
        assert!(schema.validate(&json!("  a  "), &strict()).is_err());
        assert!(schema.validate(&json!("abcde"), &strict()).is_err());
    }

    #[test]
    fn test_integer_range() {
        let schema = FieldSchema::integer().range(Some(1), Some(10));
        assert!(schema.validate(&json!(5), &strict()).is_ok());
        assert!(schema.validate(&json!(0), &strict()).is_err());
        assert!(schema.validate(&json!(1.5), &strict()).is_err());
    }

    #[test]
    fn test_null_handling() {
        assert_eq!(
            FieldSchema::string().validate(&Value::Null, &strict()).unwrap(),
            Value::Null
        );
        assert!(FieldSchema::string()
            .required()
            .validate(&Value::Null, &strict())
            .is_err());
    }

    #[test]
    fn test_closure_validator() {
        let reject_all = |_: &Value, _: &ValidationOptions| -> Result<Value, ValidationError> {
            Err(ValidationError::new("$", "nope"))
        };
        assert!(reject_all.validate(&json!({}), &strict()).is_err());
    }

    #[test]
    fn test_deserialize_field_schema() {
        let schema: FieldSchema = serde_json::from_value(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "trim": true, "required": true},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        }))
        .unwrap();

        assert!(schema.validate(&json!({"name": " x "}), &strict()).is_ok());
        assert!(schema.validate(&json!({"tags": []}), &strict()).is_err());
    }

    #[test]
    fn test_deserialize_camel_case_and_aliases() {
        let schema: FieldSchema =
            serde_json::from_value(json!({"type": "string", "maxLength": 3})).unwrap();
        assert!(schema.validate(&json!("abcd"), &strict()).is_err());

        let schema: FieldSchema =
            serde_json::from_value(json!({"type": "array", "min_items": 1})).unwrap();
        assert!(schema.validate(&json!([]), &strict()).is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_keys() {
        let err = serde_json::from_value::<FieldSchema>(
            json!({"type": "string", "maxLength": 3, "bogus": true}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("bogus"));

        let nested = serde_json::from_value::<FieldSchema>(json!({
            "type": "object",
            "properties": {"name": {"type": "string", "maxLenght": 3}}
        }));
        assert!(nested.is_err());
    }

    #[test]
    fn test_deserialize_rejects_keys_of_other_types() {
        let err = serde_json::from_value::<FieldSchema>(json!({"type": "integer", "maxLength": 3}))
            .unwrap_err();
        assert!(err.to_string().contains("does not apply to type `integer`"));

        let err = serde_json::from_value::<FieldSchema>(json!({"type": "integer", "minimum": 1.5}))
            .unwrap_err();
        assert!(err.to_string().contains("must be an integer"));
    }

    #[test]
    fn test_serialized_form_reads_back() {
        let schema = FieldSchema::object([
            ("name", FieldSchema::string().trim().max_length(8).required()),
            ("count", FieldSchema::integer().range(Some(0), None)),
        ]);
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["properties"]["name"]["maxLength"], 8);
        assert_eq!(serde_json::from_value::<FieldSchema>(value).unwrap(), schema);
    }

    #[test]
    fn test_explicit_null_skips_default() {
        let schema = FieldSchema::object([(
            "isPublished",
            FieldSchema::boolean().default_value(json!(false)),
        )]);
        let out = schema.validate(&json!({"isPublished": null}), &strict()).unwrap();
        assert_eq!(out, json!({"isPublished": null}));
    }

    #[test]
    fn test_error_json() {
        let json = ValidationError::new("$.name", "is required").to_json();
        assert_eq!(json["name"], "ValidationError");
        assert_eq!(json["path"], "$.name");
    }
}

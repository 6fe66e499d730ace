//! JSON Schema descriptors for tool inputs.
//!
//! [`JsonSchema`] models the subset of JSON Schema used by MCP tool
//! definitions:
//!
//! - `type` (string, number, integer, boolean, object, array, null)
//! - `properties` and `required` for objects
//! - `items` for arrays
//! - `enum`
//! - `minLength`, `maxLength` and `pattern` for strings
//! - `minimum` and `maximum` for numbers
//!
//! Only the descriptor is modelled. Checking a value against a schema is
//! left to the caller; [`JsonSchema::check_shape`] checks the schema itself.
//!
//! # Example
//!
//! ```
//! use mcpwire_protocol::schema::{JsonSchema, StringConstraint};
//!
//! let schema = JsonSchema::object([
//!     ("name", JsonSchema::string_with([StringConstraint::MinLength(1)])),
//!     ("age", JsonSchema::integer().with_range(Some(0.0), None)),
//! ])
//! .with_required(["name"]);
//!
//! assert!(schema.check_shape().is_ok());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use mcpwire_core::ConstructionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// `"object"`
    Object,
    /// `"array"`
    Array,
    /// `"string"`
    String,
    /// `"number"`
    Number,
    /// `"integer"`
    Integer,
    /// `"boolean"`
    Boolean,
    /// `"null"`
    Null,
}

impl SchemaType {
    fn is_numeric(self) -> bool {
        matches!(self, SchemaType::Number | SchemaType::Integer)
    }

    fn admits(self, value: &Value) -> bool {
        match self {
            SchemaType::Object => value.is_object(),
            SchemaType::Array => value.is_array(),
            SchemaType::String => value.is_string(),
            SchemaType::Number => value.is_number(),
            SchemaType::Integer => value.is_i64() || value.is_u64(),
            SchemaType::Boolean => value.is_boolean(),
            SchemaType::Null => value.is_null(),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
        })
    }
}

/// Length and pattern constraints for string schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringConstraint {
    /// `minLength`
    MinLength(u64),
    /// `maxLength`
    MaxLength(u64),
    /// `pattern` (not compiled or checked)
    Pattern(String),
}

/// A schema node. Unset keywords are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchema {
    /// The `type` keyword.
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    /// Object members.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, JsonSchema>,
    /// Names of required object members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Element schema of an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,
    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    /// Minimum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Regular expression a string must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Inclusive lower bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl JsonSchema {
    /// A bare node of the given type.
    #[must_use]
    pub fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            properties: BTreeMap::new(),
            required: Vec::new(),
            items: None,
            enum_values: Vec::new(),
            min_length: None,
            max_length: None,
            pattern: None,
            minimum: None,
            maximum: None,
        }
    }

    /// `{"type":"string"}`
    #[must_use]
    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    /// `{"type":"number"}`
    #[must_use]
    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    /// `{"type":"integer"}`
    #[must_use]
    pub fn integer() -> Self {
        Self::of(SchemaType::Integer)
    }

    /// `{"type":"boolean"}`
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(SchemaType::Boolean)
    }

    /// `{"type":"null"}`
    #[must_use]
    pub fn null() -> Self {
        Self::of(SchemaType::Null)
    }

    /// A string restricted to `values`.
    pub fn string_enum<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::string();
        schema.enum_values = values.into_iter().map(|v| Value::String(v.into())).collect();
        schema
    }

    /// A number restricted to `values`.
    ///
    /// Non-finite values have no JSON form and are dropped.
    pub fn number_enum(values: impl IntoIterator<Item = f64>) -> Self {
        let mut schema = Self::number();
        schema.enum_values = values
            .into_iter()
            .filter_map(serde_json::Number::from_f64)
            .map(Value::Number)
            .collect();
        schema
    }

    /// An integer restricted to `values`.
    pub fn integer_enum(values: impl IntoIterator<Item = i64>) -> Self {
        let mut schema = Self::integer();
        schema.enum_values = values.into_iter().map(Value::from).collect();
        schema
    }

    /// A string with length or pattern constraints.
    pub fn string_with(constraints: impl IntoIterator<Item = StringConstraint>) -> Self {
        let mut schema = Self::string();
        for constraint in constraints {
            match constraint {
                StringConstraint::MinLength(n) => schema.min_length = Some(n),
                StringConstraint::MaxLength(n) => schema.max_length = Some(n),
                StringConstraint::Pattern(p) => schema.pattern = Some(p),
            }
        }
        schema
    }

    /// An array of `items`.
    #[must_use]
    pub fn array(items: JsonSchema) -> Self {
        let mut schema = Self::of(SchemaType::Array);
        schema.items = Some(Box::new(items));
        schema
    }

    /// An object with the given members.
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, JsonSchema)>,
        K: Into<String>,
    {
        let mut schema = Self::of(SchemaType::Object);
        schema.properties = properties
            .into_iter()
            .map(|(name, property)| (name.into(), property))
            .collect();
        schema
    }

    /// Sets inclusive numeric bounds.
    #[must_use]
    pub fn with_range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    /// Adds or replaces one object member.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, schema: JsonSchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Marks members as required, keeping earlier names.
    #[must_use]
    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.required.contains(&name) {
                self.required.push(name);
            }
        }
        self
    }

    /// Checks that the schema is internally consistent.
    ///
    /// Reports every problem found, each with a dotted path starting at
    /// `root`:
    ///
    /// - keywords attached to a type they do not apply to
    /// - `required` names missing from `properties`
    /// - lower bounds above upper bounds
    /// - `enum` values of the wrong type
    pub fn check_shape(&self) -> Result<(), Vec<ConstructionError>> {
        let mut errors = Vec::new();
        self.collect_shape_errors("root", &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn collect_shape_errors(&self, path: &str, errors: &mut Vec<ConstructionError>) {
        let ty = self.schema_type;
        let mut misplaced = |keyword: &str| {
            errors.push(ConstructionError::new(
                format!("{path}.{keyword}"),
                format!("does not apply to {ty} schemas"),
            ));
        };

        if ty != SchemaType::String {
            if self.min_length.is_some() {
                misplaced("minLength");
            }
            if self.max_length.is_some() {
                misplaced("maxLength");
            }
            if self.pattern.is_some() {
                misplaced("pattern");
            }
        }
        if !ty.is_numeric() {
            if self.minimum.is_some() {
                misplaced("minimum");
            }
            if self.maximum.is_some() {
                misplaced("maximum");
            }
        }
        if ty != SchemaType::Array && self.items.is_some() {
            misplaced("items");
        }
        if ty != SchemaType::Object {
            if !self.properties.is_empty() {
                misplaced("properties");
            }
            if !self.required.is_empty() {
                misplaced("required");
            }
        }

        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                errors.push(ConstructionError::new(
                    format!("{path}.minLength"),
                    format!("{min} exceeds maxLength {max}"),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.minimum, self.maximum) {
            if min > max {
                errors.push(ConstructionError::new(
                    format!("{path}.minimum"),
                    format!("{min} exceeds maximum {max}"),
                ));
            }
        }

        if ty == SchemaType::Object {
            for name in &self.required {
                if !self.properties.contains_key(name) {
                    errors.push(ConstructionError::new(
                        format!("{path}.required"),
                        format!("{name:?} is not a declared property"),
                    ));
                }
            }
        }

        for (i, value) in self.enum_values.iter().enumerate() {
            if !ty.admits(value) {
                errors.push(ConstructionError::new(
                    format!("{path}.enum[{i}]"),
                    format!("{value} is not a {ty}"),
                ));
            }
        }

        for (name, property) in &self.properties {
            property.collect_shape_errors(&format!("{path}.{name}"), errors);
        }
        if let Some(items) = &self.items {
            items.collect_shape_errors(&format!("{path}[]"), errors);
        }
    }
}

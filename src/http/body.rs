//! Field-addressable JSON request bodies.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Errors raised while reading fields from a JSON body.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BodyError {
    #[error("missing field `{0}`")]
    Missing(String),

    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },

    #[error("body is not valid JSON: {0}")]
    Unparsable(String),
}

/// A JSON object with typed getters.
///
/// Nested objects obtained through [`JsonBody::object`] report errors with
/// the full dotted path of the field.
#[derive(Debug, Clone)]
pub struct JsonBody {
    fields: Map<String, Value>,
    prefix: String,
}

impl JsonBody {
    /// Parse raw bytes. The top-level value must be an object.
    pub fn parse(bytes: &[u8]) -> Result<Self, BodyError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| BodyError::Unparsable(e.to_string()))?;
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                prefix: String::new(),
            }),
            _ => Err(BodyError::Unparsable("expected a JSON object".to_string())),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn str(&self, field: &str) -> Result<&str, BodyError> {
        self.get(field)?
            .as_str()
            .ok_or_else(|| self.invalid(field, "a string"))
    }

    pub fn string(&self, field: &str) -> Result<String, BodyError> {
        self.str(field).map(str::to_string)
    }

    pub fn i64(&self, field: &str) -> Result<i64, BodyError> {
        self.get(field)?
            .as_i64()
            .ok_or_else(|| self.invalid(field, "an integer"))
    }

    pub fn i32(&self, field: &str) -> Result<i32, BodyError> {
        let wide = self
            .get(field)?
            .as_i64()
            .ok_or_else(|| self.invalid(field, "a 32-bit integer"))?;
        i32::try_from(wide).map_err(|_| self.invalid(field, "a 32-bit integer"))
    }

    pub fn f64(&self, field: &str) -> Result<f64, BodyError> {
        self.get(field)?
            .as_f64()
            .ok_or_else(|| self.invalid(field, "a number"))
    }

    pub fn bool(&self, field: &str) -> Result<bool, BodyError> {
        self.get(field)?
            .as_bool()
            .ok_or_else(|| self.invalid(field, "a boolean"))
    }

    pub fn uuid(&self, field: &str) -> Result<Uuid, BodyError> {
        let raw = self.str(field).map_err(|_| self.invalid(field, "a UUID"))?;
        Uuid::parse_str(raw).map_err(|_| self.invalid(field, "a UUID"))
    }

    /// Nested object; errors raised through it carry the `parent.child` path.
    pub fn object(&self, field: &str) -> Result<JsonBody, BodyError> {
        match self.get(field)? {
            Value::Object(fields) => Ok(JsonBody {
                fields: fields.clone(),
                prefix: format!("{}.", self.path(field)),
            }),
            _ => Err(self.invalid(field, "an object")),
        }
    }

    pub fn array(&self, field: &str) -> Result<&[Value], BodyError> {
        self.get(field)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.invalid(field, "an array"))
    }

    /// Deserialize the whole object into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| BodyError::Unparsable(e.to_string()))
    }

    fn get(&self, field: &str) -> Result<&Value, BodyError> {
        match self.fields.get(field) {
            Some(Value::Null) | None => Err(BodyError::Missing(self.path(field))),
            Some(value) => Ok(value),
        }
    }

    fn invalid(&self, field: &str, expected: &'static str) -> BodyError {
        BodyError::InvalidField {
            field: self.path(field),
            expected,
        }
    }

    fn path(&self, field: &str) -> String {
        format!("{}{}", self.prefix, field)
    }
}

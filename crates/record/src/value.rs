//! Dynamic record values
//!
//! A [`Value`] is the unit that flows through the pipeline stages. Containers
//! are `Arc`-backed so that clones share identity: the filter can forward the
//! exact record it received, and producers can build reference cycles without
//! the type system getting in the way.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::ValueError;

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;

/// Shared, insertion-ordered map container
pub type SharedMap = Arc<RwLock<IndexMap<String, Value>>>;

/// Shared array container
pub type SharedArray = Arc<RwLock<Vec<Value>>>;

/// A dynamic record value
///
/// Scalars are stored inline. Arrays and maps are shared handles; cloning a
/// container value clones the handle, not the contents. Two container values
/// compare equal only when they point at the same underlying container.
///
/// `Undefined` models a value the JSON layer cannot represent (the serializer
/// substitutes a placeholder for it). `Float` may hold NaN or infinities,
/// which JSON also cannot represent.
#[derive(Clone, Default)]
pub enum Value {
    /// JSON null
    #[default]
    Null,
    /// A value with no JSON representation
    Undefined,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number, possibly non-finite
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Opaque byte buffer
    Bytes(Bytes),
    /// Structured error payload
    Error(Arc<ErrorValue>),
    /// Shared array
    Array(SharedArray),
    /// Shared insertion-ordered map
    Map(SharedMap),
}

impl Value {
    /// Create an empty map value
    pub fn map() -> Self {
        Self::Map(Arc::new(RwLock::new(IndexMap::new())))
    }

    /// Create an empty array value
    pub fn array() -> Self {
        Self::Array(Arc::new(RwLock::new(Vec::new())))
    }

    /// Create a map value from key/value pairs, preserving iteration order
    pub fn map_from<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map: IndexMap<String, Value> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect();
        Self::Map(Arc::new(RwLock::new(map)))
    }

    /// Create an array value from items
    pub fn array_from<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Self::Array(Arc::new(RwLock::new(items.into_iter().collect())))
    }

    /// Create a byte buffer value
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Create a structured error value
    pub fn error(error: ErrorValue) -> Self {
        Self::Error(Arc::new(error))
    }

    /// Insert a key into a map value
    ///
    /// Returns `false` (and does nothing) when this value is not a map.
    /// Inserting a clone of the map into itself is how callers build cycles.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> bool {
        match self {
            Self::Map(map) => {
                map.write().insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Append an item to an array value
    ///
    /// Returns `false` (and does nothing) when this value is not an array.
    pub fn push(&self, value: Value) -> bool {
        match self {
            Self::Array(items) => {
                items.write().push(value);
                true
            }
            _ => false,
        }
    }

    /// Look up a key in a map value
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Self::Map(map) => map.read().get(key).cloned(),
            _ => None,
        }
    }

    /// Look up an index in an array value
    pub fn get_index(&self, index: usize) -> Option<Value> {
        match self {
            Self::Array(items) => items.read().get(index).cloned(),
            _ => None,
        }
    }

    /// Snapshot the entries of a map value
    ///
    /// The returned values are handle clones; taking the snapshot releases
    /// the container lock before the caller recurses into children.
    pub fn entries(&self) -> Option<Vec<(String, Value)>> {
        match self {
            Self::Map(map) => Some(
                map.read()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Snapshot the elements of an array value
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Self::Array(items) => Some(items.read().clone()),
            _ => None,
        }
    }

    /// Identity of the underlying container, if this value is one
    ///
    /// The id is stable for the lifetime of the container and is what the
    /// serializer tracks to recognize a reference cycle.
    pub fn container_id(&self) -> Option<usize> {
        match self {
            Self::Array(items) => Some(Arc::as_ptr(items) as usize),
            Self::Map(map) => Some(Arc::as_ptr(map) as usize),
            _ => None,
        }
    }

    /// Borrow the string contents, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value is a map
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    /// Whether this value is an array
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Whether this value has no JSON representation
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Short type label for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Error(_) => "error",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    /// Export to a plain JSON tree
    ///
    /// Fails with [`ValueError::Cyclic`] when the value graph reaches itself.
    /// `Undefined` and non-finite floats export as JSON null; byte buffers
    /// and structured errors export their normalized object forms, matching
    /// what the serializer stage emits.
    pub fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        let mut path = Vec::new();
        self.to_json_inner(&mut path)
    }

    fn to_json_inner(&self, path: &mut Vec<usize>) -> Result<serde_json::Value, ValueError> {
        match self {
            Self::Null | Self::Undefined => Ok(serde_json::Value::Null),
            Self::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Self::Int(i) => Ok(serde_json::Value::from(*i)),
            Self::Float(f) => Ok(serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null)),
            Self::String(s) => Ok(serde_json::Value::String(s.clone())),
            Self::Bytes(bytes) => {
                let data: Vec<serde_json::Value> = bytes
                    .iter()
                    .map(|b| serde_json::Value::from(u64::from(*b)))
                    .collect();
                let mut obj = serde_json::Map::new();
                obj.insert("type".into(), serde_json::Value::String("Buffer".into()));
                obj.insert("data".into(), serde_json::Value::Array(data));
                Ok(serde_json::Value::Object(obj))
            }
            Self::Error(error) => Ok(error.to_json()),
            Self::Array(_) => {
                let id = self.container_id().unwrap_or_default();
                if path.contains(&id) {
                    return Err(ValueError::Cyclic);
                }
                path.push(id);
                let mut out = Vec::new();
                for item in self.elements().unwrap_or_default() {
                    out.push(item.to_json_inner(path)?);
                }
                path.pop();
                Ok(serde_json::Value::Array(out))
            }
            Self::Map(_) => {
                let id = self.container_id().unwrap_or_default();
                if path.contains(&id) {
                    return Err(ValueError::Cyclic);
                }
                path.push(id);
                let mut out = serde_json::Map::new();
                for (key, value) in self.entries().unwrap_or_default() {
                    out.insert(key, value.to_json_inner(path)?);
                }
                path.pop();
                Ok(serde_json::Value::Object(out))
            }
        }
    }
}

/// Container equality is identity, not deep equality
///
/// Deep comparison cannot terminate on cyclic values, so two array/map
/// values are equal exactly when they share the underlying container.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Arc::ptr_eq(a, b),
            (Self::Map(a), Self::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Shallow debug formatting
///
/// Containers print their size and identity instead of their contents, so
/// formatting a cyclic value terminates.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Undefined => write!(f, "Undefined"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(i) => write!(f, "Int({i})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Self::Error(e) => write!(f, "Error({:?})", e.message()),
            Self::Array(items) => {
                write!(f, "Array({} items @ {:p})", items.read().len(), Arc::as_ptr(items))
            }
            Self::Map(map) => {
                write!(f, "Map({} entries @ {:p})", map.read().len(), Arc::as_ptr(map))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<ErrorValue> for Value {
    fn from(error: ErrorValue) -> Self {
        Self::error(error)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::array_from(items.into_iter().map(Value::from))
            }
            serde_json::Value::Object(map) => {
                Self::map_from(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

/// Structured error payload
///
/// Errors carried inside records keep their shape through serialization:
/// a short machine code, a human message, and an optional nested cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    code: Option<String>,
    message: String,
    cause: Option<Box<ErrorValue>>,
}

impl ErrorValue {
    /// Create an error with a message and no code or cause
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            cause: None,
        }
    }

    /// Set the machine-readable code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the nested cause
    pub fn with_cause(mut self, cause: ErrorValue) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Machine-readable code, if any
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Nested cause, if any
    pub fn cause(&self) -> Option<&ErrorValue> {
        self.cause.as_deref()
    }

    /// The structured JSON form: code, message, cause; absent members omitted
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        if let Some(code) = &self.code {
            obj.insert("code".into(), serde_json::Value::String(code.clone()));
        }
        obj.insert(
            "message".into(),
            serde_json::Value::String(self.message.clone()),
        );
        if let Some(cause) = &self.cause {
            obj.insert("cause".into(), cause.to_json());
        }
        serde_json::Value::Object(obj)
    }
}

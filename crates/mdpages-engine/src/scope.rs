//! Render-time variables.

use serde_json::{Map, Value};

/// Reserved key holding the caller-supplied data model.
pub const MODEL_KEY: &str = "model";

/// Reserved key holding the rendered page body during template composition.
pub const BODY_KEY: &str = "body";

/// Named values visible to expressions during one render.
///
/// The `model` key is always present (`null` when no model was given).
#[derive(Clone, Debug, PartialEq)]
pub struct Scope {
    values: Map<String, Value>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::with_model(Value::Null)
    }
}

impl Scope {
    /// Create a scope with a `null` model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope holding `model`.
    #[must_use]
    pub fn with_model(model: Value) -> Self {
        let mut values = Map::new();
        values.insert(MODEL_KEY.to_owned(), model);
        Self { values }
    }

    /// Builder form of [`Scope::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Top-level value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The data model.
    #[must_use]
    pub fn model(&self) -> &Value {
        self.values.get(MODEL_KEY).unwrap_or(&Value::Null)
    }

    /// Resolve a dotted path such as `model.author.name`.
    ///
    /// Each segment after the first indexes into a JSON object, or into an
    /// array when the segment is a number.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.values.get(first)?, |value, segment| match value {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

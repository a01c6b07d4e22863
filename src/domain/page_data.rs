use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use super::sections::fold;

/// Values shared by every page taking part in one render pass, typically
/// set by the content page and read by its layouts (`Title` and friends).
/// Keys are case-insensitive.
#[derive(Debug, Default, Clone)]
pub struct PageData {
    values: HashMap<String, Value>,
}

impl PageData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(fold(key), value.into());
    }

    /// Store any serialisable value. Values that fail to serialise are stored
    /// as `null`.
    pub fn set_serialized<T: Serialize>(&mut self, key: &str, value: &T) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.values.insert(fold(key), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(&fold(key))
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(&fold(key))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(&fold(key))
    }
}

//! Key-value persistence for lightweight game data such as high scores
//!
//! Platform hosts supply their own [`KeyValueStorage`]; [`InMemoryStorage`]
//! backs tests and hosts without persistence.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Minimal typed key-value store; implementations must be thread-safe
///
/// Reading a key stored with another type yields the default.
pub trait KeyValueStorage: Send + Sync {
    /// Store a string
    fn put_string(&self, key: &str, value: &str);
    /// Read a string
    fn get_string(&self, key: &str) -> Option<String>;

    /// Store an integer
    fn put_int(&self, key: &str, value: i64);
    /// Read an integer, falling back to `default`
    fn get_int(&self, key: &str, default: i64) -> i64;

    /// Store a float
    fn put_float(&self, key: &str, value: f32);
    /// Read a float, falling back to `default`
    fn get_float(&self, key: &str, default: f32) -> f32;

    /// Store a boolean
    fn put_bool(&self, key: &str, value: bool);
    /// Read a boolean, falling back to `default`
    fn get_bool(&self, key: &str, default: bool) -> bool;

    /// Forget one key
    fn remove(&self, key: &str);
    /// Forget everything
    fn clear(&self);
}

#[derive(Debug, Clone, PartialEq)]
enum StoredValue {
    String(String),
    Int(i64),
    Float(f32),
    Bool(bool),
}

/// Process-local storage that forgets everything on exit
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    values: Mutex<HashMap<String, StoredValue>>,
}

impl InMemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }

    fn put(&self, key: &str, value: StoredValue) {
        self.values.lock().insert(key.to_owned(), value);
    }

    fn read<T>(&self, key: &str, pick: impl FnOnce(&StoredValue) -> Option<T>) -> Option<T> {
        self.values.lock().get(key).and_then(pick)
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn put_string(&self, key: &str, value: &str) {
        self.put(key, StoredValue::String(value.to_owned()));
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.read(key, |value| match value {
            StoredValue::String(s) => Some(s.clone()),
            _ => None,
        })
    }

    fn put_int(&self, key: &str, value: i64) {
        self.put(key, StoredValue::Int(value));
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.read(key, |value| match *value {
            StoredValue::Int(i) => Some(i),
            _ => None,
        })
        .unwrap_or(default)
    }

    fn put_float(&self, key: &str, value: f32) {
        self.put(key, StoredValue::Float(value));
    }

    fn get_float(&self, key: &str, default: f32) -> f32 {
        self.read(key, |value| match *value {
            StoredValue::Float(f) => Some(f),
            _ => None,
        })
        .unwrap_or(default)
    }

    fn put_bool(&self, key: &str, value: bool) {
        self.put(key, StoredValue::Bool(value));
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.read(key, |value| match *value {
            StoredValue::Bool(b) => Some(b),
            _ => None,
        })
        .unwrap_or(default)
    }

    fn remove(&self, key: &str) {
        self.values.lock().remove(key);
    }

    fn clear(&self) {
        self.values.lock().clear();
    }
}

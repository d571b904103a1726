//! Insertion-ordered hash payload.

use casein_ir::Name;

use super::Value;

/// Key/value pairs in insertion order.
///
/// Keys are compared with `Value::eql`. Hashes seen by patterns are small,
/// so lookups scan linearly.
#[derive(Clone, Debug, Default)]
pub struct HashValue {
    entries: Vec<(Value, Value)>,
}

impl HashValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        HashValue {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert or overwrite, keeping the position of an existing key.
    pub fn insert(&mut self, key: Value, value: Value) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k.eql(&key)) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.eql(key))
            .map(|(_, v)| v)
    }

    /// Look up a symbol key.
    pub fn get_symbol(&self, name: Name) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_symbol() == Some(name))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl PartialEq for HashValue {
    /// Order-independent: same size and every pair found in the other hash.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| ov == v))
    }
}

impl FromIterator<(Value, Value)> for HashValue {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut hash = HashValue::new();
        for (k, v) in iter {
            hash.insert(k, v);
        }
        hash
    }
}

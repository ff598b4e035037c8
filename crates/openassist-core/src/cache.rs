//! Session cache for out-of-band tool results.
//!
//! When a tool returns `additional_data`, the payload is stored here under
//! the tool call id so the UI layer can look it up while rendering the
//! matching message part. Entries live as long as the chat session; nothing
//! is evicted.

use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct AdditionalDataCache {
    entries: HashMap<String, Value>,
}

impl AdditionalDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload under a tool call id. First write wins: a duplicate
    /// insert for an id is ignored, so replayed completion events cannot
    /// clobber data already handed to a renderer. Returns whether the entry
    /// was stored.
    pub fn insert(&mut self, tool_call_id: impl Into<String>, data: Value) -> bool {
        let tool_call_id = tool_call_id.into();
        if self.entries.contains_key(&tool_call_id) {
            log::debug!("Ignoring duplicate additional_data for {tool_call_id}");
            return false;
        }
        self.entries.insert(tool_call_id, data);
        true
    }

    pub fn get(&self, tool_call_id: &str) -> Option<&Value> {
        self.entries.get(tool_call_id)
    }

    pub fn contains(&self, tool_call_id: &str) -> bool {
        self.entries.contains_key(tool_call_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_and_get() {
        let mut cache = AdditionalDataCache::new();
        assert!(cache.insert("call_1", json!({"rows": [1, 2]})));
        assert_eq!(cache.get("call_1").unwrap()["rows"][0], 1);
        assert!(cache.get("call_2").is_none());
    }

    #[test]
    fn first_write_wins() {
        let mut cache = AdditionalDataCache::new();
        assert!(cache.insert("call_1", json!("first")));
        assert!(!cache.insert("call_1", json!("second")));
        assert_eq!(cache.get("call_1").unwrap(), "first");
        assert_eq!(cache.len(), 1);
    }
}

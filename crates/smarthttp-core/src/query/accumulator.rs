//! Multi-value accumulation for parsed query strings

use std::collections::HashMap;

/// Ordered multimap produced by query-string parsing.
///
/// Keys compare case-insensitively and keep the spelling of their first
/// occurrence. Iteration follows first-insertion order of the keys, and the
/// values of a key follow their order in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl QueryMap {
    /// Values stored under `key`, ignoring case
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.index
            .get(&fold_key(key))
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// First value stored under `key`
    pub fn get_first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&fold_key(key))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Flatten back into `(key, value)` pairs, keys grouped in first-seen order
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.entries
            .into_iter()
            .flat_map(|(key, values)| values.into_iter().map(move |value| (key.clone(), value)))
            .collect()
    }
}

/// Collects repeated keys while a single query string is parsed.
///
/// Lives on the stack of one parse call and is consumed by
/// [`KeyValueAccumulator::into_results`].
#[derive(Debug, Default)]
pub struct KeyValueAccumulator {
    map: QueryMap,
    value_count: usize,
}

impl KeyValueAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `key`, creating the key on first sight
    pub fn append(&mut self, key: String, value: String) {
        let folded = fold_key(&key);
        match self.map.index.get(&folded) {
            Some(&slot) => self.map.entries[slot].1.push(value),
            None => {
                self.map.index.insert(folded, self.map.entries.len());
                self.map.entries.push((key, vec![value]));
            }
        }
        self.value_count += 1;
    }

    pub fn has_values(&self) -> bool {
        self.value_count > 0
    }

    pub fn key_count(&self) -> usize {
        self.map.len()
    }

    pub fn value_count(&self) -> usize {
        self.value_count
    }

    pub fn into_results(self) -> QueryMap {
        self.map
    }
}

fn fold_key(key: &str) -> String {
    key.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_grow_in_order() {
        let mut acc = KeyValueAccumulator::new();
        for value in ["1", "2", "3", "4"] {
            acc.append("id".to_string(), value.to_string());
        }
        assert_eq!(acc.key_count(), 1);
        assert_eq!(acc.value_count(), 4);

        let map = acc.into_results();
        assert_eq!(map.get("id").unwrap(), ["1", "2", "3", "4"]);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut acc = KeyValueAccumulator::new();
        acc.append("Name".to_string(), "a".to_string());
        acc.append("NAME".to_string(), "b".to_string());
        acc.append("other".to_string(), "c".to_string());

        let map = acc.into_results();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("name").unwrap(), ["a", "b"]);
        // first spelling wins
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Name", "other"]);
    }

    #[test]
    fn test_empty_accumulator() {
        let acc = KeyValueAccumulator::new();
        assert!(!acc.has_values());
        assert!(acc.into_results().is_empty());
    }

    #[test]
    fn test_into_pairs_groups_by_key() {
        let mut acc = KeyValueAccumulator::new();
        acc.append("a".to_string(), "1".to_string());
        acc.append("b".to_string(), "2".to_string());
        acc.append("a".to_string(), "3".to_string());

        let pairs = acc.into_results().into_pairs();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("a".to_string(), "3".to_string()),
                ("b".to_string(), "2".to_string()),
            ]
        );
    }
}

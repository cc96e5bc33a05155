//! Small order-preserving edits on YAML mappings, shared by the chains.
//!
//! Removal always shifts, so keys keep their relative order. Renames keep
//! the renamed key in the position of the old one.

use serde_yaml::{Mapping, Value};

/// Remove `key`, preserving the order of the remaining keys.
pub fn take(map: &mut Mapping, key: &str) -> Option<Value> {
    map.shift_remove(key)
}

/// Rename `from` to `to` in place. Does nothing if `from` is absent or
/// `to` already exists.
pub fn rename(map: &mut Mapping, from: &str, to: &str) -> bool {
    if !map.contains_key(from) || map.contains_key(to) {
        return false;
    }
    let entries = std::mem::take(map);
    for (k, v) in entries {
        if k.as_str() == Some(from) {
            map.insert(Value::from(to), v);
        } else {
            map.insert(k, v);
        }
    }
    true
}

/// Insert `value` under `key` unless a non-null value is present.
pub fn set_default(map: &mut Mapping, key: &str, value: Value) {
    match map.get_mut(key) {
        Some(existing) if !existing.is_null() => {}
        Some(existing) => *existing = value,
        None => {
            map.insert(Value::from(key), value);
        }
    }
}

/// Mutable mapping under `key`.
pub fn mapping_mut<'a>(map: &'a mut Mapping, key: &str) -> Option<&'a mut Mapping> {
    map.get_mut(key).and_then(Value::as_mapping_mut)
}

/// Mutable sequence under `key`.
pub fn sequence_mut<'a>(map: &'a mut Mapping, key: &str) -> Option<&'a mut Vec<Value>> {
    map.get_mut(key).and_then(Value::as_sequence_mut)
}

/// Apply `f` to every mapping item of the sequence under `key`, with its index.
pub fn each_mapping(map: &mut Mapping, key: &str, mut f: impl FnMut(usize, &mut Mapping)) {
    if let Some(items) = sequence_mut(map, key) {
        for (i, item) in items.iter_mut().enumerate() {
            if let Some(item) = item.as_mapping_mut() {
                f(i, item);
            }
        }
    }
}

/// Replace plain-string items of the sequence under `key` by `{field: s}`.
pub fn strings_to_objects(map: &mut Mapping, key: &str, field: &str) {
    if let Some(items) = sequence_mut(map, key) {
        for item in items.iter_mut() {
            if let Value::String(s) = item {
                let mut object = Mapping::new();
                object.insert(Value::from(field), Value::from(s.as_str()));
                *item = Value::Mapping(object);
            }
        }
    }
}

/// Wrap a non-sequence value under `key` into a one-item list.
pub fn ensure_list(map: &mut Mapping, key: &str) {
    if let Some(value) = map.get_mut(key) {
        if !value.is_sequence() && !value.is_null() {
            *value = Value::Sequence(vec![value.clone()]);
        }
    }
}

/// Build a mapping from string keys.
pub fn mapping<const N: usize>(entries: [(&str, Value); N]) -> Mapping {
    entries
        .into_iter()
        .map(|(k, v)| (Value::from(k), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn keys(m: &Mapping) -> Vec<&str> {
        m.keys().filter_map(Value::as_str).collect()
    }

    #[test]
    fn rename_keeps_position() {
        let mut m = map("a: 1\nb: 2\nc: 3\n");
        assert!(rename(&mut m, "b", "z"));
        assert_eq!(keys(&m), vec!["a", "z", "c"]);
        assert!(!rename(&mut m, "missing", "y"));
        assert!(!rename(&mut m, "a", "c"));
    }

    #[test]
    fn take_preserves_order() {
        let mut m = map("a: 1\nb: 2\nc: 3\nd: 4\n");
        assert_eq!(take(&mut m, "b"), Some(Value::from(2u64)));
        assert_eq!(keys(&m), vec!["a", "c", "d"]);
    }

    #[test]
    fn defaults_fill_null_and_absent() {
        let mut m = map("tags: ~\n");
        set_default(&mut m, "tags", Value::Sequence(Vec::new()));
        set_default(&mut m, "links", Value::Sequence(Vec::new()));
        assert_eq!(m.get("tags"), Some(&Value::Sequence(Vec::new())));
        assert!(m.contains_key("links"));
        let mut m = map("tags: [a]\n");
        set_default(&mut m, "tags", Value::Sequence(Vec::new()));
        assert_eq!(m.get("tags").and_then(Value::as_sequence).map(Vec::len), Some(1));
    }

    #[test]
    fn author_strings() {
        let mut m = map("authors: [Jane, {name: Joe}]\n");
        strings_to_objects(&mut m, "authors", "name");
        let expected: Mapping = map("authors: [{name: Jane}, {name: Joe}]\n");
        assert_eq!(m, expected);
    }

    #[test]
    fn single_values_become_lists() {
        let mut m = map("test_input: a.npy\nother: [b.npy]\n");
        ensure_list(&mut m, "test_input");
        ensure_list(&mut m, "other");
        assert_eq!(m, map("test_input: [a.npy]\nother: [b.npy]\n"));
    }
}

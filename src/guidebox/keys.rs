use serde_json::{Map, Value};

/// Guidebox keys that have a different name in the local catalog.
const RENAMED_KEYS: [(&str, &str); 2] = [
    ("alternate_titles", "alternative_titles"),
    ("id", "guidebox_id"),
];

/// Map a guidebox record onto local key names.
///
/// Keys ending in `_id` are foreign keys into guidebox's own schema and are
/// dropped; `id` and `alternate_titles` are renamed; everything else passes
/// through untouched.
pub fn map_keys(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .filter(|(key, _)| !key.ends_with("_id"))
        .map(|(key, value)| {
            let local = RENAMED_KEYS
                .iter()
                .find(|(from, _)| *from == key.as_str())
                .map_or(key.as_str(), |(_, to)| *to);
            (local.to_string(), value.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn renames_and_drops() {
        let mapped = map_keys(&object(
            json!({"id": 5, "show_id": 9, "alternate_titles": "X"}),
        ));
        assert_eq!(
            Value::Object(mapped),
            json!({"guidebox_id": 5, "alternative_titles": "X"})
        );
    }

    #[test]
    fn other_keys_pass_through() {
        let mapped = map_keys(&object(json!({
            "title": "Veep",
            "tags": [{"id": 1, "tag": "Comedy"}],
            "imdb_id": "tt1759761",
            "themoviedb": 1404,
            "identifier": "kept",
        })));

        assert_eq!(mapped.get("title"), Some(&json!("Veep")));
        assert_eq!(mapped.get("themoviedb"), Some(&json!(1404)));
        assert_eq!(mapped.get("identifier"), Some(&json!("kept")));
        // nested values are left alone
        assert_eq!(mapped.get("tags"), Some(&json!([{"id": 1, "tag": "Comedy"}])));
        assert!(!mapped.contains_key("imdb_id"));
        assert_eq!(mapped.len(), 4);
    }

    #[test]
    fn empty_record() {
        assert!(map_keys(&Map::new()).is_empty());
    }
}

//! JSON encoding of entries and of the index blob.
//!
//! The index is stored as a JSON array of keys in insertion order. Decoding
//! collapses duplicates, keeping the first occurrence.

use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn encode_value<V: Serialize + ?Sized>(value: &V) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(value)
}

pub(crate) fn decode_value<V: DeserializeOwned>(bytes: &[u8]) -> Result<V, serde_json::Error> {
    serde_json::from_slice(bytes)
}

pub(crate) fn encode_index(keys: &IndexSet<String>) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&keys.iter().collect::<Vec<_>>())
}

pub(crate) fn decode_index(bytes: &[u8]) -> Result<IndexSet<String>, serde_json::Error> {
    let keys: Vec<String> = serde_json::from_slice(bytes)?;
    Ok(keys.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_keeps_order_and_dedups() {
        let keys = decode_index(br#"["b","a","b","c"]"#).unwrap();
        assert_eq!(keys.iter().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(encode_index(&keys).unwrap(), br#"["b","a","c"]"#);
    }

    #[test]
    fn test_index_rejects_non_array() {
        assert!(decode_index(b"{\"a\":1}").is_err());
        assert!(decode_index(b"not json").is_err());
    }

    #[test]
    fn test_value_with_non_string_map_keys_fails_to_encode() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), "x");
        assert!(encode_value(&map).is_err());
    }
}

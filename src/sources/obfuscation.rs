//! Reversible obfuscation used by the published fixture payload.
//!
//! A string is percent-encoded, XOR-ed with a repeating key and base64
//! encoded. The payload is a JSON object whose keys and values are each
//! obfuscated separately; values decode to JSON documents.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::Fixture;

/// Accepts padded and unpadded input, like a browser's `atob`
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode base64 that may contain line breaks or other ASCII whitespace
pub fn decode_base64_lenient(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT.decode(compact)
}

fn xor_units(units: impl Iterator<Item = u16>, key: &[u16]) -> Vec<u16> {
    if key.is_empty() {
        return units.collect();
    }
    units
        .enumerate()
        .map(|(i, unit)| unit ^ key[i % key.len()])
        .collect()
}

/// Reverse [`encrypt_string`].
///
/// Empty input yields an empty string, an empty key returns the input
/// untouched, and any decoding failure returns the input unchanged.
pub fn decrypt_string(encrypted: &str, key: &str) -> String {
    if encrypted.is_empty() {
        return String::new();
    }
    if key.is_empty() {
        return encrypted.to_string();
    }

    let bytes = match decode_base64_lenient(encrypted) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Base64 decoding failed, keeping input: {}", e);
            return encrypted.to_string();
        }
    };

    let key_units: Vec<u16> = key.encode_utf16().collect();
    let plain: Option<String> = xor_units(bytes.into_iter().map(u16::from), &key_units)
        .into_iter()
        .map(|unit| char::from_u32(u32::from(unit)))
        .collect();
    let Some(plain) = plain else {
        return encrypted.to_string();
    };

    match urlencoding::decode(&plain) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            debug!("Percent decoding failed, keeping input: {}", e);
            encrypted.to_string()
        }
    }
}

/// Percent-encode, XOR with `key`, base64-encode.
///
/// Returns the plaintext unchanged if the XOR result cannot be represented
/// as bytes (a key with characters above U+00FF).
pub fn encrypt_string(plaintext: &str, key: &str) -> String {
    if plaintext.is_empty() {
        return String::new();
    }
    let encoded = urlencoding::encode(plaintext);
    let key_units: Vec<u16> = key.encode_utf16().collect();
    let bytes: Option<Vec<u8>> = xor_units(encoded.encode_utf16(), &key_units)
        .into_iter()
        .map(|unit| u8::try_from(unit).ok())
        .collect();
    match bytes {
        Some(bytes) => STANDARD.encode(bytes),
        None => {
            warn!("Obfuscation key produced non-byte output, leaving value in clear");
            plaintext.to_string()
        }
    }
}

/// Decode every entry of an obfuscated payload object.
///
/// An entry whose key or value cannot be decoded is kept with its raw key and
/// value. Non-object payloads decode to an empty object.
pub fn decode_entries(payload: &Value, key: &str) -> Map<String, Value> {
    let Some(entries) = payload.as_object() else {
        warn!("Fixture payload is not a JSON object");
        return Map::new();
    };

    entries
        .iter()
        .map(|(raw_key, raw_value)| {
            let decoded = raw_value
                .as_str()
                .map(|value| decrypt_string(value, key))
                .and_then(|value| serde_json::from_str::<Value>(&value).ok());
            match decoded {
                Some(value) => (decrypt_string(raw_key, key), value),
                None => {
                    warn!("Failed to decode payload entry '{}', keeping raw value", raw_key);
                    (raw_key.clone(), raw_value.clone())
                }
            }
        })
        .collect()
}

/// Fixture records from a decoded payload: the `context` array, else the
/// `matches` array, else nothing
pub fn extract_records(entries: &Map<String, Value>) -> Vec<Value> {
    ["context", "matches"]
        .iter()
        .find_map(|field| entries.get(*field).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default()
}

/// Decode an obfuscated payload into fixtures, skipping records that are
/// not fixture-shaped
pub fn decode_payload(payload: &Value, key: &str) -> Vec<Fixture> {
    let records = extract_records(&decode_entries(payload, key));
    let total = records.len();
    let fixtures: Vec<Fixture> = records
        .into_iter()
        .filter_map(|record| serde_json::from_value(record).ok())
        .collect();
    if fixtures.len() < total {
        warn!(
            "Skipped {} malformed fixture records out of {}",
            total - fixtures.len(),
            total
        );
    }
    fixtures
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: &str = "devxseven";

    #[test]
    fn decrypt_reverses_encrypt() {
        for plain in ["context", "Real Madrid vs Barcelona", "ünïcödé ⚽", "{\"a\":[1,2]}"] {
            let encrypted = encrypt_string(plain, KEY);
            assert_ne!(encrypted, plain);
            assert_eq!(decrypt_string(&encrypted, KEY), plain);
        }
    }

    #[test]
    fn decrypt_edge_cases() {
        assert_eq!(decrypt_string("", KEY), "");
        assert_eq!(decrypt_string("abc", ""), "abc");
        assert_eq!(decrypt_string("not base64 !!", KEY), "not base64 !!");
    }

    #[test]
    fn decrypt_tolerates_line_breaks() {
        let encrypted = encrypt_string("matches", KEY);
        let (head, tail) = encrypted.split_at(4);
        assert_eq!(decrypt_string(&format!("{head}\n{tail}\n"), KEY), "matches");
    }

    #[test]
    fn known_ciphertext() {
        // "a" XOR "d" = 0x05
        assert_eq!(encrypt_string("a", KEY), "BQ==");
        assert_eq!(decrypt_string("BQ==", KEY), "a");
        assert_eq!(decrypt_string("BQ", KEY), "a");
    }

    fn obfuscated(key: &str, value: &Value) -> (String, Value) {
        (
            encrypt_string(key, KEY),
            Value::String(encrypt_string(&value.to_string(), KEY)),
        )
    }

    #[test]
    fn decodes_context_payload() {
        let fixtures = json!([
            {"id": "1", "league": "Serie A", "match_time": 1_760_000_000, "links": []},
            {"no_id": true},
        ]);
        let (k, v) = obfuscated("context", &fixtures);
        let payload = Value::Object(Map::from_iter([(k, v)]));

        let decoded = decode_payload(&payload, KEY);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].league, "Serie A");
    }

    #[test]
    fn falls_back_to_matches_and_keeps_bad_entries_raw() {
        let (k, v) = obfuscated("matches", &json!([{"id": "9"}]));
        let payload = Value::Object(Map::from_iter([
            (k, v),
            ("plain".to_string(), json!(5)),
        ]));

        let entries = decode_entries(&payload, KEY);
        assert_eq!(entries.get("plain"), Some(&json!(5)));
        assert_eq!(decode_payload(&payload, KEY)[0].id, "9");
    }

    #[test]
    fn missing_lists_decode_to_nothing() {
        assert!(decode_payload(&json!({}), KEY).is_empty());
        assert!(decode_payload(&json!([1, 2]), KEY).is_empty());
    }
}

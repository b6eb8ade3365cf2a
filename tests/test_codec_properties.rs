//! Property tests for the share-token codec.
//!
//! 1. Round-trip: decode(encode(v)) == v for any JSON value
//! 2. Determinism: the same value always yields the same token
//! 3. URL safety: tokens only use characters that need no percent-encoding
//! 4. Robustness: decoding arbitrary input never panics

use proptest::prelude::*;
use recipe_share::lz_string::URI_SAFE_ALPHABET;
use recipe_share::{decode, encode};
use serde_json::Value;

// Non-finite floats have no JSON form and are written as null, so only
// finite ones can round-trip.
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::from),
        ".*".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::btree_map(".*", inner, 0..8)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

fn recipe_value() -> impl Strategy<Value = Value> {
    (
        proptest::option::of(".{0,40}"),
        proptest::option::of(prop::collection::vec(".{0,30}", 0..12)),
        proptest::option::of(prop::collection::vec(".{0,80}", 0..12)),
        prop::collection::btree_map("[a-z_]{1,12}", json_value(), 0..4),
    )
        .prop_map(|(title, ingredients, steps, extra)| {
            let mut fields = serde_json::Map::new();
            for (key, value) in extra {
                fields.insert(key, value);
            }
            if let Some(title) = title {
                fields.insert("title".to_string(), Value::from(title));
            }
            if let Some(ingredients) = ingredients {
                fields.insert("ingredients".to_string(), Value::from(ingredients));
            }
            if let Some(steps) = steps {
                fields.insert("steps".to_string(), Value::from(steps));
            }
            Value::Object(fields)
        })
}

proptest! {
    #[test]
    fn prop_finite_float_round_trip(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let recipe = serde_json::json!({"title": "Bread", "hydration": f});
        let decoded = decode(&encode(&recipe).unwrap()).unwrap();
        prop_assert_eq!(decoded["hydration"].as_f64().map(f64::to_bits), Some(f.to_bits()));
    }

    #[test]
    fn prop_round_trip(value in json_value()) {
        let token = encode(&value).unwrap();
        prop_assert_eq!(decode(&token).unwrap(), value);
    }

    #[test]
    fn prop_recipe_round_trip(recipe in recipe_value()) {
        let token = encode(&recipe).unwrap();
        prop_assert_eq!(decode(&token).unwrap(), recipe);
    }

    #[test]
    fn prop_deterministic(value in json_value()) {
        prop_assert_eq!(encode(&value).unwrap(), encode(&value).unwrap());
    }

    #[test]
    fn prop_url_safe(value in json_value()) {
        let token = encode(&value).unwrap();
        prop_assert!(!token.is_empty());
        for byte in token.bytes() {
            prop_assert!(URI_SAFE_ALPHABET.contains(&byte), "unexpected byte {:?}", byte as char);
            prop_assert!(byte.is_ascii_alphanumeric() || byte == b'+' || byte == b'-');
        }
    }

    #[test]
    fn prop_decode_never_panics(input in "\\PC*") {
        let _ = decode(&input);
    }

    #[test]
    fn prop_decode_alphabet_noise_never_panics(input in "[A-Za-z0-9+-]{0,200}") {
        let _ = decode(&input);
    }

    #[test]
    fn prop_single_character_edit_never_panics(
        recipe in recipe_value(),
        position in any::<prop::sample::Index>(),
        replacement in prop::sample::select(URI_SAFE_ALPHABET.to_vec()),
    ) {
        let token = encode(&recipe).unwrap();
        let mut bytes = token.into_bytes();
        let idx = position.index(bytes.len());
        bytes[idx] = replacement;
        let edited = String::from_utf8(bytes).unwrap();
        let _ = decode(&edited);
    }
}

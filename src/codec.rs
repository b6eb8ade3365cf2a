//! Share-token codec: any JSON value in, a compact URL-safe token out.
//!
//! The codec is schema-agnostic. It neither adds nor strips fields, so
//! whatever the caller encodes comes back deep-equal; deciding whether the
//! decoded value is a usable recipe is left to the viewer.

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::error::{InvalidToken, ShareError};
use crate::lz_string;
use crate::model::ShareableRecipe;

/// Encode `value` as a share token.
///
/// The value is serialized to compact JSON (object keys in their given
/// order) and compressed, so the same input always yields the same token.
/// Non-finite floats have no JSON form and are written as `null`.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, ShareError> {
    let json = serde_json::to_string(value).map_err(|e| ShareError::Encode(e.to_string()))?;
    let token = lz_string::compress_to_uri_component(&json);
    debug!(
        "encoded {} bytes of JSON into a {} character token",
        json.len(),
        token.len()
    );
    Ok(token)
}

/// Decode a token back into the JSON value it was built from.
pub fn decode(token: &str) -> Result<Value, InvalidToken> {
    let json = lz_string::decompress_from_uri_component(token).map_err(|e| {
        debug!("rejected {} character token: {}", token.len(), e);
        e
    })?;
    serde_json::from_str(&json).map_err(|e| {
        debug!("token decompressed but is not JSON: {}", e);
        InvalidToken::NotJson
    })
}

/// Decode a route parameter that may be absent altogether.
pub fn decode_param(token: Option<&str>) -> Result<Value, InvalidToken> {
    match token {
        Some(token) => decode(token),
        None => Err(InvalidToken::Missing),
    }
}

pub fn encode_recipe(recipe: &ShareableRecipe) -> Result<String, ShareError> {
    encode(recipe)
}

/// Decode a token into a recipe, using the same lenient field access as the
/// shared-recipe view. Payloads that are not JSON objects are rejected.
pub fn decode_recipe(token: &str) -> Result<ShareableRecipe, InvalidToken> {
    let value = decode(token)?;
    ShareableRecipe::from_value(&value).ok_or(InvalidToken::NotAnObject)
}

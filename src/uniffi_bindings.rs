//! UniFFI bindings for recipe-share
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! Share-link encoding and decoding are synchronous; only the clipboard path
//! needs the tokio runtime, and mobile hosts own their clipboard anyway.

use std::fmt;

use crate::model::KNOWN_FIELDS;
use crate::{codec, link, InvalidToken, ShareError, ShareableRecipe};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible recipe structure
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiShareableRecipe {
    /// Recipe title, if the payload has one
    pub title: Option<String>,
    /// Ingredient lines
    pub ingredients: Option<Vec<String>>,
    /// Instruction steps
    pub steps: Option<Vec<String>>,
    /// Any other payload fields, as a JSON object string ("{}" if none)
    pub extra_json: String,
}

impl From<ShareableRecipe> for FfiShareableRecipe {
    fn from(recipe: ShareableRecipe) -> Self {
        FfiShareableRecipe {
            title: recipe.title,
            ingredients: recipe.ingredients,
            steps: recipe.steps,
            extra_json: serde_json::Value::Object(recipe.extra).to_string(),
        }
    }
}

impl TryFrom<FfiShareableRecipe> for ShareableRecipe {
    type Error = FfiShareError;

    fn try_from(ffi: FfiShareableRecipe) -> Result<Self, Self::Error> {
        let extra: serde_json::Map<String, serde_json::Value> =
            if ffi.extra_json.trim().is_empty() {
                serde_json::Map::new()
            } else {
                serde_json::from_str(&ffi.extra_json).map_err(|e| FfiShareError::InvalidInput {
                    message: format!("extra_json must be a JSON object: {}", e),
                })?
            };
        if let Some(key) = KNOWN_FIELDS.iter().find(|key| extra.contains_key(**key)) {
            return Err(FfiShareError::InvalidInput {
                message: format!("extra_json must not contain \"{}\"", key),
            });
        }

        Ok(ShareableRecipe {
            title: ffi.title,
            ingredients: ffi.ingredients,
            steps: ffi.steps,
            extra,
        })
    }
}

/// FFI-compatible error type
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiShareError {
    /// Payload could not be turned into a token
    EncodeError { message: String },
    /// Token did not decode to a recipe
    InvalidToken { message: String },
    /// Invalid input provided
    InvalidInput { message: String },
    /// Anything else
    Other { message: String },
}

impl fmt::Display for FfiShareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiShareError::EncodeError { message } => write!(f, "Encode error: {}", message),
            FfiShareError::InvalidToken { message } => write!(f, "Invalid token: {}", message),
            FfiShareError::InvalidInput { message } => write!(f, "Invalid input: {}", message),
            FfiShareError::Other { message } => write!(f, "Error: {}", message),
        }
    }
}

impl std::error::Error for FfiShareError {}

impl From<ShareError> for FfiShareError {
    fn from(err: ShareError) -> Self {
        match err {
            ShareError::Encode(message) => FfiShareError::EncodeError { message },
            ShareError::InvalidToken(e) => e.into(),
            ShareError::Validation(message) | ShareError::Builder(message) => {
                FfiShareError::InvalidInput { message }
            }
            other => FfiShareError::Other {
                message: other.to_string(),
            },
        }
    }
}

impl From<InvalidToken> for FfiShareError {
    fn from(err: InvalidToken) -> Self {
        FfiShareError::InvalidToken {
            message: err.to_string(),
        }
    }
}

/// Encode a recipe into a share token
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn encode_recipe_token(recipe: FfiShareableRecipe) -> Result<String, FfiShareError> {
    let recipe = ShareableRecipe::try_from(recipe)?;
    Ok(codec::encode_recipe(&recipe)?)
}

/// Decode a share token (or a full share URL) into a recipe
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn decode_recipe_token(token: String) -> Result<FfiShareableRecipe, FfiShareError> {
    let token = link::token_from_url(&token).ok_or(InvalidToken::Missing)?;
    Ok(codec::decode_recipe(&token)?.into())
}

/// Build the share URL for a token
///
/// # Arguments
/// * `origin` - Scheme and host, e.g. "https://example.com"
/// * `base_path` - Path the web app is served under, e.g. "/app/"
/// * `token` - Token from [`encode_recipe_token`]
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn build_share_url(origin: String, base_path: String, token: String) -> String {
    link::build_share_url(&origin, &base_path, &token)
}

/// Encode a recipe and build its share URL in one step
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn share_url_for_recipe(
    recipe: FfiShareableRecipe,
    origin: String,
    base_path: String,
) -> Result<String, FfiShareError> {
    let token = encode_recipe_token(recipe)?;
    Ok(link::build_share_url(&origin, &base_path, &token))
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

//! Recipe collection core with self-contained share links.
//!
//! A shared recipe travels inside its own URL: the payload is serialized to
//! JSON, compressed and written with a URL-safe alphabet, so opening a link
//! needs no server lookup.
//!
//! ```
//! use recipe_share::{build_share_url, decode, encode};
//! use serde_json::json;
//!
//! let recipe = json!({"title": "Pancakes", "ingredients": ["flour", "egg"]});
//! let token = encode(&recipe)?;
//! assert_eq!(decode(&token)?, recipe);
//!
//! let url = build_share_url("https://example.com", "/app/", &token);
//! assert!(url.starts_with("https://example.com/app/#/shared/"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod builder;
pub mod clipboard;
pub mod codec;
pub mod config;
pub mod error;
pub mod link;
pub mod lz_string;
pub mod model;
pub mod theme;
pub mod uniffi_bindings;
pub mod viewer;

pub use backend::{RecipeStore, Session, SupabaseStore, User};
pub use builder::{RecipeSharer, ShareLinkBuilder, ShareNotice, ShareOutcome, ShareSource};
pub use clipboard::{Clipboard, NoClipboard, SystemClipboard};
pub use codec::{decode, decode_param, decode_recipe, encode, encode_recipe};
pub use config::AppConfig;
pub use error::{InvalidToken, ShareError};
pub use link::{build_share_url, token_from_url, Route, ShareUrlBuilder};
pub use model::{Recipe, RecipeDraft, ShareableRecipe, StoredRecipe};
pub use theme::{ColorScheme, ThemeContext, ThemeMode, ThemePreferences};
pub use viewer::{SharedRecipeView, ViewState};

/// Encode a recipe and build its share URL for the configured site.
pub fn share_url(recipe: &ShareableRecipe, site: &config::SiteConfig) -> Result<String, ShareError> {
    let token = encode_recipe(recipe)?;
    Ok(ShareUrlBuilder::from_site(site).share_url(&token))
}

/// Resolve a shared-recipe link (full URL or bare token) into its view.
pub fn open_shared_link(link: &str) -> SharedRecipeView {
    SharedRecipeView::load(token_from_url(link).as_deref())
}

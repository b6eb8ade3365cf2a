//! Client side of the hosted backend: accounts, recipe rows and photos.
//!
//! Nothing in the share-link path depends on this module; a shared link is
//! resolved entirely from its token.

mod supabase;

pub use supabase::SupabaseStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ShareError;
use crate::model::{RecipeDraft, StoredRecipe};

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Proof of sign-in, passed explicitly to every call that needs it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: User,
}

/// Unified trait for recipe storage backends
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// All of the user's recipes, newest first
    async fn list_recipes(&self, session: &Session) -> Result<Vec<StoredRecipe>, ShareError>;

    async fn get_recipe(&self, session: &Session, id: &str) -> Result<StoredRecipe, ShareError>;

    async fn create_recipe(
        &self,
        session: &Session,
        draft: &RecipeDraft,
    ) -> Result<StoredRecipe, ShareError>;

    async fn update_recipe(
        &self,
        session: &Session,
        id: &str,
        draft: &RecipeDraft,
    ) -> Result<StoredRecipe, ShareError>;

    async fn delete_recipe(&self, session: &Session, id: &str) -> Result<(), ShareError>;

    /// Upload a recipe photo and return its public URL
    async fn upload_photo(
        &self,
        session: &Session,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ShareError>;
}

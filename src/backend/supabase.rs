use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use super::{RecipeStore, Session};
use crate::config::BackendConfig;
use crate::error::ShareError;
use crate::model::{RecipeDraft, StoredRecipe};

const RECIPES_TABLE: &str = "recipes";

/// Recipe storage on a hosted Supabase project (auth, PostgREST and
/// object storage over HTTP)
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    anon_key: String,
    photo_bucket: String,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, ShareError> {
        Self::with_timeout(base_url, anon_key, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ShareError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("recipe-share/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(SupabaseStore {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            photo_bucket: "recipe-images".to_string(),
        })
    }

    /// Create a store from configuration
    pub fn from_config(config: &BackendConfig) -> Result<Self, ShareError> {
        let url = config.url.clone().ok_or_else(|| {
            config::ConfigError::NotFound("backend.url (RECIPE_SHARE__BACKEND__URL)".to_string())
        })?;
        let anon_key = config.anon_key.clone().ok_or_else(|| {
            config::ConfigError::NotFound(
                "backend.anon_key (RECIPE_SHARE__BACKEND__ANON_KEY)".to_string(),
            )
        })?;

        Ok(Self::with_timeout(url, anon_key, Duration::from_secs(config.timeout_secs))?
            .with_photo_bucket(config.photo_bucket.clone()))
    }

    pub fn with_photo_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.photo_bucket = bucket.into();
        self
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ShareError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let session: Session = check(response).await?.json().await?;
        info!("signed in as {}", session.user.id);
        Ok(session)
    }

    /// Register a new account.
    ///
    /// Returns a session when the project signs new users in immediately, or
    /// `None` when the address has to be confirmed first.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, ShareError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let body: Value = check(response).await?.json().await?;
        if body.get("access_token").is_some() {
            Ok(Some(serde_json::from_value(body)?))
        } else {
            debug!("sign-up pending email confirmation");
            Ok(None)
        }
    }

    pub async fn sign_out(&self, session: &Session) -> Result<(), ShareError> {
        let request = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url));
        check(self.authed(request, session).send().await?).await?;
        Ok(())
    }

    /// Public URL of an object in the photo bucket
    pub fn public_photo_url(&self, object_path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.photo_bucket, object_path
        )
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, RECIPES_TABLE)
    }

    fn authed(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    fn row_body(draft: &RecipeDraft, session: &Session) -> Value {
        json!({
            "name": draft.name,
            "ingredients": draft.ingredients,
            "instructions": draft.instructions,
            "image_url": draft.image_url,
            "user_id": session.user.id,
        })
    }
}

/// Turn a non-success response into an error carrying the backend's message.
async fn check(response: Response) -> Result<Response, ShareError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ShareError::NotAuthenticated);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| {
            ["message", "error_description", "msg", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or(body);

    Err(ShareError::Backend {
        status: status.as_u16(),
        message,
    })
}

fn first_row(mut rows: Vec<StoredRecipe>, status: u16, what: &str) -> Result<StoredRecipe, ShareError> {
    if rows.is_empty() {
        return Err(ShareError::Backend {
            status,
            message: format!("{} returned no recipe", what),
        });
    }
    Ok(rows.swap_remove(0))
}

#[async_trait]
impl RecipeStore for SupabaseStore {
    async fn list_recipes(&self, session: &Session) -> Result<Vec<StoredRecipe>, ShareError> {
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let response = check(self.authed(request, session).send().await?).await?;
        let recipes: Vec<StoredRecipe> = response.json().await?;
        debug!("loaded {} recipes", recipes.len());
        Ok(recipes)
    }

    async fn get_recipe(&self, session: &Session, id: &str) -> Result<StoredRecipe, ShareError> {
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);
        let response = check(self.authed(request, session).send().await?).await?;
        let rows: Vec<StoredRecipe> = response.json().await?;
        first_row(rows, StatusCode::NOT_FOUND.as_u16(), "lookup")
    }

    async fn create_recipe(
        &self,
        session: &Session,
        draft: &RecipeDraft,
    ) -> Result<StoredRecipe, ShareError> {
        draft.validate().map_err(ShareError::Validation)?;

        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&[Self::row_body(draft, session)]);
        let response = check(self.authed(request, session).send().await?).await?;
        let status = response.status().as_u16();
        let recipe = first_row(response.json().await?, status, "insert")?;
        info!("created recipe {}", recipe.id);
        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        session: &Session,
        id: &str,
        draft: &RecipeDraft,
    ) -> Result<StoredRecipe, ShareError> {
        draft.validate().map_err(ShareError::Validation)?;

        let request = self
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&Self::row_body(draft, session));
        let response = check(self.authed(request, session).send().await?).await?;
        let recipe = first_row(
            response.json().await?,
            StatusCode::NOT_FOUND.as_u16(),
            "update",
        )?;
        info!("updated recipe {}", recipe.id);
        Ok(recipe)
    }

    async fn delete_recipe(&self, session: &Session, id: &str) -> Result<(), ShareError> {
        let request = self
            .client
            .delete(self.table_url())
            .query(&[("id", format!("eq.{}", id))]);
        check(self.authed(request, session).send().await?).await?;
        info!("deleted recipe {}", id);
        Ok(())
    }

    async fn upload_photo(
        &self,
        session: &Session,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ShareError> {
        let object_path = match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{}/{}.{}", session.user.id, Uuid::new_v4(), ext),
            None => format!("{}/{}", session.user.id, Uuid::new_v4()),
        };

        let request = self
            .client
            .post(format!(
                "{}/storage/v1/object/{}/{}",
                self.base_url, self.photo_bucket, object_path
            ))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        check(self.authed(request, session).send().await?).await?;

        debug!("uploaded photo to {}", object_path);
        Ok(self.public_photo_url(&object_path))
    }
}

use log::{info, warn};
use serde_json::Value;

use crate::clipboard::Clipboard;
use crate::codec;
use crate::config::SiteConfig;
use crate::link::ShareUrlBuilder;
use crate::model::{Recipe, ShareableRecipe, StoredRecipe};
use crate::ShareError;

/// What is being shared
#[derive(Debug, Clone)]
pub enum ShareSource {
    /// A recipe in either canonical shape
    Recipe(Recipe),
    /// An arbitrary JSON payload, encoded as-is
    Json(Value),
}

/// How the user should be told about the new link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareNotice {
    /// The link is on the clipboard
    Copied,
    /// The link was generated but could not be copied automatically
    CopyManually,
}

impl ShareNotice {
    pub fn message(&self) -> &'static str {
        match self {
            ShareNotice::Copied => "Share link copied to clipboard",
            ShareNotice::CopyManually => "Share link generated (copy it manually)",
        }
    }
}

/// Result of a share action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareOutcome {
    pub token: String,
    pub url: String,
    pub notice: ShareNotice,
}

impl ShareOutcome {
    pub fn copied(&self) -> bool {
        self.notice == ShareNotice::Copied
    }
}

/// Builder for configuring and executing a share action
#[derive(Default)]
pub struct ShareLinkBuilder {
    source: Option<ShareSource>,
    origin: Option<String>,
    base_path: Option<String>,
    clipboard: Option<Box<dyn Clipboard>>,
}

impl std::fmt::Debug for ShareLinkBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareLinkBuilder")
            .field("source", &self.source)
            .field("origin", &self.origin)
            .field("base_path", &self.base_path)
            .field("clipboard", &self.clipboard.is_some())
            .finish()
    }
}

impl ShareLinkBuilder {
    /// Share a list-shaped recipe
    ///
    /// # Example
    /// ```
    /// use recipe_share::{RecipeSharer, ShareableRecipe};
    ///
    /// let builder = RecipeSharer::builder().recipe(ShareableRecipe {
    ///     title: Some("Pancakes".to_string()),
    ///     ..Default::default()
    /// });
    /// ```
    pub fn recipe(mut self, recipe: ShareableRecipe) -> Self {
        self.source = Some(ShareSource::Recipe(Recipe::Structured(recipe)));
        self
    }

    /// Share a recipe row loaded from the backend. It is converted to the
    /// list shape first; backend bookkeeping fields are not included.
    pub fn stored(mut self, recipe: StoredRecipe) -> Self {
        self.source = Some(ShareSource::Recipe(Recipe::Stored(recipe)));
        self
    }

    /// Share any JSON payload unchanged
    pub fn json(mut self, value: Value) -> Self {
        self.source = Some(ShareSource::Json(value));
        self
    }

    /// Set the site origin, e.g. "https://example.com"
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set the base path the app is served under
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Take origin and base path from configuration
    pub fn site(mut self, site: &SiteConfig) -> Self {
        self.origin = Some(site.origin.clone());
        self.base_path = Some(site.base_path.clone());
        self
    }

    /// Copy the finished link to this clipboard
    ///
    /// Without a clipboard the link is only returned.
    pub fn clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Some(Box::new(clipboard));
        self
    }

    /// Encode the payload, build the URL and try to copy it
    ///
    /// # Errors
    /// Returns `ShareError` if:
    /// - No source was specified
    /// - No origin was specified
    /// - The payload cannot be serialized
    ///
    /// A clipboard failure is not an error; it shows up as
    /// [`ShareNotice::CopyManually`].
    ///
    /// # Example
    /// ```
    /// # use recipe_share::{RecipeSharer, ShareNotice};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), recipe_share::ShareError> {
    /// let outcome = RecipeSharer::builder()
    ///     .json(serde_json::json!({"title": "Pancakes"}))
    ///     .origin("https://example.com")
    ///     .base_path("/app/")
    ///     .build()
    ///     .await?;
    /// assert!(outcome.url.starts_with("https://example.com/app/#/shared/"));
    /// assert_eq!(outcome.notice, ShareNotice::CopyManually);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<ShareOutcome, ShareError> {
        let source = self.source.ok_or_else(|| {
            ShareError::Builder(
                "No recipe specified. Use .recipe(), .stored() or .json()".to_string(),
            )
        })?;
        let origin = self.origin.ok_or_else(|| {
            ShareError::Builder("No origin specified. Use .origin() or .site()".to_string())
        })?;
        let base_path = self.base_path.unwrap_or_else(|| "/".to_string());

        let token = match &source {
            ShareSource::Recipe(recipe) => codec::encode(&recipe.clone().into_shareable())?,
            ShareSource::Json(value) => codec::encode(value)?,
        };
        let url = ShareUrlBuilder::new(&origin, &base_path).share_url(&token);

        let notice = match &self.clipboard {
            Some(clipboard) => match clipboard.write_text(&url).await {
                Ok(()) => ShareNotice::Copied,
                Err(e) => {
                    warn!("share link not copied: {}", e);
                    ShareNotice::CopyManually
                }
            },
            None => ShareNotice::CopyManually,
        };

        info!("generated share link ({} character token)", token.len());
        Ok(ShareOutcome { token, url, notice })
    }
}

/// Main entry point for the builder API
pub struct RecipeSharer;

impl RecipeSharer {
    /// Creates a new builder for sharing a recipe
    ///
    /// # Example
    /// ```
    /// use recipe_share::RecipeSharer;
    ///
    /// let builder = RecipeSharer::builder();
    /// ```
    pub fn builder() -> ShareLinkBuilder {
        ShareLinkBuilder::default()
    }
}

//! The read-only "shared recipe" screen.
//!
//! A view starts in [`ViewState::Loading`] and resolves exactly once, into
//! either [`ViewState::Decoded`] or [`ViewState::Invalid`]. Both are
//! terminal: a bad token cannot become good on retry, and a shared recipe is
//! never edited or re-encoded from here.

use html_escape::encode_text;
use log::{debug, warn};

use crate::codec;
use crate::error::InvalidToken;
use crate::link::Route;
use crate::model::ShareableRecipe;

/// Title shown when the payload has none.
pub const PLACEHOLDER_TITLE: &str = "Shared Recipe";

/// Message shown for any token that does not decode to a recipe.
pub const INVALID_LINK_MESSAGE: &str = "Invalid or corrupted share link.";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Decoded(RecipeView),
    Invalid(InvalidView),
}

/// What the success branch renders. Sections are `None` when the payload
/// has nothing to show for them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeView {
    pub title: String,
    pub ingredients: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidView {
    pub message: String,
    pub reason: InvalidToken,
    /// Where the "Go Home" action leads
    pub home: Route,
}

impl From<ShareableRecipe> for RecipeView {
    fn from(recipe: ShareableRecipe) -> Self {
        let title = recipe.display_title().to_string();
        let image_url = recipe
            .extra
            .get("image_url")
            .and_then(|value| value.as_str())
            .filter(|url| is_web_url(url))
            .map(str::to_string);

        RecipeView {
            title,
            ingredients: recipe.ingredients.filter(|items| !items.is_empty()),
            steps: recipe.steps.filter(|items| !items.is_empty()),
            image_url,
        }
    }
}

// Photos are only shown from http(s) addresses; the link author controls
// this value.
fn is_web_url(url: &str) -> bool {
    let url = url.trim();
    ["https://", "http://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

impl InvalidView {
    fn new(reason: InvalidToken) -> Self {
        InvalidView {
            message: INVALID_LINK_MESSAGE.to_string(),
            reason,
            home: Route::Home,
        }
    }
}

/// Consumer behind the `/shared/:token` route.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedRecipeView {
    state: ViewState,
}

impl Default for SharedRecipeView {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedRecipeView {
    pub fn new() -> Self {
        SharedRecipeView {
            state: ViewState::Loading,
        }
    }

    /// Create a view and resolve it against the route parameter right away.
    pub fn load(token: Option<&str>) -> Self {
        let mut view = Self::new();
        view.resolve(token);
        view
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, ViewState::Loading)
    }

    /// Decode the token and settle the view. Once settled, later calls leave
    /// the state untouched.
    pub fn resolve(&mut self, token: Option<&str>) -> &ViewState {
        if self.is_terminal() {
            debug!("shared recipe view already resolved, ignoring token");
            return &self.state;
        }

        self.state = match codec::decode_param(token).and_then(|value| {
            ShareableRecipe::from_value(&value).ok_or(InvalidToken::NotAnObject)
        }) {
            Ok(recipe) => ViewState::Decoded(recipe.into()),
            Err(reason) => {
                warn!("could not open shared recipe: {}", reason);
                ViewState::Invalid(InvalidView::new(reason))
            }
        };
        &self.state
    }

    pub fn render_text(&self) -> String {
        render_text(&self.state)
    }

    pub fn render_html(&self) -> String {
        render_html(&self.state)
    }
}

/// Plain-text rendering, used by the command line.
pub fn render_text(state: &ViewState) -> String {
    match state {
        ViewState::Loading => "Loading…\n".to_string(),
        ViewState::Invalid(invalid) => format!(
            "Error\n{}\nGo Home: {}\n",
            invalid.message,
            invalid.home.path()
        ),
        ViewState::Decoded(recipe) => {
            let mut out = format!("{}\n", recipe.title);
            if let Some(image_url) = &recipe.image_url {
                out.push_str(&format!("Photo: {}\n", image_url));
            }
            if let Some(ingredients) = &recipe.ingredients {
                out.push_str("\nIngredients\n");
                for ingredient in ingredients {
                    out.push_str(&format!("- {}\n", ingredient));
                }
            }
            if let Some(steps) = &recipe.steps {
                out.push_str("\nSteps\n");
                for (idx, step) in steps.iter().enumerate() {
                    out.push_str(&format!("{}. {}\n", idx + 1, step));
                }
            }
            out
        }
    }
}

/// HTML fragment for the shared view. Every piece of payload text is
/// escaped; the payload comes from whoever crafted the link.
pub fn render_html(state: &ViewState) -> String {
    match state {
        ViewState::Loading => r#"<div class="shared-recipe loading">Loading…</div>"#.to_string(),
        ViewState::Invalid(invalid) => format!(
            concat!(
                r#"<div class="shared-recipe error">"#,
                "<h1>Error</h1>",
                r#"<p class="error-message">{}</p>"#,
                r##"<a class="home" href="#{}">Go Home</a>"##,
                "</div>"
            ),
            encode_text(&invalid.message),
            invalid.home.path()
        ),
        ViewState::Decoded(recipe) => {
            let mut html = String::from(r#"<article class="shared-recipe">"#);
            html.push_str(&format!("<h1>{}</h1>", encode_text(&recipe.title)));
            if let Some(image_url) = &recipe.image_url {
                html.push_str(&format!(
                    r#"<img src="{}" alt="{}">"#,
                    html_escape::encode_double_quoted_attribute(image_url),
                    html_escape::encode_double_quoted_attribute(&recipe.title)
                ));
            }
            if let Some(ingredients) = &recipe.ingredients {
                html.push_str("<h2>Ingredients</h2><ul class=\"ingredients\">");
                for ingredient in ingredients {
                    html.push_str(&format!("<li>{}</li>", encode_text(ingredient)));
                }
                html.push_str("</ul>");
            }
            if let Some(steps) = &recipe.steps {
                html.push_str("<h2>Steps</h2><ol class=\"steps\">");
                for step in steps {
                    html.push_str(&format!("<li>{}</li>", encode_text(step)));
                }
                html.push_str("</ol>");
            }
            html.push_str("</article>");
            html
        }
    }
}

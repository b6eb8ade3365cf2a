//! Share URLs and the hash-router routes they point at.
//!
//! The application is served behind a hash router, so every route lives in
//! the URL fragment: `<origin><base>#/shared/<token>`. That keeps links
//! working on static hosts that only know about `index.html`.

use std::fmt;

use crate::config::SiteConfig;

const SHARED_SEGMENT: &str = "shared";

/// Build the share URL for `token` on the given deployment.
///
/// ```
/// use recipe_share::build_share_url;
///
/// let url = build_share_url("https://example.com", "/app/", "abc123");
/// assert_eq!(url, "https://example.com/app/#/shared/abc123");
/// ```
pub fn build_share_url(origin: &str, base_path: &str, token: &str) -> String {
    ShareUrlBuilder::new(origin, base_path).share_url(token)
}

/// Pull the token out of a full share URL, or accept a bare token as-is.
pub fn token_from_url(input: &str) -> Option<String> {
    let input = input.trim();
    match input.split_once('#') {
        Some((_, fragment)) => match Route::parse(fragment) {
            Route::Shared { token } => Some(token),
            _ => None,
        },
        None if input.contains("://") => None,
        None => Some(input.to_string()),
    }
}

/// Composes application URLs for one deployment.
///
/// Depends only on the configured origin and base path, so links survive a
/// redeploy as long as the site stays where it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareUrlBuilder {
    origin: String,
    base_path: String,
}

impl ShareUrlBuilder {
    pub fn new(origin: impl AsRef<str>, base_path: impl AsRef<str>) -> Self {
        ShareUrlBuilder {
            origin: origin.as_ref().trim().trim_end_matches('/').to_string(),
            base_path: normalize_base_path(base_path.as_ref()),
        }
    }

    pub fn from_site(site: &SiteConfig) -> Self {
        Self::new(&site.origin, &site.base_path)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn route_url(&self, route: &Route) -> String {
        format!("{}{}#{}", self.origin, self.base_path, route.path())
    }

    pub fn share_url(&self, token: &str) -> String {
        self.route_url(&Route::Shared {
            token: token.to_string(),
        })
    }
}

/// Base paths always start and end with `/`; an empty one is the site root.
fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Screens reachable through the hash router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Auth,
    Recipes,
    /// Read-only view of a shared recipe. The token is a single opaque path
    /// segment and may be empty when the link was cut short.
    Shared { token: String },
    /// Anything else; the application redirects it to [`Route::Home`].
    NotFound(String),
}

impl Route {
    /// Parse a fragment such as `#/shared/abc` or `/recipes`.
    pub fn parse(fragment: &str) -> Route {
        let path = fragment.trim().trim_start_matches('#');
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_start_matches('/');
        let trimmed = path.trim_end_matches('/');

        match trimmed.split_once('/') {
            None => match trimmed {
                "" => Route::Home,
                "auth" => Route::Auth,
                "recipes" => Route::Recipes,
                SHARED_SEGMENT => Route::Shared {
                    token: String::new(),
                },
                _ => Route::NotFound(format!("/{}", path)),
            },
            Some((SHARED_SEGMENT, token)) if !token.contains('/') => Route::Shared {
                token: token.to_string(),
            },
            Some(_) => Route::NotFound(format!("/{}", path)),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Auth => "/auth".to_string(),
            Route::Recipes => "/recipes".to_string(),
            Route::Shared { token } => format!("/{}/{}", SHARED_SEGMENT, token),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Apply the catch-all redirect: unknown paths land on the home screen.
    pub fn resolve(self) -> Route {
        match self {
            Route::NotFound(_) => Route::Home,
            route => route,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "home"),
            Route::Auth => write!(f, "auth"),
            Route::Recipes => write!(f, "recipes"),
            Route::Shared { token } => write!(f, "shared recipe ({} character token)", token.len()),
            Route::NotFound(path) => write!(f, "not found: {}", path),
        }
    }
}

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Payload keys with a dedicated field on [`ShareableRecipe`].
pub const KNOWN_FIELDS: [&str; 3] = ["title", "ingredients", "steps"];

/// The payload carried inside a share link.
///
/// Only `title`, `ingredients` and `steps` are known to the viewer. Any other
/// field rides along in `extra` and is written back out unchanged. Entries in
/// `extra` named like a known field are never written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ShareableRecipe {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub steps: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Serialize for ShareableRecipe {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if let Some(title) = &self.title {
            map.serialize_entry("title", title)?;
        }
        if let Some(ingredients) = &self.ingredients {
            map.serialize_entry("ingredients", ingredients)?;
        }
        if let Some(steps) = &self.steps {
            map.serialize_entry("steps", steps)?;
        }
        for (key, value) in &self.extra {
            if !KNOWN_FIELDS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// A recipe row as the backend stores it: free-text ingredient and
/// instruction blocks rather than lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredRecipe {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ingredients: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub instructions: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// The fields a user edits when creating or updating a recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecipeDraft {
    pub name: String,
    pub ingredients: String,
    pub instructions: String,
    pub image_url: Option<String>,
}

/// Either shape a recipe can arrive in.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipe {
    /// List-shaped, as carried in share links
    Structured(ShareableRecipe),
    /// Blob-shaped, as stored by the backend
    Stored(StoredRecipe),
}

impl Recipe {
    pub fn title(&self) -> Option<&str> {
        match self {
            Recipe::Structured(recipe) => recipe.title.as_deref(),
            Recipe::Stored(recipe) => Some(recipe.name.as_str()),
        }
    }

    pub fn into_shareable(self) -> ShareableRecipe {
        match self {
            Recipe::Structured(recipe) => recipe,
            Recipe::Stored(recipe) => recipe.into(),
        }
    }
}

impl From<ShareableRecipe> for Recipe {
    fn from(recipe: ShareableRecipe) -> Self {
        Recipe::Structured(recipe)
    }
}

impl From<StoredRecipe> for Recipe {
    fn from(recipe: StoredRecipe) -> Self {
        Recipe::Stored(recipe)
    }
}

impl From<StoredRecipe> for ShareableRecipe {
    fn from(stored: StoredRecipe) -> Self {
        let mut extra = Map::new();
        if let Some(image_url) = stored.image_url.filter(|url| !url.trim().is_empty()) {
            extra.insert("image_url".to_string(), Value::String(image_url));
        }

        ShareableRecipe {
            title: Some(stored.name).filter(|name| !name.trim().is_empty()),
            ingredients: non_empty(split_lines(&stored.ingredients)),
            steps: non_empty(split_lines(&stored.instructions)),
            extra,
        }
    }
}

impl RecipeDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Please enter a recipe name".to_string());
        }
        Ok(())
    }
}

impl From<&StoredRecipe> for RecipeDraft {
    fn from(stored: &StoredRecipe) -> Self {
        RecipeDraft {
            name: stored.name.clone(),
            ingredients: stored.ingredients.clone(),
            instructions: stored.instructions.clone(),
            image_url: stored.image_url.clone(),
        }
    }
}

impl ShareableRecipe {
    /// Best-effort read of a decoded payload.
    ///
    /// Returns `None` unless `value` is a JSON object. Known fields with the
    /// wrong type are treated as absent, non-string list entries are skipped,
    /// and the older `name` / text-block shape is adapted on the way in.
    pub fn from_value(value: &Value) -> Option<Self> {
        let mut fields = value.as_object()?.clone();

        let mut title = take_string(&mut fields, "title");
        if title.is_none() {
            if let Some(Value::String(name)) = fields.get("name") {
                title = Some(name.clone());
                fields.remove("name");
            }
        }

        let ingredients = take_list(&mut fields, "ingredients");
        let mut steps = take_list(&mut fields, "steps");
        if steps.is_none() {
            if let Some(Value::String(instructions)) = fields.get("instructions") {
                steps = non_empty(split_lines(instructions));
                fields.remove("instructions");
            }
        }

        Some(ShareableRecipe {
            title,
            ingredients,
            steps,
            extra: fields,
        })
    }

    /// Display title, falling back to a generic label.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(crate::viewer::PLACEHOLDER_TITLE)
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(text)) => Some(text),
        _ => None,
    }
}

fn take_list(fields: &mut Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match fields.remove(key)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text),
                    _ => None,
                })
                .collect(),
        ),
        // older payloads carried one newline-separated block
        Value::String(text) => non_empty(split_lines(&text)),
        _ => None,
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(lines: Vec<String>) -> Option<Vec<String>> {
    (!lines.is_empty()).then_some(lines)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

use clap::{Args, Parser, Subcommand};
use log::{debug, error};
use std::io::Read;
use std::path::{Path, PathBuf};

use recipe_share::theme::FilePreferenceStore;
use recipe_share::{
    AppConfig, ColorScheme, NoClipboard, RecipeDraft, RecipeSharer, RecipeStore, Route,
    Session, ShareError, ShareOutcome, StoredRecipe, SupabaseStore, SystemClipboard,
    ThemeContext, ThemeMode,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Share recipes through self-contained links")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the share token for a JSON recipe (file or stdin)
    Encode {
        /// JSON file to read; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Encode a JSON recipe and print its share link
    Share {
        /// JSON file to read; stdin when omitted
        file: Option<PathBuf>,
        /// Do not try to copy the link to the clipboard
        #[arg(long)]
        no_copy: bool,
    },
    /// Open a share link (or bare token) and render the recipe
    Open {
        link: String,
        /// Render an HTML fragment instead of text
        #[arg(long, conflicts_with = "json")]
        html: bool,
        /// Print the decoded JSON payload
        #[arg(long)]
        json: bool,
    },
    /// Show which screen a hash-router fragment leads to
    Route { fragment: String },
    /// Create an account
    Signup(Credentials),
    /// Manage recipes stored in the backend
    #[command(subcommand)]
    Recipes(RecipesCommand),
    /// Show or change theme preferences
    #[command(subcommand)]
    Theme(ThemeCommand),
}

#[derive(Args, Debug)]
struct Credentials {
    #[arg(long, env = "RECIPE_SHARE_EMAIL")]
    email: String,
    #[arg(long, env = "RECIPE_SHARE_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum RecipesCommand {
    /// List your recipes, newest first
    List {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Add a recipe
    Add {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long)]
        name: String,
        /// File with one ingredient per line
        #[arg(long)]
        ingredients: Option<PathBuf>,
        /// File with the cooking instructions
        #[arg(long)]
        instructions: Option<PathBuf>,
        /// Photo to upload
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Edit a recipe; anything not given keeps its current value
    Edit {
        #[command(flatten)]
        credentials: Credentials,
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// File with one ingredient per line
        #[arg(long)]
        ingredients: Option<PathBuf>,
        /// File with the cooking instructions
        #[arg(long)]
        instructions: Option<PathBuf>,
        /// New photo to upload
        #[arg(long, conflicts_with = "remove_photo")]
        photo: Option<PathBuf>,
        #[arg(long)]
        remove_photo: bool,
    },
    /// Delete a recipe
    Delete {
        #[command(flatten)]
        credentials: Credentials,
        id: String,
    },
    /// Print a share link for one of your recipes
    Share {
        #[command(flatten)]
        credentials: Credentials,
        id: String,
        #[arg(long)]
        no_copy: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ThemeCommand {
    Show,
    Set {
        #[arg(long)]
        mode: Option<ThemeMode>,
        #[arg(long)]
        color: Option<ColorScheme>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    debug!("{:?}", config);

    match cli.command {
        Command::Encode { file } => {
            let payload = read_json(file.as_deref())?;
            println!("{}", recipe_share::encode(&payload)?);
        }
        Command::Share { file, no_copy } => {
            let payload = read_json(file.as_deref())?;
            let builder = RecipeSharer::builder().json(payload).site(&config.site);
            let builder = if no_copy {
                builder
            } else {
                builder.clipboard(SystemClipboard::new())
            };
            report_share(&builder.build().await?);
        }
        Command::Open { link, html, json } => {
            if json {
                let token = recipe_share::token_from_url(&link);
                let value = recipe_share::decode_param(token.as_deref())?;
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }
            let view = recipe_share::open_shared_link(&link);
            if html {
                println!("{}", view.render_html());
            } else {
                print!("{}", view.render_text());
            }
        }
        Command::Route { fragment } => {
            let route = Route::parse(&fragment);
            println!("{} -> {}", route, route.clone().resolve().path());
        }
        Command::Signup(credentials) => {
            let store = SupabaseStore::from_config(&config.backend)?;
            match store.sign_up(&credentials.email, &credentials.password).await? {
                Some(session) => println!("Account created, signed in as {}", session.user.id),
                None => println!("Check your email to confirm the account"),
            }
        }
        Command::Recipes(command) => run_recipes(command, &config).await?,
        Command::Theme(command) => {
            let mut theme = ThemeContext::new(FilePreferenceStore::new(&config.preferences.path));
            if let ThemeCommand::Set { mode, color } = command {
                if let Some(mode) = mode {
                    theme.set_mode(mode)?;
                }
                if let Some(color) = color {
                    theme.set_color_scheme(color)?;
                }
            }
            let preferences = theme.preferences();
            println!("mode: {}", preferences.mode);
            println!(
                "color scheme: {} ({})",
                preferences.color_scheme.label(),
                preferences.color_scheme.swatch()
            );
        }
    }

    Ok(())
}

async fn run_recipes(command: RecipesCommand, config: &AppConfig) -> Result<(), ShareError> {
    let store = SupabaseStore::from_config(&config.backend)?;

    match command {
        RecipesCommand::List { credentials } => {
            let session = sign_in(&store, &credentials).await?;
            let recipes = store.list_recipes(&session).await?;
            if recipes.is_empty() {
                println!("No recipes yet");
            }
            for recipe in recipes {
                println!("{}\t{}", recipe.id, recipe.name);
            }
        }
        RecipesCommand::Add {
            credentials,
            name,
            ingredients,
            instructions,
            photo,
        } => {
            let session = sign_in(&store, &credentials).await?;
            let image_url = match photo {
                Some(path) => Some(upload_photo(&store, &session, &path).await?),
                None => None,
            };
            let draft = RecipeDraft {
                name,
                ingredients: read_optional(ingredients.as_deref()).await?,
                instructions: read_optional(instructions.as_deref()).await?,
                image_url,
            };
            let recipe = store.create_recipe(&session, &draft).await?;
            println!("Recipe created: {}", recipe.id);
        }
        RecipesCommand::Edit {
            credentials,
            id,
            name,
            ingredients,
            instructions,
            photo,
            remove_photo,
        } => {
            let session = sign_in(&store, &credentials).await?;
            let image_url = match photo {
                Some(path) => Some(Some(upload_photo(&store, &session, &path).await?)),
                None if remove_photo => Some(None),
                None => None,
            };
            let edits = RecipeEdits {
                name,
                ingredients: read_if_given(ingredients.as_deref()).await?,
                instructions: read_if_given(instructions.as_deref()).await?,
                image_url,
            };
            let recipe = edit_recipe(&store, &session, &id, edits).await?;
            println!("Recipe updated: {}", recipe.id);
        }
        RecipesCommand::Delete { credentials, id } => {
            let session = sign_in(&store, &credentials).await?;
            store.delete_recipe(&session, &id).await?;
            println!("Recipe deleted");
        }
        RecipesCommand::Share {
            credentials,
            id,
            no_copy,
        } => {
            let session = sign_in(&store, &credentials).await?;
            let recipe = store.get_recipe(&session, &id).await?;
            let builder = RecipeSharer::builder().stored(recipe).site(&config.site);
            let outcome = if no_copy {
                builder.clipboard(NoClipboard).build().await?
            } else {
                builder.clipboard(SystemClipboard::new()).build().await?
            };
            report_share(&outcome);
        }
    }

    Ok(())
}

/// Field changes for `recipes edit`; `None` keeps the stored value
#[derive(Debug, Default)]
struct RecipeEdits {
    name: Option<String>,
    ingredients: Option<String>,
    instructions: Option<String>,
    image_url: Option<Option<String>>,
}

async fn edit_recipe(
    store: &dyn RecipeStore,
    session: &Session,
    id: &str,
    edits: RecipeEdits,
) -> Result<StoredRecipe, ShareError> {
    let current = store.get_recipe(session, id).await?;
    let mut draft = RecipeDraft::from(&current);
    if let Some(name) = edits.name {
        draft.name = name;
    }
    if let Some(ingredients) = edits.ingredients {
        draft.ingredients = ingredients;
    }
    if let Some(instructions) = edits.instructions {
        draft.instructions = instructions;
    }
    if let Some(image_url) = edits.image_url {
        draft.image_url = image_url;
    }
    store.update_recipe(session, id, &draft).await
}

async fn sign_in(store: &SupabaseStore, credentials: &Credentials) -> Result<Session, ShareError> {
    store.sign_in(&credentials.email, &credentials.password).await
}

async fn upload_photo(
    store: &SupabaseStore,
    session: &Session,
    path: &Path,
) -> Result<String, ShareError> {
    let bytes = tokio::fs::read(path).await?;
    let content_type = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("photo");
    store
        .upload_photo(session, file_name, bytes, content_type)
        .await
}

async fn read_optional(path: Option<&Path>) -> Result<String, ShareError> {
    match path {
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
        None => Ok(String::new()),
    }
}

async fn read_if_given(path: Option<&Path>) -> Result<Option<String>, ShareError> {
    match path {
        Some(path) => Ok(Some(tokio::fs::read_to_string(path).await?)),
        None => Ok(None),
    }
}

fn read_json(file: Option<&Path>) -> Result<serde_json::Value, ShareError> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    serde_json::from_str(&text).map_err(|e| {
        error!("input is not valid JSON: {}", e);
        ShareError::Json(e)
    })
}

fn report_share(outcome: &ShareOutcome) {
    println!("{}", outcome.url);
    eprintln!("{}", outcome.notice.message());
}

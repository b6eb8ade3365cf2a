use recipe_share::viewer::{INVALID_LINK_MESSAGE, PLACEHOLDER_TITLE};
use recipe_share::{
    build_share_url, decode, encode, open_shared_link, share_url, InvalidToken, Route,
    ShareableRecipe, SharedRecipeView, ViewState,
};
use scraper::{Html, Selector};
use serde_json::json;

// Tokens produced by the web client (lz-string compressToEncodedURIComponent
// over JSON.stringify output).
const WEB_PANCAKES: &str = "N4IgLglmA2CmIC4QAUCGA7Axqg1rAziADQgToDmATrACYSzpiEIDaIAZtAPYCulxIWOXIgAuiXxhYAB2ZsAthAAeAzFy44xAXyA";
const WEB_CREME_BRULEE: &str = "N4IgLglmA2CmIC4QGEBOALgtrABAI1QG-oBL3QHg3A7fZABoQIA7Ac1VgBMJYGwBnRAbRABWAAwjM0HAGNWAQ0y0QARjFMcPAK5NZqEAF06PMLAAOfBIIBCsgNa5ZYHEtEAG5IoAqAe1RSAFjhgfrhgXib6hrCoAG6MTOYAbAC+QA";
const WEB_LEGACY_SOUP: &str = "N4IgdghgtgpiBcIDyAbAJgAgMoHsCuADiADQgCWYA5gE4xpkxgAuAzgiAO4RMzUA6YFhBRMS5QU2p4AxkzI5B7AEI4yKEAF8gA";

fn select_texts(html: &Html, selector: &str) -> Vec<String> {
    let selector = Selector::parse(selector).unwrap();
    html.select(&selector)
        .map(|element| element.text().collect::<String>())
        .collect()
}

#[test]
fn test_pancakes_round_trip() {
    let recipe = json!({
        "title": "Pancakes",
        "ingredients": ["flour", "egg"],
        "steps": ["mix", "cook"]
    });
    let token = encode(&recipe).unwrap();
    assert_eq!(decode(&token).unwrap(), recipe);
}

#[test]
fn test_tokens_match_web_client() {
    let recipe = json!({
        "title": "Pancakes",
        "ingredients": ["flour", "egg"],
        "steps": ["mix", "cook"]
    });
    assert_eq!(encode(&recipe).unwrap(), WEB_PANCAKES);

    let brulee = json!({
        "title": "Crème brûlée 🍮",
        "ingredients": ["500ml cream", "100g sugar"],
        "steps": ["Bake at 150°C", "Torch the top"],
        "servings": 6
    });
    assert_eq!(encode(&brulee).unwrap(), WEB_CREME_BRULEE);
    assert_eq!(decode(WEB_CREME_BRULEE).unwrap(), brulee);
}

#[test]
fn test_share_url_scenario() {
    assert_eq!(
        build_share_url("https://example.com", "/app/", "abc123"),
        "https://example.com/app/#/shared/abc123"
    );
}

#[test]
fn test_share_url_from_site_config() {
    let site = recipe_share::config::SiteConfig {
        origin: "https://someone.github.io".to_string(),
        base_path: "my-recipes".to_string(),
    };
    let recipe = ShareableRecipe {
        title: Some("Pancakes".to_string()),
        ..Default::default()
    };
    let url = share_url(&recipe, &site).unwrap();
    assert!(url.starts_with("https://someone.github.io/my-recipes/#/shared/"));

    let view = open_shared_link(&url);
    match view.state() {
        ViewState::Decoded(recipe) => assert_eq!(recipe.title, "Pancakes"),
        other => panic!("expected decoded recipe, got {:?}", other),
    }
}

#[test]
fn test_empty_token_route_is_invalid() {
    let route = Route::parse("#/shared/");
    let token = match route {
        Route::Shared { token } => token,
        other => panic!("expected shared route, got {:?}", other),
    };
    let view = SharedRecipeView::load(Some(&token));
    assert!(view.is_terminal());
    match view.state() {
        ViewState::Invalid(invalid) => {
            assert_eq!(invalid.message, INVALID_LINK_MESSAGE);
            assert_eq!(invalid.reason, InvalidToken::Missing);
            assert_eq!(invalid.home, Route::Home);
        }
        other => panic!("expected invalid state, got {:?}", other),
    }
}

#[test]
fn test_empty_object_round_trip() {
    let token = encode(&json!({})).unwrap();
    assert_eq!(decode(&token).unwrap(), json!({}));

    // and the viewer shows it with the placeholder title and no sections
    let text = SharedRecipeView::load(Some(&token)).render_text();
    assert_eq!(text, format!("{}\n", PLACEHOLDER_TITLE));
}

#[test]
fn test_invalid_inputs_never_escape() {
    assert!(decode("").is_err());
    assert!(decode("not-a-real-token").is_err());
    assert_eq!(
        recipe_share::decode_param(None),
        Err(InvalidToken::Missing)
    );
}

#[test]
fn test_legacy_payload_renders() {
    let view = SharedRecipeView::load(Some(WEB_LEGACY_SOUP));
    let text = view.render_text();
    assert_eq!(
        text,
        "Old Soup\n\nIngredients\n- water\n- salt\n\nSteps\n1. Boil\n"
    );
}

#[test]
fn test_html_sections() {
    let view = SharedRecipeView::load(Some(WEB_PANCAKES));
    let html = Html::parse_fragment(&view.render_html());

    assert_eq!(select_texts(&html, "h1"), vec!["Pancakes"]);
    assert_eq!(select_texts(&html, "ul.ingredients > li"), vec!["flour", "egg"]);
    assert_eq!(select_texts(&html, "ol.steps > li"), vec!["mix", "cook"]);
}

#[test]
fn test_html_omits_missing_sections() {
    let token = encode(&json!({"title": "Water", "steps": ["Pour"]})).unwrap();
    let html = Html::parse_fragment(&SharedRecipeView::load(Some(&token)).render_html());

    assert!(select_texts(&html, "ul.ingredients").is_empty());
    assert_eq!(select_texts(&html, "h2"), vec!["Steps"]);
}

#[test]
fn test_html_error_state_links_home() {
    let html = Html::parse_fragment(&open_shared_link("https://example.com/#/shared/%%%").render_html());

    assert_eq!(select_texts(&html, "h1"), vec!["Error"]);
    assert_eq!(select_texts(&html, "p.error-message"), vec![INVALID_LINK_MESSAGE]);

    let link = Selector::parse("a.home").unwrap();
    let href = html
        .select(&link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .unwrap();
    assert_eq!(href, "#/");
}

#[test]
fn test_image_url_extra_field_is_shown() {
    let token = encode(&json!({
        "title": "Focaccia",
        "image_url": "https://cdn.example.com/focaccia.jpg?w=800&h=600"
    }))
    .unwrap();
    let html = Html::parse_fragment(&SharedRecipeView::load(Some(&token)).render_html());
    let img = Selector::parse("img").unwrap();
    let src = html
        .select(&img)
        .next()
        .and_then(|img| img.value().attr("src"))
        .unwrap();
    assert_eq!(src, "https://cdn.example.com/focaccia.jpg?w=800&h=600");
}

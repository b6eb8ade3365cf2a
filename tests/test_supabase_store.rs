use mockito::Matcher;
use recipe_share::{RecipeDraft, RecipeStore, Session, ShareError, SupabaseStore, User};
use serde_json::json;

const ANON_KEY: &str = "anon-test-key";

fn session() -> Session {
    Session {
        access_token: "user-token".to_string(),
        refresh_token: None,
        expires_in: Some(3600),
        user: User {
            id: "user-1".to_string(),
            email: Some("cook@example.com".to_string()),
        },
    }
}

fn recipe_row(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "ingredients": "flour\negg",
        "instructions": null,
        "image_url": null,
        "user_id": "user-1",
        "created_at": "2024-03-01T10:00:00Z"
    })
}

#[tokio::test]
async fn test_sign_in_returns_session() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
        .match_header("apikey", ANON_KEY)
        .match_body(Matcher::PartialJson(json!({
            "email": "cook@example.com",
            "password": "hunter22"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "user-token",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh",
                "user": {"id": "user-1", "email": "cook@example.com", "aud": "authenticated"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    let session = store.sign_in("cook@example.com", "hunter22").await.unwrap();

    assert_eq!(session.access_token, "user-token");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh"));
    assert_eq!(session.user.id, "user-1");
}

#[tokio::test]
async fn test_sign_in_with_wrong_password_reports_backend_message() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    match store.sign_in("cook@example.com", "nope").await {
        Err(ShareError::Backend { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid login credentials");
        }
        other => panic!("expected backend error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sign_up_pending_confirmation() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/auth/v1/signup")
        .with_status(200)
        .with_body(r#"{"id":"user-2","email":"new@example.com","confirmation_sent_at":"2024-03-01T10:00:00Z"}"#)
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    let session = store.sign_up("new@example.com", "hunter22").await.unwrap();
    assert!(session.is_none());
}

#[tokio::test]
async fn test_list_recipes_newest_first() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/recipes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "*".into()),
            Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
        ]))
        .match_header("apikey", ANON_KEY)
        .match_header("authorization", "Bearer user-token")
        .with_status(200)
        .with_body(json!([recipe_row("2", "Soup"), recipe_row("1", "Pancakes")]).to_string())
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    let recipes = store.list_recipes(&session()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(recipes.len(), 2);
    assert_eq!(recipes[0].name, "Soup");
    assert_eq!(recipes[0].ingredients, "flour\negg");
    // null instructions come back as an empty block
    assert_eq!(recipes[0].instructions, "");
}

#[tokio::test]
async fn test_expired_session_is_not_authenticated() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/rest/v1/recipes")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message":"JWT expired"}"#)
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    let result = store.list_recipes(&session()).await;
    assert!(matches!(result, Err(ShareError::NotAuthenticated)));
}

#[tokio::test]
async fn test_create_recipe_sends_owner() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/recipes")
        .match_header("prefer", "return=representation")
        .match_body(Matcher::PartialJson(json!([{
            "name": "Pancakes",
            "user_id": "user-1"
        }])))
        .with_status(201)
        .with_body(json!([recipe_row("7", "Pancakes")]).to_string())
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    let draft = RecipeDraft {
        name: "Pancakes".to_string(),
        ingredients: "flour\negg".to_string(),
        ..Default::default()
    };
    let recipe = store.create_recipe(&session(), &draft).await.unwrap();

    mock.assert_async().await;
    assert_eq!(recipe.id, "7");
}

#[tokio::test]
async fn test_create_recipe_requires_name() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/recipes")
        .expect(0)
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    let draft = RecipeDraft {
        name: "   ".to_string(),
        ..Default::default()
    };
    match store.create_recipe(&session(), &draft).await {
        Err(ShareError::Validation(message)) => {
            assert_eq!(message, "Please enter a recipe name")
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_update_missing_recipe() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("PATCH", "/rest/v1/recipes")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.99".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    let draft = RecipeDraft {
        name: "Ghost".to_string(),
        ..Default::default()
    };
    let result = store.update_recipe(&session(), "99", &draft).await;
    assert!(matches!(result, Err(ShareError::Backend { status: 404, .. })));
}

#[tokio::test]
async fn test_delete_recipe() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/rest/v1/recipes")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.42".into()))
        .match_header("authorization", "Bearer user-token")
        .with_status(204)
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    store.delete_recipe(&session(), "42").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_photo_returns_public_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock(
            "POST",
            Matcher::Regex(r"^/storage/v1/object/recipe-images/user-1/[0-9a-f-]{36}\.jpg$".into()),
        )
        .match_header("content-type", "image/jpeg")
        .with_status(200)
        .with_body(r#"{"Key":"recipe-images/user-1/photo.jpg"}"#)
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    let url = store
        .upload_photo(&session(), "pancakes.jpg", vec![0xff, 0xd8, 0xff], "image/jpeg")
        .await
        .unwrap();

    mock.assert_async().await;
    let prefix = format!("{}/storage/v1/object/public/recipe-images/user-1/", server.url());
    assert!(url.starts_with(&prefix), "unexpected url {}", url);
    assert!(url.ends_with(".jpg"));
}

#[tokio::test]
async fn test_custom_photo_bucket() {
    let store = SupabaseStore::new("https://project.supabase.co/", ANON_KEY)
        .unwrap()
        .with_photo_bucket("photos");
    assert_eq!(
        store.public_photo_url("user-1/a.png"),
        "https://project.supabase.co/storage/v1/object/public/photos/user-1/a.png"
    );
}

#[tokio::test]
async fn test_get_recipe_by_id() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/rest/v1/recipes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "*".into()),
            Matcher::UrlEncoded("id".into(), "eq.7".into()),
        ]))
        .with_status(200)
        .with_body(json!([recipe_row("7", "Pancakes")]).to_string())
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    let recipe = store.get_recipe(&session(), "7").await.unwrap();
    assert_eq!(recipe.name, "Pancakes");
    assert_eq!(recipe.user_id.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn test_sign_out() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/v1/logout")
        .match_header("authorization", "Bearer user-token")
        .with_status(204)
        .create_async()
        .await;

    let store = SupabaseStore::new(server.url(), ANON_KEY).unwrap();
    store.sign_out(&session()).await.unwrap();
    mock.assert_async().await;
}

mod common;

use std::collections::HashSet;

use common::spawn_app;
use serde_json::{json, Value};

async fn register(client: &reqwest::Client, base_url: &str, username: &str) -> String {
    let response = client
        .post(format!("{}/api/users/register", base_url))
        .json(&json!({
            "username": username,
            "password": "secret",
            "name": username,
            "location": "US",
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn create_post(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    title: &str,
    tags: &str,
) -> Value {
    let response = client
        .post(format!("{}/api/posts", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": title, "content": "content", "tags": tags }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    body["post"].clone()
}

fn tag_names(post: &Value) -> HashSet<String> {
    post["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["name"].as_str().unwrap().to_string())
        .collect()
}

fn set_of(names: &[&str]) -> HashSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[tokio::test]
async fn register_login_create_and_update_post_flow() {
    let base_url = spawn_app("api_flow").await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/users/register", base_url))
        .json(&json!({
            "username": "alice",
            "password": "p1",
            "name": "Alice",
            "location": "US",
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "thank you for signing up");
    assert!(!body["token"].as_str().unwrap().is_empty());

    let response = client
        .post(format!("{}/api/users/login", base_url))
        .json(&json!({ "username": "alice", "password": "p1" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "you're logged in!");
    let token = body["token"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/api/posts", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": "Hi", "content": "Body", "tags": "#a #b" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    let post = &body["post"];
    assert_eq!(post["title"], "Hi");
    assert_eq!(post["author"]["username"], "alice");
    assert!(post["author"].get("password").is_none());
    assert_eq!(tag_names(post), set_of(&["#a", "#b"]));

    let post_id = post["id"].as_i64().unwrap();
    let response = client
        .patch(format!("{}/api/posts/{}", base_url, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "tags": "#b #c" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(tag_names(&body["post"]), set_of(&["#b", "#c"]));

    // fetch again through the list endpoint: the stored tag set matches
    let response = client
        .get(format!("{}/api/posts", base_url))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let posts = body["posts"].as_array().unwrap();
    let fetched = posts
        .iter()
        .find(|post| post["id"].as_i64() == Some(post_id))
        .unwrap();
    assert_eq!(tag_names(fetched), set_of(&["#b", "#c"]));
}

#[tokio::test]
async fn patch_with_whitespace_tags_detaches_all() {
    let base_url = spawn_app("api_whitespace_tags").await;
    let client = reqwest::Client::new();
    let token = register(&client, &base_url, "walt").await;

    let post = create_post(&client, &base_url, &token, "Tagged", "#x #y").await;
    assert_eq!(tag_names(&post), set_of(&["#x", "#y"]));

    // a non-empty but all-whitespace value resolves to the empty tag list
    let response = client
        .patch(format!("{}/api/posts/{}", base_url, post["id"].as_i64().unwrap()))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "tags": "   " }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert!(tag_names(&body["post"]).is_empty());
}

#[tokio::test]
async fn patch_without_tags_leaves_tag_set_alone() {
    let base_url = spawn_app("api_no_tags_patch").await;
    let client = reqwest::Client::new();
    let token = register(&client, &base_url, "tina").await;

    let post = create_post(&client, &base_url, &token, "Before", "#keep").await;
    let response = client
        .patch(format!("{}/api/posts/{}", base_url, post["id"].as_i64().unwrap()))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": "After" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["post"]["title"], "After");
    assert_eq!(tag_names(&body["post"]), set_of(&["#keep"]));
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let base_url = spawn_app("api_duplicate_user").await;
    let client = reqwest::Client::new();
    register(&client, &base_url, "bob").await;

    let response = client
        .post(format!("{}/api/users/register", base_url))
        .json(&json!({
            "username": "bob",
            "password": "other",
            "name": "Bob",
            "location": "US",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "UserExistsError");
    assert!(body.get("token").is_none());

    let response = client
        .get(format!("{}/api/users", base_url))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let bobs = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|user| user["username"] == "bob")
        .count();
    assert_eq!(bobs, 1);
}

#[tokio::test]
async fn login_requires_and_verifies_credentials() {
    let base_url = spawn_app("api_login_errors").await;
    let client = reqwest::Client::new();
    register(&client, &base_url, "carl").await;

    let response = client
        .post(format!("{}/api/users/login", base_url))
        .json(&json!({ "username": "carl" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "MissingCredentialsError");

    let response = client
        .post(format!("{}/api/users/login", base_url))
        .json(&json!({ "username": "carl", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "IncorrectCredentialsError");

    let response = client
        .post(format!("{}/api/users/login", base_url))
        .json(&json!({ "username": "nobody", "password": "whatever" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "IncorrectCredentialsError");
}

#[tokio::test]
async fn mutating_routes_gate_on_identity() {
    let base_url = spawn_app("api_auth_gate").await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/posts", base_url))
        .json(&json!({ "title": "Hi", "content": "Body" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "MissingUserError");

    let response = client
        .post(format!("{}/api/posts", base_url))
        .header("Authorization", "Basic abc")
        .json(&json!({ "title": "Hi", "content": "Body" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "AuthorizationHeaderError");

    let response = client
        .post(format!("{}/api/posts", base_url))
        .header("Authorization", "Bearer not-a-token")
        .json(&json!({ "title": "Hi", "content": "Body" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "JsonWebTokenError");
}

#[tokio::test]
async fn inactive_posts_are_visible_only_to_their_author() {
    let base_url = spawn_app("api_visibility").await;
    let client = reqwest::Client::new();
    let author_token = register(&client, &base_url, "carol").await;
    let other_token = register(&client, &base_url, "dave").await;

    let post = create_post(&client, &base_url, &author_token, "Mine", "#v").await;
    let post_id = post["id"].as_i64().unwrap();

    let response = client
        .delete(format!("{}/api/posts/{}", base_url, post_id))
        .header("Authorization", format!("Bearer {}", author_token))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["post"]["active"], false);

    let list = |token: Option<String>| {
        let client = client.clone();
        let url = format!("{}/api/posts", base_url);
        async move {
            let mut request = client.get(url);
            if let Some(token) = token {
                request = request.header("Authorization", format!("Bearer {}", token));
            }
            let body: Value = request.send().await.unwrap().json().await.unwrap();
            body["posts"].as_array().unwrap().len()
        }
    };

    assert_eq!(list(None).await, 0);
    assert_eq!(list(Some(other_token)).await, 0);
    assert_eq!(list(Some(author_token.clone())).await, 1);

    // the tag route applies the same filter
    let response = client
        .get(format!("{}/api/tags/%23v/posts", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "NoPostsError");

    let response = client
        .get(format!("{}/api/tags/%23v/posts", base_url))
        .header("Authorization", format!("Bearer {}", author_token))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn tag_listing_is_unique_and_tag_lookup_joins_posts() {
    let base_url = spawn_app("api_tags").await;
    let client = reqwest::Client::new();
    let first = register(&client, &base_url, "erin").await;
    let second = register(&client, &base_url, "finn").await;

    create_post(&client, &base_url, &first, "One", "#shared #solo").await;
    create_post(&client, &base_url, &second, "Two", "#shared").await;

    let response = client
        .get(format!("{}/api/tags", base_url))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let names: Vec<&str> = body["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.iter().filter(|name| **name == "#shared").count(), 1);
    assert!(names.contains(&"#solo"));

    let response = client
        .get(format!("{}/api/tags/%23shared/posts", base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["posts"].as_array().unwrap().len(), 2);

    let response = client
        .get(format!("{}/api/tags/%23missing/posts", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "NoPostsError");
}

#[tokio::test]
async fn only_the_author_can_update_or_delete() {
    let base_url = spawn_app("api_ownership").await;
    let client = reqwest::Client::new();
    let author_token = register(&client, &base_url, "gina").await;
    let other_token = register(&client, &base_url, "hank").await;

    let post = create_post(&client, &base_url, &author_token, "Owned", "").await;
    let post_id = post["id"].as_i64().unwrap();

    let response = client
        .patch(format!("{}/api/posts/{}", base_url, post_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "UnauthorizedUserError");

    let response = client
        .delete(format!("{}/api/posts/{}", base_url, post_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "UnauthorizedUserError");

    let response = client
        .delete(format!("{}/api/posts/{}", base_url, 9999))
        .header("Authorization", format!("Bearer {}", author_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "PostNotFoundError");
}

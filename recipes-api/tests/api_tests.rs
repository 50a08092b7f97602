//! Integration tests for recipes-api endpoints
//!
//! Tests cover:
//! - Recipe CRUD round trips through the router
//! - 404 / 400 handling for ids, bodies, and query strings
//! - Filter endpoint normalization and its boundary rules
//! - Health endpoint

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use recipes_api::{build_router, AppState};
use recipes_common::db::{connect_in_memory, seed_if_empty};
use recipes_common::{RecipeRepository, Schema};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: repository over a fresh in-memory database
async fn setup_repo() -> RecipeRepository {
    let pool = connect_in_memory().await.expect("Should open in-memory database");
    RecipeRepository::open(pool, Schema::recipe_catalog())
        .await
        .expect("Should create schema")
}

/// Test helper: router over an empty catalog
async fn setup_app() -> Router {
    build_router(AppState::new(setup_repo().await))
}

/// Test helper: router over the seven sample recipes
async fn setup_seeded_app() -> Router {
    let repo = setup_repo().await;
    seed_if_empty(&repo).await.expect("Should seed sample recipes");
    build_router(AppState::new(repo))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: send a request and return status plus parsed JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).expect("Should parse JSON");
    (status, body)
}

fn recipe_names(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("Expected JSON array")
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect()
}

fn ingredient_names(recipe: &Value) -> Vec<String> {
    let mut names: Vec<String> = recipe["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

fn fish_pie() -> Value {
    json!({
        "name": "Fish Pie",
        "instructions": "Bake fish in oven.",
        "vegetarian": false,
        "servings": 4,
        "ingredients": ["fish", "potatoes"]
    })
}

fn baked_potatoes() -> Value {
    json!({
        "name": "Baked Potatoes",
        "instructions": "Bake potatoes in oven.",
        "vegetarian": true,
        "servings": 4,
        "ingredients": ["potatoes"]
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let (status, body) = send(&app, test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "recipes-api");
    assert!(body["version"].is_string());
}

// =============================================================================
// Create / Get
// =============================================================================

#[tokio::test]
async fn test_create_then_get() {
    let app = setup_app().await;

    let (status, created) = send(&app, json_request("POST", "/recipes/", &fish_pie())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(created["id"].as_i64().unwrap() > 0);
    assert_eq!(created["name"], "Fish Pie");
    assert_eq!(ingredient_names(&created), vec!["fish", "potatoes"]);
    for ingredient in created["ingredients"].as_array().unwrap() {
        assert!(ingredient["id"].as_i64().unwrap() > 0);
    }

    let uri = format!("/recipes/{}", created["id"]);
    let (status, fetched) = send(&app, test_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_shared_ingredient_has_same_id_across_recipes() {
    let app = setup_app().await;

    let (_, pie) = send(&app, json_request("POST", "/recipes/", &fish_pie())).await;
    let (_, baked) = send(&app, json_request("POST", "/recipes/", &baked_potatoes())).await;

    let potato_id = |recipe: &Value| {
        recipe["ingredients"]
            .as_array()
            .unwrap()
            .iter()
            .find(|i| i["name"] == "potatoes")
            .map(|i| i["id"].clone())
            .unwrap()
    };
    assert_eq!(potato_id(&pie), potato_id(&baked));
}

#[tokio::test]
async fn test_create_rejects_out_of_range_servings() {
    let app = setup_app().await;
    let mut body = fish_pie();
    body["servings"] = json!(21);

    let (status, error) = send(&app, json_request("POST", "/recipes/", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "BAD_REQUEST");

    let (_, list) = send(&app, test_request("GET", "/recipes/")).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejects_malformed_json() {
    let app = setup_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/recipes/")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let (status, error) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"]["message"].is_string());
}

#[tokio::test]
async fn test_create_rejects_missing_field() {
    let app = setup_app().await;
    let body = json!({"name": "No Servings", "instructions": "Stir.", "vegetarian": true, "ingredients": []});

    let (status, _) = send(&app, json_request("POST", "/recipes/", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_recipe_is_404() {
    let app = setup_app().await;

    let (status, error) = send(&app, test_request("GET", "/recipes/999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"]["code"], "NOT_FOUND");
    assert_eq!(error["error"]["message"], "Recipe not found");
}

#[tokio::test]
async fn test_get_rejects_non_positive_and_non_numeric_ids() {
    let app = setup_app().await;

    for uri in ["/recipes/0", "/recipes/-3", "/recipes/abc"] {
        let (status, _) = send(&app, test_request("GET", uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
    }
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_returns_all_in_creation_order() {
    let app = setup_seeded_app().await;

    let (status, body) = send(&app, test_request("GET", "/recipes/")).await;

    assert_eq!(status, StatusCode::OK);
    let names = recipe_names(&body);
    assert_eq!(names.len(), 7);
    assert_eq!(names[0], "Vegetable Stir Fry");
    assert_eq!(names[6], "Pasta Carbonara");
}

#[tokio::test]
async fn test_list_skip_and_limit() {
    let app = setup_seeded_app().await;

    let (status, body) = send(&app, test_request("GET", "/recipes/?skip=1&limit=2")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(recipe_names(&body), vec!["Margherita Pizza", "Mushroom Risotto"]);

    let (status, _) = send(&app, test_request("GET", "/recipes/?limit=-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_servings_only() {
    let app = setup_app().await;
    let (_, created) = send(&app, json_request("POST", "/recipes/", &fish_pie())).await;
    let uri = format!("/recipes/{}", created["id"]);

    let (status, updated) = send(&app, json_request("PUT", &uri, &json!({"servings": 5}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["servings"], 5);
    assert_eq!(updated["name"], created["name"]);
    assert_eq!(updated["instructions"], created["instructions"]);
    assert_eq!(updated["vegetarian"], created["vegetarian"]);
    assert_eq!(updated["ingredients"], created["ingredients"]);
}

#[tokio::test]
async fn test_update_replaces_ingredients() {
    let app = setup_app().await;
    let (_, created) = send(&app, json_request("POST", "/recipes/", &fish_pie())).await;
    let uri = format!("/recipes/{}", created["id"]);

    let body = json!({"ingredients": ["cod", "leeks"]});
    let (status, updated) = send(&app, json_request("PUT", &uri, &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ingredient_names(&updated), vec!["cod", "leeks"]);

    let (_, again) = send(&app, json_request("PUT", &uri, &body)).await;
    assert_eq!(again, updated);
}

#[tokio::test]
async fn test_update_null_ingredients_clears_links() {
    let app = setup_app().await;
    let (_, created) = send(&app, json_request("POST", "/recipes/", &fish_pie())).await;
    let uri = format!("/recipes/{}", created["id"]);

    let (status, updated) = send(&app, json_request("PUT", &uri, &json!({"ingredients": null}))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(updated["ingredients"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_null_scalar_rejected() {
    let app = setup_app().await;
    let (_, created) = send(&app, json_request("POST", "/recipes/", &fish_pie())).await;
    let uri = format!("/recipes/{}", created["id"]);

    let (status, error) = send(&app, json_request("PUT", &uri, &json!({"servings": null}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["message"], "servings cannot be null");
}

#[tokio::test]
async fn test_update_missing_recipe_is_404() {
    let app = setup_app().await;

    let (status, _) = send(&app, json_request("PUT", "/recipes/42", &json!({"servings": 3}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_then_get_then_delete_again() {
    let app = setup_app().await;
    let (_, created) = send(&app, json_request("POST", "/recipes/", &fish_pie())).await;
    let uri = format!("/recipes/{}", created["id"]);

    let (status, body) = send(&app, test_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, _) = send(&app, test_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, test_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Filter
// =============================================================================

#[tokio::test]
async fn test_filter_requires_a_parameter() {
    let app = setup_seeded_app().await;

    let (status, error) = send(&app, test_request("GET", "/recipes/filter/")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error["error"]["message"],
        "At least one filter parameter must be provided."
    );
}

#[tokio::test]
async fn test_filter_rejects_include_exclude_overlap() {
    let app = setup_seeded_app().await;

    let (status, error) = send(
        &app,
        test_request("GET", "/recipes/filter/?include_ingredients=egg&exclude_ingredients=EGG"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Ingredients cannot be both included and excluded"));
}

#[tokio::test]
async fn test_filter_exclude_fish_with_oven_search_is_case_insensitive() {
    let app = setup_app().await;
    send(&app, json_request("POST", "/recipes/", &fish_pie())).await;
    send(&app, json_request("POST", "/recipes/", &baked_potatoes())).await;

    let (status, body) = send(
        &app,
        test_request("GET", "/recipes/filter/?exclude_ingredients=FISH&instruction_search=OVEN"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(recipe_names(&body), vec!["Baked Potatoes"]);
}

#[tokio::test]
async fn test_filter_repeated_include_keys_with_servings() {
    let app = setup_seeded_app().await;

    let (status, body) = send(
        &app,
        test_request(
            "GET",
            "/recipes/filter/?include_ingredients=bacon&include_ingredients=salmon%20fillets&servings=4",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(recipe_names(&body), vec!["Salmon with Lemon", "Pasta Carbonara"]);
}

#[tokio::test]
async fn test_filter_vegetarian_with_potatoes() {
    let app = setup_seeded_app().await;

    let (status, body) = send(
        &app,
        test_request("GET", "/recipes/filter/?vegetarian=true&include_ingredients=Potatoes"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(recipe_names(&body), vec!["Vegetable Stir Fry", "Mushroom Risotto"]);
}

#[tokio::test]
async fn test_filter_rejects_bad_query_values() {
    let app = setup_seeded_app().await;

    for uri in [
        "/recipes/filter/?servings=21",
        "/recipes/filter/?servings=many",
        "/recipes/filter/?vegetarian=maybe",
        "/recipes/filter/?instruction_search=",
    ] {
        let (status, _) = send(&app, test_request("GET", uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
    }
}

#[tokio::test]
async fn test_filter_servings_zero_matches_nothing() {
    let app = setup_seeded_app().await;

    let (status, body) = send(&app, test_request("GET", "/recipes/filter/?servings=0")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use franchise_api::router;
use franchise_core::db::open_db_in_memory;
use http_body_util::BodyExt;
use rusqlite::Connection;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    router(open_db_in_memory().unwrap())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Creates franchise "Alpha" with branch "Centro" holding "Cafe" at stock 5.
async fn seed(app: &Router) -> (String, String, String) {
    let (_, franchise) = send(app, Method::POST, "/franchises", Some(json!({"name": "Alpha"}))).await;
    let fid = franchise["id"].as_str().unwrap().to_string();

    let (_, branch) = send(
        app,
        Method::POST,
        &format!("/franchises/{fid}/branches"),
        Some(json!({"name": "Centro"})),
    )
    .await;
    let bid = branch["id"].as_str().unwrap().to_string();

    let (_, product) = send(
        app,
        Method::POST,
        &format!("/franchises/{fid}/branches/{bid}/products"),
        Some(json!({"name": "Cafe", "stock": 5})),
    )
    .await;
    let pid = product["id"].as_str().unwrap().to_string();

    (fid, bid, pid)
}

#[tokio::test]
async fn health_reports_ok_and_version() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn create_endpoints_return_created_entities() {
    let app = test_app();

    let (status, franchise) =
        send(&app, Method::POST, "/franchises", Some(json!({"name": "Alpha"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(franchise["name"], "Alpha");
    assert_eq!(franchise["branches"], json!([]));
    let fid = franchise["id"].as_str().unwrap();

    let (status, branch) = send(
        &app,
        Method::POST,
        &format!("/franchises/{fid}/branches"),
        Some(json!({"name": "Centro"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(branch["name"], "Centro");
    assert_eq!(branch["products"], json!([]));
    let bid = branch["id"].as_str().unwrap();

    let (status, product) = send(
        &app,
        Method::POST,
        &format!("/franchises/{fid}/branches/{bid}/products"),
        Some(json!({"name": "Cafe", "stock": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["name"], "Cafe");
    assert_eq!(product["stock"], 5);

    let (status, loaded) = send(&app, Method::GET, &format!("/franchises/{fid}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["branches"][0]["products"][0]["id"], product["id"]);
}

#[tokio::test]
async fn duplicate_names_are_bad_requests() {
    let app = test_app();
    let (fid, bid, _) = seed(&app).await;

    let (status, body) =
        send(&app, Method::POST, "/franchises", Some(json!({"name": "ALPHA"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/franchises/{fid}/branches"),
        Some(json!({"name": "centro"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/franchises/{fid}/branches/{bid}/products"),
        Some(json!({"name": "CAFE", "stock": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_ids_are_not_found_with_message() {
    let app = test_app();
    let (fid, bid, _) = seed(&app).await;

    let (status, body) = send(&app, Method::GET, "/franchises/missing/max-stock", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "franchise not found: missing"}));

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/franchises/{fid}/branches/{bid}/products/p9"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "product not found: p9");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/franchises/{fid}/branches/b9"),
        Some(json!({"name": "Norte"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn remove_product_returns_updated_branch() {
    let app = test_app();
    let (fid, bid, pid) = seed(&app).await;

    let (status, branch) = send(
        &app,
        Method::DELETE,
        &format!("/franchises/{fid}/branches/{bid}/products/{pid}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(branch["id"], bid.as_str());
    assert_eq!(branch["products"], json!([]));
}

#[tokio::test]
async fn stock_update_is_persisted_and_negative_stock_rejected() {
    let app = test_app();
    let (fid, bid, pid) = seed(&app).await;
    let stock_uri = format!("/franchises/{fid}/branches/{bid}/products/{pid}/stock");

    let (status, product) =
        send(&app, Method::PATCH, &stock_uri, Some(json!({"stock": 50}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["stock"], 50);

    let (status, body) = send(&app, Method::PATCH, &stock_uri, Some(json!({"stock": -1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("stock"));

    let (_, loaded) = send(&app, Method::GET, &format!("/franchises/{fid}"), None).await;
    assert_eq!(loaded["branches"][0]["products"][0]["stock"], 50);
}

#[tokio::test]
async fn rename_endpoints_update_names() {
    let app = test_app();
    let (fid, bid, pid) = seed(&app).await;

    let (status, franchise) = send(
        &app,
        Method::PATCH,
        &format!("/franchises/{fid}"),
        Some(json!({"name": "Omega"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(franchise["name"], "Omega");

    let (status, branch) = send(
        &app,
        Method::PATCH,
        &format!("/franchises/{fid}/branches/{bid}"),
        Some(json!({"name": "Plaza"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(branch["name"], "Plaza");

    let (status, product) = send(
        &app,
        Method::PATCH,
        &format!("/franchises/{fid}/branches/{bid}/products/{pid}"),
        Some(json!({"name": "Espresso"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["name"], "Espresso");
    assert_eq!(product["stock"], 5);

    let (_, listed) = send(&app, Method::GET, "/franchises", None).await;
    assert_eq!(listed[0]["name"], "Omega");
    assert_eq!(listed[0]["branches"][0]["name"], "Plaza");
}

#[tokio::test]
async fn max_stock_lists_every_branch_in_order() {
    let app = test_app();
    let (fid, _, _) = seed(&app).await;
    let (_, empty) = send(
        &app,
        Method::POST,
        &format!("/franchises/{fid}/branches"),
        Some(json!({"name": "Vacia"})),
    )
    .await;
    assert_eq!(empty["products"], json!([]));

    let (status, report) =
        send(&app, Method::GET, &format!("/franchises/{fid}/max-stock"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report.as_array().unwrap().len(), 2);
    assert_eq!(report[0]["branchName"], "Centro");
    assert_eq!(report[0]["product"]["name"], "Cafe");
    assert_eq!(report[1]["branchName"], "Vacia");
    assert!(report[1]["product"].is_null());
}

#[tokio::test]
async fn blank_name_is_bad_request() {
    let app = test_app();

    let (status, body) =
        send(&app, Method::POST, "/franchises", Some(json!({"name": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name must not be blank");
}

#[tokio::test]
async fn malformed_body_is_client_error() {
    let app = test_app();

    let (status, _) = send(&app, Method::POST, "/franchises", Some(json!({"title": "x"}))).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn storage_failure_is_internal_error() {
    let app = router(Connection::open_in_memory().unwrap());

    let (status, body) = send(&app, Method::GET, "/franchises", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("internal error:"));
}

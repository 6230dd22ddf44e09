mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use gbp_seed::{SilentProgress, hash_bytes, seed};

use common::*;

#[tokio::test]
async fn dictionary_version_is_not_found_until_seeded() {
    let app = TestApp::new();
    let response = app.get("/api/dictionaryVersion").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());

    let path = app.dir.path().join("seed.db");
    write_dump(&path, 3);
    let stats = {
        let store = app.state.store.lock().unwrap();
        seed(&store, &path, &SilentProgress).unwrap()
    };

    let response = app.get("/api/dictionaryVersion").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!(stats.hash));
}

#[tokio::test]
async fn plans_collections_lists_plan_tables() {
    let app = TestApp::new();
    let response = app.get("/api/plansCollections").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        [
            "character_plans",
            "weapon_plans",
            "artifact_sets_plans",
            "artifact_type_plans",
            "team_plans"
        ]
    );
    assert!(json[0]["id"].as_str().unwrap().starts_with("pbc_"));
}

#[tokio::test]
async fn dump_endpoints_require_superuser() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/dump/generate")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/dump/restore/abc")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(
        body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("superuser")
    );
}

#[tokio::test]
async fn generate_records_dump_and_serves_it() {
    let app = TestApp::new();
    let path = app.dir.path().join("seed.db");
    write_dump(&path, 3);
    {
        let store = app.state.store.lock().unwrap();
        seed(&store, &path, &SilentProgress).unwrap();
    }

    let response = app
        .send(
            authorized(Request::builder().method("POST").uri("/api/dump/generate"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"notes":"weekly"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    let hash = json["hash"].as_str().unwrap().to_string();

    let response = app.get("/api/dump/latest_seed.db").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.sqlite3"
    );
    let bytes = body_bytes(response).await;
    assert_eq!(hash_bytes(&bytes), hash);

    let version = body_json(app.get("/api/dictionaryVersion").await).await;
    assert_eq!(version, serde_json::json!(hash));
}

#[tokio::test]
async fn generate_accepts_empty_body_and_rejects_garbage() {
    let app = TestApp::new();

    let response = app
        .send(
            authorized(Request::builder().method("POST").uri("/api/dump/generate"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(
            authorized(Request::builder().method("POST").uri("/api/dump/generate"))
                .body(Body::from("notes=weekly"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn latest_seed_is_not_found_without_dumps() {
    let app = TestApp::new();
    let response = app.get("/api/dump/latest_seed.db").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_seeds_once_per_content() {
    let app = TestApp::new();
    let dump = app.dump_bytes("upload.db", 3);

    let response = app.send(upload_request(&dump, "first upload")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["status"], "seeded");
    assert_eq!(first["hash"], hash_bytes(&dump));

    let response = app.get("/api/collections/weapons/records").await;
    assert_eq!(response.status(), StatusCode::OK);
    let records = body_json(response).await;
    assert_eq!(records["totalItems"], 1);
    assert_eq!(records["items"][0]["name"], "Iron Blade");
    assert_eq!(records["items"][0]["rarity"], 3);

    let response = app.send(upload_request(&dump, "again")).await;
    let second = body_json(response).await;
    assert_eq!(second["status"], "unchanged");
    assert_eq!(second["id"], first["id"]);
}

#[tokio::test]
async fn upload_requires_dump_field() {
    let app = TestApp::new();
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"notes\"\r\n\r\nno file\r\n--{BOUNDARY}--\r\n"
    );
    let response = app
        .send(
            authorized(Request::builder().method("POST").uri("/api/dump/upload"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_of_non_database_is_bad_request() {
    let app = TestApp::new();
    let garbage = b"definitely not sqlite, just text ".repeat(64);
    let response = app.send(upload_request(&garbage, "")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/dump/latest_seed.db").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn restore_returns_to_earlier_dump() {
    let app = TestApp::new();
    let v1 = app.dump_bytes("v1.db", 3);
    let v2 = app.dump_bytes("v2.db", 4);

    let first = body_json(app.send(upload_request(&v1, "v1")).await).await;
    body_json(app.send(upload_request(&v2, "v2")).await).await;
    let records = body_json(app.get("/api/collections/weapons/records").await).await;
    assert_eq!(records["items"][0]["rarity"], 4);

    let uri = format!("/api/dump/restore/{}", first["id"].as_str().unwrap());
    let response = app
        .send(
            authorized(Request::builder().method("POST").uri(uri))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["hash"], hash_bytes(&v1));

    let records = body_json(app.get("/api/collections/weapons/records").await).await;
    assert_eq!(records["totalItems"], 1);
    assert_eq!(records["items"][0]["rarity"], 3);
}

#[tokio::test]
async fn restore_unknown_dump_is_not_found() {
    let app = TestApp::new();
    let uri = "/api/dump/restore/missing";
    let response = app
        .send(
            authorized(Request::builder().method("POST").uri(uri))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn records_of_unknown_collection_are_not_found() {
    let app = TestApp::new();
    let response = app.get("/api/collections/teams/records").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Plan collections are not served through the reference endpoint.
    let response = app.get("/api/collections/character_plans/records").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_api_route_is_json_not_found() {
    let app = TestApp::new();
    let response = app.get("/api/nothing/here").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn static_ui_with_index_fallback() {
    let app = TestApp::new();

    let response = app.get("/assets/app.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"console.log('gbp');");

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"<html>planner</html>");

    let response = app.get("/plans/characters").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"<html>planner</html>");
}

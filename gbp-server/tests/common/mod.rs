#![allow(dead_code)]

use std::path::Path;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use gbp_db::Store;
use gbp_seed::DumpFile;
use gbp_seed::rows::*;
use gbp_server::{AppState, Settings, router};

pub const TOKEN: &str = "test-token";
pub const BOUNDARY: &str = "gbp-test-boundary";

pub struct TestApp {
    pub dir: tempfile::TempDir,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ui_dir = dir.path().join("ui");
        std::fs::create_dir_all(ui_dir.join("assets")).unwrap();
        std::fs::write(ui_dir.join("index.html"), "<html>planner</html>").unwrap();
        std::fs::write(ui_dir.join("assets/app.js"), "console.log('gbp');").unwrap();

        let data_dir = dir.path().join("data");
        let settings = Settings {
            data_dir: data_dir.clone(),
            ui_dir,
            superuser_token: Some(TOKEN.to_string()),
            ..Settings::default()
        };
        let store = Store::open(&data_dir).unwrap();
        let state = AppState::new(store, settings).unwrap();
        Self { dir, state }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Write a small dump into the temp dir and return its bytes.
    pub fn dump_bytes(&self, name: &str, weapon_rarity: i64) -> Vec<u8> {
        let path = self.dir.path().join(name);
        write_dump(&path, weapon_rarity);
        std::fs::read(&path).unwrap()
    }
}

pub fn write_dump(path: &Path, weapon_rarity: i64) {
    let file = DumpFile::create(path).unwrap();
    file.recreate_table::<SpecialRow>().unwrap();
    file.insert(&SpecialRow {
        name: "Crit Rate".into(),
        order: 1,
        substat: true,
    })
    .unwrap();
    file.recreate_table::<WeaponTypeRow>().unwrap();
    file.insert(&WeaponTypeRow {
        name: "Sword".into(),
        icon: Some(IconBlob {
            filename: "sword.png".into(),
            content: b"sword-icon".to_vec(),
        }),
    })
    .unwrap();
    file.recreate_table::<WeaponRow>().unwrap();
    file.insert(&WeaponRow {
        name: "Iron Blade".into(),
        rarity: weapon_rarity,
        weapon_type: "Sword".into(),
        special: Some("Crit Rate".into()),
        icon: None,
    })
    .unwrap();
}

pub fn authorized(builder: axum::http::request::Builder) -> axum::http::request::Builder {
    builder.header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
}

pub fn multipart_body(dump: &[u8], notes: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"dump\"; filename=\"seed.db\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(dump);
    body.extend_from_slice(
        format!(
            "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"notes\"\r\n\r\n{notes}\r\n--{BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );
    body
}

pub fn upload_request(dump: &[u8], notes: &str) -> Request<Body> {
    authorized(Request::builder().method("POST").uri("/api/dump/upload"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(dump, notes)))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

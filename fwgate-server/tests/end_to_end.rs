//! End-to-end tests driving the router in-process against real files.

use axum::body::{to_bytes, Body};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use fwgate_server::files::StaticFiles;
use fwgate_server::http::{build_router, FIRMWARE_VERSION_HEADER};
use fwgate_server::server::AppState;
use fwgate_server::store::ConfigStore;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

const FW_V3: &[u8] = b"\x7fFIRMWARE-v3\x00\x01\x02";
const FW_V2_0_1: &[u8] = b"\x7fFIRMWARE-v2.0.1\xff";

/// A deployment directory laid out like production:
/// `mapping.json`, `ota_config.json`, `static_files/`.
struct Deployment {
    dir: TempDir,
}

impl Deployment {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let files = dir.path().join("static_files");
        std::fs::create_dir_all(&files).unwrap();
        std::fs::write(files.join("fw_v3.bin"), FW_V3).unwrap();
        std::fs::write(files.join("fw_v2_0_1.bin"), FW_V2_0_1).unwrap();
        std::fs::write(dir.path().join("passwd"), b"root:x:0:0").unwrap();

        let deployment = Self { dir };
        deployment.write_mapping(r#"{"latest_firmware":"fw_v3.bin"}"#);
        deployment.write_policy(
            r#"{"esp32-s3-generic":{"latest_version":"2.0.1","filename":"fw_v2_0_1.bin"}}"#,
        );
        deployment
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write_mapping(&self, json: &str) {
        std::fs::write(self.path().join("mapping.json"), json).unwrap();
    }

    fn write_policy(&self, json: &str) {
        std::fs::write(self.path().join("ota_config.json"), json).unwrap();
    }

    fn router(&self) -> Router {
        build_router(Arc::new(AppState::new(
            ConfigStore::new(
                self.path().join("mapping.json"),
                self.path().join("ota_config.json"),
            ),
            StaticFiles::new(self.path().join("static_files")),
        )))
    }

    async fn get(&self, uri: &str) -> Response<Body> {
        self.router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn detail(response: Response<Body>) -> String {
    let value: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    value["detail"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn alias_download_returns_file_bytes() {
    let deployment = Deployment::new();
    let response = deployment.get("/request_file/latest_firmware").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/octet-stream");
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION],
        "attachment; filename=\"fw_v3.bin\""
    );
    assert_eq!(body_bytes(response).await, FW_V3);
}

#[tokio::test]
async fn ota_serves_update_to_older_device() {
    let deployment = Deployment::new();
    let response = deployment
        .get("/ota?device_model=esp32-s3-generic&current_version=1.10.0")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[FIRMWARE_VERSION_HEADER], "2.0.1");
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION],
        "attachment; filename=\"fw_v2_0_1.bin\""
    );
    assert_eq!(body_bytes(response).await, FW_V2_0_1);
}

#[tokio::test]
async fn ota_returns_304_for_current_or_newer_device() {
    let deployment = Deployment::new();

    for current in ["2.0.1", "3.0.0"] {
        let response = deployment
            .get(&format!(
                "/ota?device_model=esp32-s3-generic&current_version={current}"
            ))
            .await;

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED, "{current}");
        assert!(body_bytes(response).await.is_empty());
    }
}

#[tokio::test]
async fn unknown_alias_is_404_naming_the_alias() {
    let deployment = Deployment::new();
    let response = deployment.get("/request_file/nightly_build").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(detail(response).await.contains("nightly_build"));
}

#[tokio::test]
async fn unknown_device_model_is_404_naming_the_model() {
    let deployment = Deployment::new();
    let response = deployment
        .get("/ota?device_model=esp32-c6-devkit&current_version=1.0.0")
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(detail(response).await.contains("esp32-c6-devkit"));
}

#[tokio::test]
async fn alias_pointing_at_missing_file_is_404() {
    let deployment = Deployment::new();
    deployment.write_mapping(r#"{"old":"fw_v1.bin"}"#);

    let response = deployment.get("/request_file/old").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(detail(response).await.contains("fw_v1.bin"));
}

#[tokio::test]
async fn alias_traversal_is_403() {
    let deployment = Deployment::new();
    deployment.write_mapping(
        r#"{"sneaky":"../passwd","deeper":"../../../etc/passwd","nested":"a/../../passwd"}"#,
    );

    for alias in ["sneaky", "deeper", "nested"] {
        let response = deployment.get(&format!("/request_file/{alias}")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{alias}");
        assert!(!detail(response).await.contains("root:x"));
    }
}

#[tokio::test]
async fn ota_traversal_is_403() {
    let deployment = Deployment::new();
    deployment.write_policy(
        r#"{"esp32-s3-generic":{"latest_version":"9.0.0","filename":"../passwd"}}"#,
    );

    let response = deployment
        .get("/ota?device_model=esp32-s3-generic&current_version=1.0.0")
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn ota_missing_firmware_file_is_404() {
    let deployment = Deployment::new();
    deployment.write_policy(
        r#"{"esp32-s3-generic":{"latest_version":"9.0.0","filename":"fw_v9.bin"}}"#,
    );

    let response = deployment
        .get("/ota?device_model=esp32-s3-generic&current_version=1.0.0")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_current_version_is_400() {
    let deployment = Deployment::new();
    let response = deployment
        .get("/ota?device_model=esp32-s3-generic&current_version=latest")
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(detail(response).await.contains("'latest'"));
}

#[tokio::test]
async fn incomplete_policy_is_500() {
    let deployment = Deployment::new();
    deployment.write_policy(r#"{"esp32-s3-generic":{"latest_version":"2.0.1"}}"#);

    let response = deployment
        .get("/ota?device_model=esp32-s3-generic&current_version=1.0.0")
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let detail = detail(response).await;
    assert!(detail.contains("esp32-s3-generic"));
    assert!(detail.contains("filename"));
}

#[tokio::test]
async fn malformed_documents_are_500() {
    let deployment = Deployment::new();
    deployment.write_mapping("{\"latest_firmware\": ");
    deployment.write_policy("[]");

    let response = deployment.get("/request_file/latest_firmware").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(detail(response).await.contains("mapping.json"));

    let response = deployment
        .get("/ota?device_model=esp32-s3-generic&current_version=1.0.0")
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(detail(response).await.contains("ota_config.json"));
}

#[tokio::test]
async fn config_edits_apply_without_restart() {
    let deployment = Deployment::new();
    let router = deployment.router();

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/ota?device_model=esp32-s3-generic&current_version=2.0.1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

    deployment.write_policy(
        r#"{"esp32-s3-generic":{"latest_version":"3.0.0","filename":"fw_v3.bin"}}"#,
    );

    let response = router
        .oneshot(
            Request::builder()
                .uri("/ota?device_model=esp32-s3-generic&current_version=2.0.1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, FW_V3);
}

#[tokio::test]
async fn non_ascii_filename_is_advertised_exactly() {
    let deployment = Deployment::new();
    std::fs::write(
        deployment.path().join("static_files").join("固件.bin"),
        FW_V3,
    )
    .unwrap();
    deployment.write_mapping(r#"{"cn":"固件.bin"}"#);

    let response = deployment.get("/request_file/cn").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION],
        "attachment; filename=\"__.bin\"; filename*=UTF-8''%E5%9B%BA%E4%BB%B6.bin"
    );
    assert_eq!(body_bytes(response).await, FW_V3);
}

#[tokio::test]
async fn whitespace_alias_target_is_unknown_alias() {
    let deployment = Deployment::new();
    deployment.write_mapping(r#"{"blank":"   "}"#);

    let response = deployment.get("/request_file/blank").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(detail(response).await.contains("alias 'blank'"));
}

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use plugin_service::config::{PluginConfig, StorageConfig};
use plugin_service::models::{Company, Directory, Identity, Pack, PackFile};
use plugin_service::startup::{build_router, AppState};
use serde_json::Value;
use std::collections::BTreeMap;
use tempfile::TempDir;
use tower::util::ServiceExt;

fn identity(api_key: &str, plugins: &[&str], packs: &[&str]) -> Identity {
    Identity {
        name: "Jean Test".to_string(),
        api_key: api_key.to_string(),
        active: true,
        email: Some("test@example.com".to_string()),
        external_user: None,
        device_name: None,
        expires: None,
        allowed_plugins: plugins.iter().map(|s| s.to_string()).collect(),
        allowed_packs: packs.iter().map(|s| s.to_string()).collect(),
        machines: BTreeMap::new(),
    }
}

fn pack(display: &str, plugins: &[&str]) -> Pack {
    Pack {
        name: display.to_string(),
        description: String::new(),
        plugins: plugins.iter().map(|s| s.to_string()).collect(),
        price: 29.99,
        category: "starter".to_string(),
        includes_packs: Vec::new(),
    }
}

/// Environment with catalog {hello_world, wall_tool}, packs basic/premium,
/// a flat account holding the basic pack, one holding a verbatim individual
/// grant, and a company user.
async fn test_state() -> (TempDir, AppState) {
    let root = TempDir::new().unwrap();
    let plugins_dir = root.path().join("plugins");
    let config_dir = root.path().join("config");
    tokio::fs::create_dir_all(&plugins_dir).await.unwrap();
    tokio::fs::create_dir_all(&config_dir).await.unwrap();

    for name in ["hello_world", "wall_tool"] {
        tokio::fs::write(
            plugins_dir.join(format!("{}.py", name)),
            format!("# {}\ndef main():\n    pass\n", name),
        )
        .await
        .unwrap();
    }

    let mut packs = BTreeMap::new();
    packs.insert("basic".to_string(), pack("Basic Pack", &["hello_world"]));
    packs.insert("premium".to_string(), pack("Premium Pack", &["*"]));
    tokio::fs::write(
        config_dir.join("plugin_packs.json"),
        serde_json::to_string_pretty(&PackFile {
            packs,
            individual_plugins: BTreeMap::new(),
        })
        .unwrap(),
    )
    .await
    .unwrap();

    let mut users = BTreeMap::new();
    users.insert(
        "test@example.com".to_string(),
        identity("flask-test-key-123456", &[], &["basic"]),
    );
    users.insert(
        "ghost@example.com".to_string(),
        identity("ghost-key", &["ghost_tool"], &[]),
    );
    let mut company_users = BTreeMap::new();
    let mut company_user = identity("company-key", &[], &["premium"]);
    company_user.external_user = Some("jean.test".to_string());
    company_user.device_name = Some("LAPTOP".to_string());
    company_users.insert("jean.test_LAPTOP".to_string(), company_user);
    let mut companies = BTreeMap::new();
    companies.insert(
        "acme".to_string(),
        Company {
            name: "Acme".to_string(),
            active: true,
            created_at: Some("2024-01-01".to_string()),
            users: company_users,
        },
    );
    tokio::fs::write(
        config_dir.join("users.json"),
        serde_json::to_string_pretty(&Directory { companies, users }).unwrap(),
    )
    .await
    .unwrap();

    let config = PluginConfig {
        common: service_core::config::Config { port: 0 },
        storage: StorageConfig {
            plugins_dir: plugins_dir.to_string_lossy().into_owned(),
            config_dir: config_dir.to_string_lossy().into_owned(),
            artifact_extension: "py".to_string(),
        },
    };

    let state = AppState::build(config).await.unwrap();
    (root, state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn home_and_status_work() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["config_files"]["users_json"], true);
    assert_eq!(body["config_files"]["packs_json"], true);
}

#[tokio::test]
async fn plugin_listing_is_public() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/plugins")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["plugin_count"], 2);
    assert_eq!(body["pack_count"], 2);
    assert_eq!(body["packs"]["basic"]["plugins"][0], "hello_world");
}

#[tokio::test]
async fn download_requires_credentials() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/get_plugin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_api_key_is_forbidden() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/get_plugin")
                .header("X-User-Email", "test@example.com")
                .header("X-Api-Key", "wrong")
                .header("X-Plugin-Name", "hello_world")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn granted_plugin_downloads_and_records_machine() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/get_plugin")
                .header("X-User-Email", "test@example.com")
                .header("X-Api-Key", "flask-test-key-123456")
                .header("X-Plugin-Name", "hello_world")
                .header("X-Machine-Id", "TEST-DESKTOP_JEAN.TEST")
                .header("X-Os-Version", "Windows 11")
                .header("X-Client-Version", "2024")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap(),
        "attachment; filename=\"hello_world.py\""
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"# hello_world"));

    // The sighting is visible through the machine registry.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/machines/test@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_machines"], 1);
    assert!(body["machines"]["TEST-DESKTOP_JEAN.TEST"]["os_version"] == "Windows 11");
}

#[tokio::test]
async fn ungranted_plugin_is_forbidden() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/get_plugin")
                .header("X-User-Email", "test@example.com")
                .header("X-Api-Key", "flask-test-key-123456")
                .header("X-Plugin-Name", "wall_tool")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn granted_but_absent_plugin_is_not_found() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    // Individual grants are kept verbatim, so the grant passes but the
    // catalog check fails.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/get_plugin")
                .header("X-User-Email", "ghost@example.com")
                .header("X-Api-Key", "ghost-key")
                .header("X-Plugin-Name", "ghost_tool")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn company_user_downloads_with_device_credentials() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/get_plugin")
                .header("X-External-User", "jean.test")
                .header("X-Device-Name", "LAPTOP")
                .header("X-Api-Key", "company-key")
                .header("X-Plugin-Name", "wall_tool")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/company_stats")
                .header("X-External-User", "jean.test")
                .header("X-Device-Name", "LAPTOP")
                .header("X-Api-Key", "company-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["company_id"], "acme");
    assert_eq!(body["company_stats"]["company_name"], "Acme");
}

#[tokio::test]
async fn user_info_reports_company_and_allowed_plugins() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/user_info")
                .header("X-External-User", "jean.test")
                .header("X-Device-Name", "LAPTOP")
                .header("X-Api-Key", "company-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["company"]["name"], "Acme");
    // Premium pack resolves to the whole catalog.
    assert_eq!(body["total_plugins"], 2);
}

#[tokio::test]
async fn user_plugins_breaks_down_permissions() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/user_plugins")
                .header("X-User-Email", "test@example.com")
                .header("X-Api-Key", "flask-test-key-123456")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_name"], "Jean Test");
    assert_eq!(body["pack_plugins"]["basic"][0], "hello_world");
    assert_eq!(body["all_allowed_plugins"][0], "hello_world");
}

#[tokio::test]
async fn pack_detail_and_unknown_pack() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/pack/premium")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["pack_info"]["plugin_count"], 2);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/pack/ghost")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_machine_registry_is_not_found() {
    let (_root, state) = test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/machines/nobody@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

//! API Integration Tests
//!
//! These tests verify the properties API by making HTTP requests to a test
//! server instance, and drive the shared settings controller against it.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

use propsettings::cli::CliClient;
use propsettings::registry::{PropertyPolicy, PropertyRegistry};
use propsettings::server::{build_router, AppState};
use propsettings_shared::{
    Collaborators, ConfirmDialog, ConfirmOptions, ConfirmPolicy, Navigator, Notifier,
    PropertyGroup, PropertyModel, RoleInfo, SettingsController, SAVE_SUCCESS_MESSAGE,
};

const DEFAULTS: &str = r#"
"detection.confidence.threshold" = "0.5"
"detection.models.dir.path" = "/opt/models"
"http.port" = "8080"
"#;

struct TestApp {
    app: Router,
    custom_path: PathBuf,
    _dir: TempDir,
}

// Test utilities
fn setup_test_app(admin: bool) -> TestApp {
    let dir = tempdir().unwrap();
    let defaults_path = dir.path().join("defaults.toml");
    let custom_path = dir.path().join("custom.toml");
    std::fs::write(&defaults_path, DEFAULTS).unwrap();

    let registry =
        PropertyRegistry::load(&defaults_path, &custom_path, PropertyPolicy::default()).unwrap();
    let state = Arc::new(AppState::new(registry, RoleInfo { admin }));

    TestApp {
        app: build_router(state, None),
        custom_path,
        _dir: dir,
    }
}

async fn json_response(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn put_properties(app: &Router, body: Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/properties")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

fn keys(json: &Value) -> Vec<String> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|p| p["key"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Query Tests
// =============================================================================

#[tokio::test]
async fn test_health() {
    let test = setup_test_app(true);
    let response = get(&test.app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_all_properties() {
    let test = setup_test_app(true);

    let response = get(&test.app, "/properties").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_response(response).await;
    assert_eq!(
        keys(&json),
        vec![
            "detection.confidence.threshold",
            "detection.models.dir.path",
            "http.port"
        ]
    );
    assert_eq!(json[0]["value"], "0.5");
    assert_eq!(json[0]["needsRestartIfChanged"], false);
    assert_eq!(json[0]["needsRestart"], false);
}

#[tokio::test]
async fn test_get_property_sets() {
    let test = setup_test_app(true);

    let mutable = json_response(get(&test.app, "/properties?whichPropertySet=mutable").await).await;
    assert_eq!(keys(&mutable), vec!["detection.confidence.threshold"]);

    let immutable =
        json_response(get(&test.app, "/properties?whichPropertySet=IMMUTABLE").await).await;
    assert_eq!(keys(&immutable), vec!["detection.models.dir.path", "http.port"]);
    assert!(immutable
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["needsRestartIfChanged"] == true));

    let unknown = json_response(get(&test.app, "/properties?whichPropertySet=bogus").await).await;
    assert_eq!(unknown.as_array().unwrap().len(), 3);
}

// =============================================================================
// Save Tests
// =============================================================================

#[tokio::test]
async fn test_save_returns_saved_properties() {
    let test = setup_test_app(true);

    let response = put_properties(
        &test.app,
        json!([{
            "key": "http.port",
            "value": "9090",
            "needsRestartIfChanged": true,
            "needsRestart": false
        }]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_response(response).await;
    assert_eq!(json[0]["key"], "http.port");
    assert_eq!(json[0]["value"], "9090");
    assert_eq!(json[0]["needsRestart"], true);

    assert!(std::fs::read_to_string(&test.custom_path).unwrap().contains("9090"));

    let status = json_response(get(&test.app, "/properties/restart-required").await).await;
    assert_eq!(status["restartRequired"], true);
}

#[tokio::test]
async fn test_save_mutable_does_not_require_restart() {
    let test = setup_test_app(true);

    let response = put_properties(
        &test.app,
        json!([{"key": "detection.confidence.threshold", "value": "0.8"}]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_response(response).await;
    assert_eq!(json[0]["needsRestart"], false);

    let status = json_response(get(&test.app, "/properties/restart-required").await).await;
    assert_eq!(status["restartRequired"], false);

    let mutable = json_response(get(&test.app, "/properties?whichPropertySet=mutable").await).await;
    assert_eq!(mutable[0]["value"], "0.8");
}

#[tokio::test]
async fn test_empty_save_is_noop() {
    let test = setup_test_app(true);

    let response = put_properties(&test.app, json!([])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_response(response).await, json!([]));
    assert!(!test.custom_path.exists());
}

#[tokio::test]
async fn test_non_admin_cannot_save() {
    let test = setup_test_app(false);

    let role = json_response(get(&test.app, "/role-info").await).await;
    assert_eq!(role["admin"], false);

    let response = put_properties(&test.app, json!([{"key": "http.port", "value": "1"}])).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!test.custom_path.exists());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let test = setup_test_app(true);
    let response = put_properties(&test.app, json!({"key": "http.port"})).await;
    assert!(response.status().is_client_error());
}

// =============================================================================
// Settings Controller End-to-End
// =============================================================================

#[derive(Default)]
struct CountingNotifier {
    messages: std::cell::RefCell<Vec<String>>,
}

impl Notifier for CountingNotifier {
    fn success(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

struct Decline;

#[async_trait::async_trait(?Send)]
impl ConfirmDialog for Decline {
    async fn confirm(&self, _options: &ConfirmOptions) -> bool {
        false
    }
}

struct Stay;

impl Navigator for Stay {
    fn go(&self, _target: &str) {}
}

#[tokio::test]
async fn test_settings_controller_against_server() {
    let test = setup_test_app(true);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let app = test.app.clone();
    tokio::spawn(async move { axum::serve(listener, app).await });

    let client = CliClient::new(&url);
    let notifier = Rc::new(CountingNotifier::default());
    let collaborators = Collaborators {
        notifier: notifier.clone(),
        dialog: Rc::new(Decline),
        navigator: Rc::new(Stay),
    };
    let controller = SettingsController::load(
        client.store(),
        collaborators,
        RoleInfo { admin: true },
        ConfirmPolicy::default(),
    )
    .await
    .unwrap();

    assert_eq!(controller.mutable_properties().len(), 1);
    assert_eq!(controller.immutable_properties().len(), 2);

    controller.set_value(PropertyGroup::Mutable, "detection.confidence.threshold", "0.9");
    controller.set_value(PropertyGroup::Immutable, "http.port", "9191");
    assert_eq!(controller.unsaved_properties_count(), 2);

    controller.save_properties().await.unwrap();

    assert_eq!(*notifier.messages.borrow(), vec![SAVE_SUCCESS_MESSAGE.to_string()]);
    assert!(!controller.has_unsaved_properties());
    let port: Vec<PropertyModel> = controller
        .immutable_properties()
        .into_iter()
        .filter(|p| p.key == "http.port")
        .collect();
    assert!(port[0].needs_restart);

    // A fresh load sees the saved values
    controller.refresh().await.unwrap();
    assert_eq!(controller.mutable_properties()[0].value, "0.9");
}

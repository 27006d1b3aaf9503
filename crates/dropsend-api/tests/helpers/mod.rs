//! Test helpers: build the router over a temp-file database and temp directories.
//!
//! Run with: `cargo test -p dropsend-api`

use axum_test::TestServer;
use dropsend_api::setup::{routes, services};
use dropsend_core::Config;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestApp {
    pub server: TestServer,
    pub transfers_dir: PathBuf,
    pub dropbox_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Put a file in the dropbox.
    pub fn drop_file(&self, name: &str, contents: &[u8]) {
        std::fs::write(self.dropbox_dir.join(name), contents).expect("write dropbox file");
    }

    /// Create a transfer of a freshly dropped file and return its JSON.
    pub async fn create_transfer(&self, name: &str) -> Value {
        self.drop_file(name, b"some bytes to send");
        let response = self
            .server
            .post("/api/transfers")
            .json(&json!({
                "email": "sender@example.com",
                "object": "Files for you",
                "message": "Here they are",
                "dropfile": name,
            }))
            .await;
        assert_eq!(response.status_code(), 201, "{}", response.text());
        response.json::<Value>()
    }

    pub async fn create_recipient(&self, transfer: &Value, email: &str) -> Value {
        let response = self
            .server
            .post("/api/recipients")
            .json(&json!({ "email": email, "transfer": transfer["uuid"] }))
            .await;
        assert_eq!(response.status_code(), 201, "{}", response.text());
        response.json::<Value>()
    }

    pub async fn set_recipient_active(&self, recipient: &Value, active: bool) {
        let uuid = recipient["uuid"].as_str().expect("recipient uuid");
        let response = self
            .server
            .put(&format!("/api/recipients/{}", uuid))
            .json(&json!({ "active": active }))
            .await;
        assert_eq!(response.status_code(), 200, "{}", response.text());
    }

    pub async fn transfer_detail(&self, transfer: &Value) -> Value {
        let uuid = transfer["uuid"].as_str().expect("transfer uuid");
        self.server
            .get(&format!("/api/transfers/{}", uuid))
            .await
            .json::<Value>()
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|config| config).await
}

pub async fn setup_test_app_with(customize: impl FnOnce(Config) -> Config) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let transfers_dir = temp_dir.path().join("transfers");
    let dropbox_dir = temp_dir.path().join("dropbox");
    std::fs::create_dir_all(&dropbox_dir).expect("create dropbox");

    let database_url = format!(
        "sqlite://{}?mode=rwc",
        temp_dir.path().join("dropsend.db").display()
    );
    let config = customize(Config::with_roots(
        database_url,
        transfers_dir.clone(),
        dropbox_dir.clone(),
    ));

    let pool = dropsend_db::connect(config.database_url(), 5, Duration::from_secs(30))
        .await
        .expect("Failed to connect to test database");
    let state = services::initialize_services(&config, pool)
        .await
        .expect("Failed to initialize services");
    let server = TestServer::new(routes::setup_routes(state)).expect("Failed to start test server");

    TestApp {
        server,
        transfers_dir,
        dropbox_dir,
        _temp_dir: temp_dir,
    }
}

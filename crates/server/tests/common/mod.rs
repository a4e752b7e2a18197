//! # Common Test Utilities
//!
//! Centralizes the test harness used across the `voxtutor-server`
//! integration tests. `TestApp` spawns a real server on a random port,
//! backed by a temporary SQLite database and temporary upload/audio
//! directories, with the AI and voice providers pointed at an
//! `httpmock::MockServer` instance.

// Allow unused code because this is a test utility module, and not all
// helpers are used by every test file that includes it.
#![allow(unused)]

pub mod pdf_helper;

use anyhow::Result;
use httpmock::prelude::*;
use httpmock::MockServer;
use reqwest::Client;
use serde_json::{json, Value};
use std::{
    fs::File,
    io::Write,
    net::SocketAddr,
    path::PathBuf,
};
use tempfile::{tempdir, NamedTempFile, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};
use voxtutor_server::{
    config,
    router,
    state::{build_app_state, AppState},
};

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    pub uploads_dir: PathBuf,
    pub audio_dir: PathBuf,
    _db_file: NamedTempFile,
    _work_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server and returns a `TestApp` instance.
    ///
    /// `voice_key` controls whether the voice provider is configured: pass
    /// `Some(..)` to point synthesis at the mock server, or `None` to force
    /// fallback descriptors.
    pub async fn spawn(voice_key: Option<&str>) -> Result<Self> {
        let mock_server = MockServer::start();
        let db_file = NamedTempFile::new()?;
        let work_dir = tempdir()?;
        let uploads_dir = work_dir.path().join("uploads");
        let audio_dir = work_dir.path().join("audio_output");

        let config_path = work_dir.path().join("config.yml");
        let voice_key_yaml = match voice_key {
            Some(key) => format!("\"{key}\""),
            None => "null".to_string(),
        };
        let config_content = format!(
            r#"
port: 0
db_url: "{}"
jwt_secret: "test-secret"
uploads_dir: "{}"
audio_dir: "{}"
ai:
  provider: "local"
  api_url: "{}"
  api_key: null
  model_name: "mock-chat-model"
voice:
  api_url: "{}"
  api_key: {}
"#,
            db_file.path().to_str().unwrap(),
            uploads_dir.to_str().unwrap(),
            audio_dir.to_str().unwrap(),
            mock_server.url("/v1/chat/completions"),
            mock_server.url("/v1"),
            voice_key_yaml,
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let app_state = build_app_state(config).await?;
        let app_state_for_harness = app_state.clone();

        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            uploads_dir,
            audio_dir,
            _db_file: db_file,
            _work_dir: work_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Registers a user through the API and returns `(user_id, token)`.
    pub async fn register_user(&self, email: &str, password: &str) -> Result<(String, String)> {
        let response = self
            .client
            .post(format!("{}/api/auth/register", self.address))
            .json(&json!({
                "name": "Test Student",
                "email": email,
                "password": password,
                "university": "Test University",
                "course": "Computer Science",
            }))
            .send()
            .await?;
        assert_eq!(response.status(), 201, "registration should succeed");
        let body: Value = response.json().await?;
        let user_id = body["data"]["user"]["id"].as_str().unwrap().to_string();
        let token = body["data"]["token"].as_str().unwrap().to_string();
        Ok((user_id, token))
    }

    /// Installs a chat-completions mock that replies with `content`.
    pub fn mock_ai_reply(&self, content: &str) -> httpmock::Mock<'_> {
        self.mock_server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": content } }
                ]
            }));
        })
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

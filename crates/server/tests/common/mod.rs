//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port, with its Gemini provider
//! pointed at an `httpmock::MockServer`.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::MockServer;
use kycocr_server::{config, router, state::build_app_state};
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use std::io::Write;
use std::net::SocketAddr;
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

/// The path the mock Gemini endpoint is served on.
pub const GEMINI_ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server with the default test configuration.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with("").await
    }

    /// Spawns the application server, appending `extra_yaml` to the test configuration.
    pub async fn spawn_with(extra_yaml: &str) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
gemini_api_key: "test-key"
provider:
  api_url: "{}"
  model_name: "gemini-test"
{extra_yaml}
"#,
            mock_server.url(GEMINI_ENDPOINT),
        );
        let mut file = std::fs::File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config_path = config_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("temp path is not UTF-8"))?;
        let config = config::get_config(Some(config_path))?;
        let app_state = build_app_state(config)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Posts `form` to `/api/ocr`.
    pub async fn post_ocr(&self, form: Form) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}/api/ocr", self.address))
            .multipart(form)
            .send()
            .await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Builds an upload form with a `type` field and a `file` part.
pub fn upload_form(document_type: &str, file_name: &str, mime_type: &str, bytes: &[u8]) -> Form {
    let part = Part::bytes(bytes.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime_type)
        .expect("valid MIME type");
    Form::new()
        .text("type", document_type.to_string())
        .part("file", part)
}

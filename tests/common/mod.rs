#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use genders_api::auth::JwtKeys;
use genders_api::database::MemoryGenderStore;
use genders_api::handlers::AppState;
use genders_api::i18n::Translator;
use genders_api::services::GenderService;

pub const JWT_SECRET: &str = "integration-test-secret";

/// Router served on a free port with a private in-process store
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryGenderStore>,
    pub client: reqwest::Client,
    keys: JwtKeys,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryGenderStore::new());
        let keys = JwtKeys::new(JWT_SECRET, 1)?;
        let service = GenderService::new(store.clone(), Translator::new("en"));
        let app = genders_api::app(AppState::new(service, keys.clone()), false);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            base_url,
            store,
            client: reqwest::Client::new(),
            keys,
            handle,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token(&self, account_id: i64, locale: Option<&str>) -> String {
        self.keys
            .issue(account_id, 1, locale.map(str::to_string))
            .expect("failed to mint token")
    }

    /// POST a gender for the account and return its id
    pub async fn create_gender(&self, account_id: i64, name: &str) -> Result<i64> {
        let body: serde_json::Value = self
            .client
            .post(self.url("/settings/personalization/genders"))
            .bearer_auth(self.token(account_id, None))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        body["id"].as_i64().context("created gender has no id")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

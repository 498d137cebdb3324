use crate::api::{AgentGroupsApi, AgentsApi, EditorApi, FiltersApi, FoldersApi, ScansApi};
use crate::cache::SchemaCache;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{ApiRequest, ApiResponse, HttpClient, Transport};
use crate::types::Timezone;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Entry point for talking to a Nessus Manager.
///
/// Endpoint groups borrow the client, so they are cheap to create per call:
///
/// ```no_run
/// # async fn run() -> nessus_core::Result<()> {
/// use nessus_core::{ClientConfig, Nessus};
///
/// let nessus = Nessus::new(ClientConfig::new("ACCESS_KEY", "SECRET_KEY"))?;
/// for group in nessus.agent_groups().list().await? {
///     println!("{} {}", group.id, group.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Nessus {
    transport: Arc<dyn Transport>,
    cache: Option<SchemaCache>,
    timezones: OnceCell<Vec<Timezone>>,
}

impl Nessus {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpClient::new(&config)?;
        let cache = config
            .cache_dir
            .clone()
            .map(|dir| SchemaCache::new(dir).with_ttl(config.cache_ttl()));

        tracing::debug!(
            url = %transport.base_url(),
            verify = config.verify,
            "created Nessus client"
        );

        Ok(Self {
            transport: Arc::new(transport),
            cache,
            timezones: OnceCell::new(),
        })
    }

    /// Uses a caller-supplied transport instead of the HTTP client.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cache: None,
            timezones: OnceCell::new(),
        }
    }

    pub fn with_cache(mut self, cache: SchemaCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&SchemaCache> {
        self.cache.as_ref()
    }

    pub fn agents(&self) -> AgentsApi<'_> {
        AgentsApi::new(self)
    }

    pub fn agent_groups(&self) -> AgentGroupsApi<'_> {
        AgentGroupsApi::new(self)
    }

    pub fn editor(&self) -> EditorApi<'_> {
        EditorApi::new(self)
    }

    pub fn filters(&self) -> FiltersApi<'_> {
        FiltersApi::new(self)
    }

    pub fn folders(&self) -> FoldersApi<'_> {
        FoldersApi::new(self)
    }

    pub fn scans(&self) -> ScansApi<'_> {
        ScansApi::new(self)
    }

    /// Timezone listing, fetched once and kept for the life of the client.
    pub async fn timezones(&self) -> Result<&[Timezone]> {
        let zones = self
            .timezones
            .get_or_try_init(|| async { self.scans().timezones().await })
            .await?;
        Ok(zones.as_slice())
    }

    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.transport.send(request).await
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(ApiRequest::get(path)).await?.value(path)
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<Value> {
        self.request(with_body(ApiRequest::post(path), body)).await?.value(path)
    }

    pub async fn put(&self, path: &str, body: Option<Value>) -> Result<Value> {
        self.request(with_body(ApiRequest::put(path), body)).await?.value(path)
    }

    pub async fn delete(&self, path: &str, body: Option<Value>) -> Result<Value> {
        self.request(with_body(ApiRequest::delete(path), body)).await?.value(path)
    }
}

fn with_body(request: ApiRequest, body: Option<Value>) -> ApiRequest {
    match body {
        Some(body) => request.json(body),
        None => request,
    }
}

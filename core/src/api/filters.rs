use crate::client::Nessus;
use crate::error::{NessusError, Result};
use crate::filter::FilterSchema;
use crate::http::ApiRequest;
use serde_json::Value;

pub const AGENT_FILTERS: &str = "scans/agents";
pub const REPORT_FILTERS: &str = "scans/reports";

/// Filter catalogs advertised by the manager.
pub struct FiltersApi<'a> {
    api: &'a Nessus,
}

impl<'a> FiltersApi<'a> {
    pub(crate) fn new(api: &'a Nessus) -> Self {
        Self { api }
    }

    pub async fn agents(&self) -> Result<FilterSchema> {
        self.schema(AGENT_FILTERS).await
    }

    pub async fn scan_reports(&self) -> Result<FilterSchema> {
        self.schema(REPORT_FILTERS).await
    }

    pub async fn schema(&self, category: &str) -> Result<FilterSchema> {
        let listing = self.listing(category).await?;
        FilterSchema::from_listing(&listing)
            .map_err(|e| NessusError::invalid_response(&format!("filters/{}", category), e))
    }

    /// Raw `filters/<category>` listing, served from the cache when fresh.
    pub async fn listing(&self, category: &str) -> Result<Value> {
        if let Some(cache) = self.api.cache() {
            match cache.get(category) {
                Ok(Some(listing)) => {
                    tracing::debug!(category, "using cached filter listing");
                    return Ok(listing);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(category, error = %e, "ignoring unreadable filter cache"),
            }
        }

        let path = format!("filters/{}", category);
        let listing = self.api.request(ApiRequest::get(&path)).await?.value(&path)?;

        if let Some(cache) = self.api.cache() {
            if let Err(e) = cache.set(category, &listing) {
                tracing::warn!(category, error = %e, "failed to cache filter listing");
            }
        }

        Ok(listing)
    }
}

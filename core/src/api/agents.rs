use super::{IdSet, SortOrder};
use crate::client::Nessus;
use crate::error::Result;
use crate::filter::{translate, Filter, FilterEncoding, FilterJoin};
use crate::http::ApiRequest;
use crate::types::Agent;
use serde_json::Value;

/// Listing options for `GET agents`.
#[derive(Debug, Clone, Default)]
pub struct AgentQuery {
    pub filters: Vec<Filter>,
    pub filter_type: FilterJoin,
    /// Free-text match against the manager's wildcard fields.
    pub wildcard: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl AgentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn filter_type(mut self, join: FilterJoin) -> Self {
        self.filter_type = join;
        self
    }

    pub fn wildcard(mut self, text: impl Into<String>) -> Self {
        self.wildcard = Some(text.into());
        self
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order);
        self
    }
}

pub struct AgentsApi<'a> {
    api: &'a Nessus,
}

impl<'a> AgentsApi<'a> {
    pub(crate) fn new(api: &'a Nessus) -> Self {
        Self { api }
    }

    /// Lists linked agents.
    ///
    /// Filters are checked against the manager's agent filter catalog
    /// before the request is sent.
    pub async fn list(&self, query: &AgentQuery) -> Result<Vec<Agent>> {
        let mut request = ApiRequest::get("agents");

        if !query.filters.is_empty() {
            let schema = self.api.filters().agents().await?;
            let encoded = translate(&query.filters, &schema, FilterEncoding::Colon)?;
            request = request
                .filters(&encoded)
                .query("ft", query.filter_type.as_str());
        }
        if let Some(wildcard) = &query.wildcard {
            request = request.query("w", wildcard);
        }
        if let Some(limit) = query.limit {
            request = request.query("limit", limit);
        }
        if let Some(offset) = query.offset {
            request = request.query("offset", offset);
        }
        if let Some(sort_by) = &query.sort_by {
            request = request.query("sort_by", sort_by);
        }
        if let Some(order) = query.sort_order {
            request = request.query("sort_order", order.as_str());
        }

        let response = self.api.request(request).await?;
        let agents: Option<Vec<Agent>> = response.field("agents", "agents")?;
        Ok(agents.unwrap_or_default())
    }

    pub async fn details(&self, agent_id: u64) -> Result<Agent> {
        let path = format!("agents/{}", agent_id);
        self.api.request(ApiRequest::get(&path)).await?.json(&path)
    }

    pub async fn delete<I>(&self, agent_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = u64>,
    {
        let request = match IdSet::new(agent_ids)? {
            IdSet::Single(id) => ApiRequest::delete(format!("agents/{}", id)),
            IdSet::Bulk(ids) => ApiRequest::delete("agents").json(IdSet::body(&ids)),
        };
        self.api.request(request).await?;
        Ok(())
    }

    /// Unlinks agents from the manager.
    ///
    /// A bulk unlink returns the task resource tracking the operation.
    pub async fn unlink<I>(&self, agent_ids: I) -> Result<Option<Value>>
    where
        I: IntoIterator<Item = u64>,
    {
        match IdSet::new(agent_ids)? {
            IdSet::Single(id) => {
                self.api
                    .request(ApiRequest::delete(format!("agents/{}/unlink", id)))
                    .await?;
                Ok(None)
            }
            IdSet::Bulk(ids) => {
                let path = "agents/unlink";
                let task = self
                    .api
                    .request(ApiRequest::delete(path).json(IdSet::body(&ids)))
                    .await?
                    .value(path)?;
                Ok(Some(task))
            }
        }
    }
}

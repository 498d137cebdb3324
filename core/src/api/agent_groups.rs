use super::IdSet;
use crate::client::Nessus;
use crate::error::Result;
use crate::http::ApiRequest;
use crate::types::AgentGroup;
use serde_json::{json, Value};

pub struct AgentGroupsApi<'a> {
    api: &'a Nessus,
}

impl<'a> AgentGroupsApi<'a> {
    pub(crate) fn new(api: &'a Nessus) -> Self {
        Self { api }
    }

    /// Adds agents to a group. A bulk add returns the task resource.
    pub async fn add_agent<I>(&self, group_id: u64, agent_ids: I) -> Result<Option<Value>>
    where
        I: IntoIterator<Item = u64>,
    {
        match IdSet::new(agent_ids)? {
            IdSet::Single(agent_id) => {
                self.api
                    .request(ApiRequest::put(format!(
                        "agent-groups/{}/agents/{}",
                        group_id, agent_id
                    )))
                    .await?;
                Ok(None)
            }
            IdSet::Bulk(ids) => {
                let path = format!("agent-groups/{}/agents", group_id);
                let task = self
                    .api
                    .request(ApiRequest::put(&path).json(IdSet::body(&ids)))
                    .await?
                    .value(&path)?;
                Ok(Some(task))
            }
        }
    }

    /// Renames a group.
    pub async fn configure(&self, group_id: u64, name: &str) -> Result<()> {
        let request =
            ApiRequest::put(format!("agent-groups/{}", group_id)).json(json!({ "name": name }));
        self.api.request(request).await?;
        Ok(())
    }

    pub async fn create(&self, name: &str) -> Result<AgentGroup> {
        let path = "agent-groups";
        self.api
            .request(ApiRequest::post(path).json(json!({ "name": name })))
            .await?
            .json(path)
    }

    pub async fn delete<I>(&self, group_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = u64>,
    {
        let request = match IdSet::new(group_ids)? {
            IdSet::Single(id) => ApiRequest::delete(format!("agent-groups/{}", id)),
            IdSet::Bulk(ids) => ApiRequest::delete("agent-groups").json(IdSet::body(&ids)),
        };
        self.api.request(request).await?;
        Ok(())
    }

    /// Removes agents from a group. A bulk removal returns the task resource.
    pub async fn delete_agent<I>(&self, group_id: u64, agent_ids: I) -> Result<Option<Value>>
    where
        I: IntoIterator<Item = u64>,
    {
        match IdSet::new(agent_ids)? {
            IdSet::Single(agent_id) => {
                self.api
                    .request(ApiRequest::delete(format!(
                        "agent-groups/{}/agents/{}",
                        group_id, agent_id
                    )))
                    .await?;
                Ok(None)
            }
            IdSet::Bulk(ids) => {
                let path = format!("agent-groups/{}/agents", group_id);
                let task = self
                    .api
                    .request(ApiRequest::delete(&path).json(IdSet::body(&ids)))
                    .await?
                    .value(&path)?;
                Ok(Some(task))
            }
        }
    }

    pub async fn details(&self, group_id: u64) -> Result<AgentGroup> {
        let path = format!("agent-groups/{}", group_id);
        self.api.request(ApiRequest::get(&path)).await?.json(&path)
    }

    pub async fn list(&self) -> Result<Vec<AgentGroup>> {
        let groups: Option<Vec<AgentGroup>> = self
            .api
            .request(ApiRequest::get("agent-groups"))
            .await?
            .field("agent-groups", "groups")?;
        Ok(groups.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::testing::MockTransport;

    #[tokio::test]
    async fn test_add_agent_single_and_bulk() {
        let mock = MockTransport::new()
            .respond_empty()
            .respond(json!({"task_id": "t-1"}));
        let nessus = mock.client();

        assert!(nessus.agent_groups().add_agent(3, [7]).await.unwrap().is_none());
        assert!(nessus.agent_groups().add_agent(3, [7, 8]).await.unwrap().is_some());

        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(requests[0].path, "agent-groups/3/agents/7");
        assert_eq!(requests[1].path, "agent-groups/3/agents");
        assert_eq!(requests[1].body, Some(json!({"ids": [7, 8]})));
    }

    #[tokio::test]
    async fn test_configure_and_create() {
        let mock = MockTransport::new()
            .respond_empty()
            .respond(json!({"id": 11, "name": "Linux Servers", "owner": "admin"}));
        let nessus = mock.client();

        nessus.agent_groups().configure(11, "Renamed").await.unwrap();
        let group = nessus.agent_groups().create("Linux Servers").await.unwrap();
        assert_eq!(group.id, 11);
        assert_eq!(group.owner.as_deref(), Some("admin"));

        let requests = mock.requests();
        assert_eq!(requests[0].path, "agent-groups/11");
        assert_eq!(requests[0].body, Some(json!({"name": "Renamed"})));
        assert_eq!(requests[1].method, Method::Post);
        assert_eq!(requests[1].body, Some(json!({"name": "Linux Servers"})));
    }

    #[tokio::test]
    async fn test_delete_uses_ids_key() {
        let mock = MockTransport::new();
        let nessus = mock.client();

        nessus.agent_groups().delete([2]).await.unwrap();
        nessus.agent_groups().delete([2, 3]).await.unwrap();
        nessus.agent_groups().delete_agent(2, [5]).await.unwrap();
        nessus.agent_groups().delete_agent(2, [5, 6]).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].path, "agent-groups/2");
        assert_eq!(requests[1].path, "agent-groups");
        assert_eq!(requests[1].body, Some(json!({"ids": [2, 3]})));
        assert_eq!(requests[2].path, "agent-groups/2/agents/5");
        assert_eq!(requests[3].path, "agent-groups/2/agents");
        assert_eq!(requests[3].body, Some(json!({"ids": [5, 6]})));
        assert!(requests.iter().all(|r| r.method == Method::Delete));
    }

    #[tokio::test]
    async fn test_details_and_list() {
        let mock = MockTransport::new()
            .respond(json!({"id": 4, "name": "Workstations", "agents_count": 12}))
            .respond(json!({"groups": [
                {"id": 4, "name": "Workstations"},
                {"id": 5, "name": "Servers"},
            ]}));
        let nessus = mock.client();

        let group = nessus.agent_groups().details(4).await.unwrap();
        assert_eq!(group.agents_count, Some(12));

        let groups = nessus.agent_groups().list().await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].name, "Servers");

        let requests = mock.requests();
        assert_eq!(requests[0].path, "agent-groups/4");
        assert_eq!(requests[1].path, "agent-groups");
    }
}

use crate::client::Nessus;
use crate::error::Result;
use crate::http::ApiRequest;
use crate::types::Folder;
use serde_json::json;

pub struct FoldersApi<'a> {
    api: &'a Nessus,
}

impl<'a> FoldersApi<'a> {
    pub(crate) fn new(api: &'a Nessus) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Folder>> {
        self.api
            .request(ApiRequest::get("folders"))
            .await?
            .field("folders", "folders")
    }

    /// Creates a folder and returns its id.
    pub async fn create(&self, name: &str) -> Result<u64> {
        let path = "folders";
        self.api
            .request(ApiRequest::post(path).json(json!({ "name": name })))
            .await?
            .field(path, "id")
    }

    pub async fn edit(&self, folder_id: u64, name: &str) -> Result<()> {
        let request =
            ApiRequest::put(format!("folders/{}", folder_id)).json(json!({ "name": name }));
        self.api.request(request).await?;
        Ok(())
    }

    pub async fn delete(&self, folder_id: u64) -> Result<()> {
        self.api
            .request(ApiRequest::delete(format!("folders/{}", folder_id)))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NessusError;
    use crate::http::Method;
    use crate::testing::MockTransport;

    #[tokio::test]
    async fn test_folder_lifecycle() {
        let mock = MockTransport::new()
            .respond(json!({"id": 21}))
            .respond_empty()
            .respond_empty()
            .respond(json!({"folders": [
                {"id": 2, "name": "My Scans", "type": "main", "custom": 0, "default_tag": 1},
                {"id": 3, "name": "Trash", "type": "trash", "custom": 0}
            ]}));
        let nessus = mock.client();

        let id = nessus.folders().create("Quarterly").await.unwrap();
        assert_eq!(id, 21);
        nessus.folders().edit(id, "Q3").await.unwrap();
        nessus.folders().delete(id).await.unwrap();
        let folders = nessus.folders().list().await.unwrap();
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[1].kind.as_deref(), Some("trash"));

        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].body, Some(json!({"name": "Quarterly"})));
        assert_eq!(requests[1].method, Method::Put);
        assert_eq!(requests[1].path, "folders/21");
        assert_eq!(requests[2].method, Method::Delete);
        assert_eq!(requests[2].path, "folders/21");
    }

    #[tokio::test]
    async fn test_delete_missing_folder() {
        let mock = MockTransport::new().fail(NessusError::NotFound {
            path: "folders/99".to_string(),
        });
        let err = mock.client().folders().delete(99).await.unwrap_err();
        assert!(matches!(err, NessusError::NotFound { .. }));
    }
}

use crate::client::Nessus;
use crate::error::Result;
use crate::http::ApiRequest;
use crate::types::{Template, TemplateKind};
use serde_json::Value;

pub struct EditorApi<'a> {
    api: &'a Nessus,
}

impl<'a> EditorApi<'a> {
    pub(crate) fn new(api: &'a Nessus) -> Self {
        Self { api }
    }

    pub async fn templates(&self, kind: TemplateKind) -> Result<Vec<Template>> {
        let path = format!("editor/{}/templates", kind.as_str());
        self.api
            .request(ApiRequest::get(&path))
            .await?
            .field(&path, "templates")
    }

    /// Full editor document for one template, including every setting.
    pub async fn template_details(&self, kind: TemplateKind, uuid: &str) -> Result<Value> {
        let path = format!("editor/{}/templates/{}", kind.as_str(), uuid);
        self.api.request(ApiRequest::get(&path)).await?.value(&path)
    }
}

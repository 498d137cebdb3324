use super::IdSet;
use crate::client::Nessus;
use crate::error::Result;
use crate::filter::{translate, Filter, FilterEncoding};
use crate::http::ApiRequest;
use crate::types::{ExportFormat, ExportStatus, ScanList, Timezone};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// Options for `GET scans/{id}`.
#[derive(Debug, Clone, Default)]
pub struct ScanDetailsQuery {
    pub history_id: Option<u64>,
    pub filters: Vec<Filter>,
}

impl ScanDetailsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(mut self, history_id: u64) -> Self {
        self.history_id = Some(history_id);
        self
    }

    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filters.push(filter.into());
        self
    }
}

pub struct ScansApi<'a> {
    api: &'a Nessus,
}

impl<'a> ScansApi<'a> {
    pub(crate) fn new(api: &'a Nessus) -> Self {
        Self { api }
    }

    /// Lists scans, optionally limited to one folder or to scans changed
    /// since `modified_since`.
    pub async fn list(
        &self,
        folder_id: Option<u64>,
        modified_since: Option<DateTime<Utc>>,
    ) -> Result<ScanList> {
        let mut request = ApiRequest::get("scans");
        if let Some(folder_id) = folder_id {
            request = request.query("folder_id", folder_id);
        }
        if let Some(since) = modified_since {
            request = request.query("last_modification_date", since.timestamp());
        }
        self.api.request(request).await?.json("scans")
    }

    /// Scan results. Filters narrow the returned hosts and vulnerabilities
    /// and are checked against the report filter catalog first.
    pub async fn details(&self, scan_id: u64, query: &ScanDetailsQuery) -> Result<Value> {
        let path = format!("scans/{}", scan_id);
        let mut request = ApiRequest::get(&path);

        if let Some(history_id) = query.history_id {
            request = request.query("history_id", history_id);
        }
        if !query.filters.is_empty() {
            let schema = self.api.filters().scan_reports().await?;
            let encoded = translate(&query.filters, &schema, FilterEncoding::Expanded)?;
            request = request.filters(&encoded);
        }

        self.api.request(request).await?.value(&path)
    }

    /// Launches a scan and returns the scan instance uuid.
    pub async fn launch(&self, scan_id: u64, alt_targets: &[String]) -> Result<String> {
        let path = format!("scans/{}/launch", scan_id);
        let mut request = ApiRequest::post(&path);
        if !alt_targets.is_empty() {
            request = request.json(json!({ "alt_targets": alt_targets }));
        }
        self.api.request(request).await?.field(&path, "scan_uuid")
    }

    pub async fn pause(&self, scan_id: u64) -> Result<()> {
        self.control(scan_id, "pause").await
    }

    pub async fn resume(&self, scan_id: u64) -> Result<()> {
        self.control(scan_id, "resume").await
    }

    pub async fn stop(&self, scan_id: u64) -> Result<()> {
        self.control(scan_id, "stop").await
    }

    async fn control(&self, scan_id: u64, action: &str) -> Result<()> {
        tracing::debug!(scan_id, action, "scan control");
        self.api
            .request(ApiRequest::post(format!("scans/{}/{}", scan_id, action)))
            .await?;
        Ok(())
    }

    pub async fn delete<I>(&self, scan_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = u64>,
    {
        let request = match IdSet::new(scan_ids)? {
            IdSet::Single(id) => ApiRequest::delete(format!("scans/{}", id)),
            IdSet::Bulk(ids) => ApiRequest::delete("scans").json(IdSet::body(&ids)),
        };
        self.api.request(request).await?;
        Ok(())
    }

    /// Uncached; prefer [`Nessus::timezones`] for repeated lookups.
    pub async fn timezones(&self) -> Result<Vec<Timezone>> {
        let path = "scans/timezones";
        self.api
            .request(ApiRequest::get(path))
            .await?
            .field(path, "timezones")
    }

    /// Requests an export and returns the file id to poll.
    pub async fn export_request(
        &self,
        scan_id: u64,
        format: ExportFormat,
        filters: &[Filter],
    ) -> Result<u64> {
        let path = format!("scans/{}/export", scan_id);
        let mut request = ApiRequest::post(&path).json(json!({ "format": format.as_str() }));

        if !filters.is_empty() {
            let schema = self.api.filters().scan_reports().await?;
            request = request.filters(&translate(filters, &schema, FilterEncoding::List)?);
        }

        self.api.request(request).await?.field(&path, "file")
    }

    pub async fn export_status(&self, scan_id: u64, file_id: u64) -> Result<ExportStatus> {
        let path = format!("scans/{}/export/{}/status", scan_id, file_id);
        self.api.request(ApiRequest::get(&path)).await?.field(&path, "status")
    }

    pub async fn export_download(&self, scan_id: u64, file_id: u64) -> Result<Vec<u8>> {
        let path = format!("scans/{}/export/{}/download", scan_id, file_id);
        Ok(self.api.request(ApiRequest::get(path)).await?.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FilterError, NessusError};
    use crate::http::Method;
    use crate::testing::{report_filter_listing, MockTransport};
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_list_with_folder_and_date() {
        let mock = MockTransport::new().respond(json!({
            "folders": [{"id": 2, "name": "My Scans", "type": "main"}],
            "scans": [{"id": 5, "name": "Weekly", "status": "completed", "folder_id": 2}],
            "timestamp": 1700000100
        }));
        let since = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();

        let list = mock.client().scans().list(Some(2), Some(since)).await.unwrap();
        assert_eq!(list.scans[0].name, "Weekly");

        assert_eq!(
            mock.requests()[0].query,
            vec![
                ("folder_id".to_string(), "2".to_string()),
                ("last_modification_date".to_string(), "1700000000".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_details_with_expanded_filters() {
        let mock = MockTransport::new()
            .respond(report_filter_listing())
            .respond(json!({"info": {"name": "Weekly"}, "hosts": []}));

        let query = ScanDetailsQuery::new()
            .history(3)
            .filter(("severity", "eq", "4"));
        let details = mock.client().scans().details(5, &query).await.unwrap();
        assert_eq!(details["info"]["name"], "Weekly");

        let requests = mock.requests();
        assert_eq!(requests[0].path, "filters/scans/reports");
        assert_eq!(requests[1].path, "scans/5");
        assert_eq!(
            requests[1].query,
            vec![
                ("history_id".to_string(), "3".to_string()),
                ("filter.0.filter".to_string(), "severity".to_string()),
                ("filter.0.quality".to_string(), "eq".to_string()),
                ("filter.0.value".to_string(), "4".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_details_rejects_unknown_filter() {
        let mock = MockTransport::new().respond(report_filter_listing());

        let query = ScanDetailsQuery::new().filter(("cvss", "gt", "7"));
        let err = mock.client().scans().details(5, &query).await.unwrap_err();

        assert!(matches!(err, NessusError::Filter(FilterError::UnknownFilter { .. })));
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_launch_and_control() {
        let mock = MockTransport::new().respond(json!({"scan_uuid": "e5c2-42"}));
        let nessus = mock.client();

        let uuid = nessus
            .scans()
            .launch(5, &["10.0.0.1".to_string()])
            .await
            .unwrap();
        assert_eq!(uuid, "e5c2-42");
        nessus.scans().pause(5).await.unwrap();
        nessus.scans().resume(5).await.unwrap();
        nessus.scans().stop(5).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].body, Some(json!({"alt_targets": ["10.0.0.1"]})));
        let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["scans/5/launch", "scans/5/pause", "scans/5/resume", "scans/5/stop"]
        );
        assert!(requests.iter().all(|r| r.method == Method::Post));
    }

    #[tokio::test]
    async fn test_delete_single_and_bulk() {
        let mock = MockTransport::new();
        let nessus = mock.client();

        nessus.scans().delete([5]).await.unwrap();
        nessus.scans().delete([5, 6]).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].path, "scans/5");
        assert_eq!(requests[1].path, "scans");
        assert_eq!(requests[1].body, Some(json!({"ids": [5, 6]})));
    }

    #[tokio::test]
    async fn test_export_flow() {
        let mock = MockTransport::new()
            .respond(report_filter_listing())
            .respond(json!({"file": 77}))
            .respond(json!({"status": "ready"}))
            .respond_bytes(b"<NessusClientData_v2/>");
        let nessus = mock.client();

        let file = nessus
            .scans()
            .export_request(5, ExportFormat::Nessus, &[Filter::new("plugin_id", "eq", "19506")])
            .await
            .unwrap();
        assert_eq!(file, 77);
        assert_eq!(
            nessus.scans().export_status(5, file).await.unwrap(),
            ExportStatus::Ready
        );
        let data = nessus.scans().export_download(5, file).await.unwrap();
        assert_eq!(data, b"<NessusClientData_v2/>".to_vec());

        let requests = mock.requests();
        assert_eq!(requests[1].path, "scans/5/export");
        assert_eq!(
            requests[1].body,
            Some(json!({
                "format": "nessus",
                "filters": [{"filter": "plugin_id", "quality": "eq", "value": "19506"}]
            }))
        );
        assert_eq!(requests[2].path, "scans/5/export/77/status");
        assert_eq!(requests[3].path, "scans/5/export/77/download");
    }

    #[tokio::test]
    async fn test_export_without_filters_skips_schema() {
        let mock = MockTransport::new().respond(json!({"file": 1}));

        mock.client()
            .scans()
            .export_request(5, ExportFormat::Csv, &[])
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body, Some(json!({"format": "csv"})));
    }
}

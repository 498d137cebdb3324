//! In-memory transport for endpoint tests.

use crate::client::Nessus;
use crate::error::Result;
use crate::http::{ApiRequest, ApiResponse, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued responses in order and records every request sent.
#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<ApiResponse>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, body: Value) -> Self {
        self.push(Ok(ApiResponse::new(200, body.to_string())))
    }

    pub(crate) fn respond_empty(self) -> Self {
        self.push(Ok(ApiResponse::new(200, Vec::new())))
    }

    pub(crate) fn respond_bytes(self, body: &[u8]) -> Self {
        self.push(Ok(ApiResponse::new(200, body.to_vec())))
    }

    pub(crate) fn fail(self, err: crate::NessusError) -> Self {
        self.push(Err(err))
    }

    fn push(self, response: Result<ApiResponse>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn client(&self) -> Nessus {
        Nessus::with_transport(Arc::new(self.clone()))
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(200, Vec::new())))
    }
}

/// The agent filter listing as the manager reports it.
pub(crate) fn agent_filter_listing() -> Value {
    serde_json::json!({
        "filters": [
            {
                "name": "name",
                "readable_name": "Name",
                "operators": ["eq", "neq", "match", "nmatch"],
                "control": {"type": "entry", "regex": ".*"}
            },
            {
                "name": "platform",
                "readable_name": "Platform",
                "operators": ["eq", "neq"],
                "control": {"type": "dropdown", "list": ["LINUX", "WINDOWS", "DARWIN"]}
            },
            {
                "name": "status",
                "readable_name": "Status",
                "operators": ["eq", "neq"],
                "control": {"type": "dropdown", "list": ["online", "offline", "initializing"]}
            }
        ],
        "wildcard_fields": ["name", "ip"]
    })
}

/// The scan report filter listing as the manager reports it.
pub(crate) fn report_filter_listing() -> Value {
    serde_json::json!({
        "filters": [
            {
                "name": "severity",
                "operators": ["eq", "neq"],
                "control": {"type": "dropdown", "list": ["0", "1", "2", "3", "4"]}
            },
            {
                "name": "plugin_id",
                "operators": ["eq", "neq", "match", "nmatch"],
                "control": {"type": "entry", "regex": "[0-9]+"}
            }
        ]
    })
}

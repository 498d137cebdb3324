//! Nessus Core Library
//!
//! Client bindings for the Nessus Manager REST API.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{AgentQuery, IdSet, ScanDetailsQuery, SortOrder};
pub use cache::{CacheError, SchemaCache};
pub use client::Nessus;
pub use config::ClientConfig;
pub use error::{FilterError, NessusError, Result};
pub use filter::{
    translate, validate, EncodedFilters, Filter, FilterDescriptor, FilterEncoding, FilterJoin,
    FilterRecord, FilterSchema,
};
pub use http::{ApiRequest, ApiResponse, HttpClient, Method, Transport};
pub use types::*;

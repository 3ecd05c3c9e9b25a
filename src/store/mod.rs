//! Remote book store client.
//!
//! This module provides the collaborator behind the view-model: the
//! [`BookStore`] contract, its implementations, and the message protocol the
//! view-model uses to request work without blocking on it.
//!
//! # Modules
//!
//! - `backend`: [`BookStore`] trait and list parameters
//! - `http`: REST implementation over `reqwest`
//! - `memory`: in-process implementation
//! - `messages`: [`StoreRequest`] / [`StoreResponse`] with trace context propagation
//! - `worker`: [`StoreWorker`], which executes requests

pub mod backend;
pub mod http;
pub mod memory;
pub mod messages;
pub mod worker;

pub use backend::{BookStore, ListParams};
pub use http::HttpBookStore;
pub use memory::MemoryBookStore;
pub use messages::{StoreFailure, StoreRequest, StoreResponse, TraceContext};
pub use worker::StoreWorker;

use crate::domain::error::Result;
use crate::Config;
use std::sync::Arc;
use std::time::Duration;

/// `api_url` value that selects the in-memory store.
pub const MEMORY_URL: &str = "memory:";

/// Builds the store selected by `config.api_url`.
///
/// # Errors
///
/// Returns a configuration error if the URL is neither [`MEMORY_URL`] nor a valid
/// http(s) URL.
pub fn from_config(config: &Config) -> Result<Arc<dyn BookStore>> {
    if config.api_url == MEMORY_URL {
        tracing::info!("using in-memory book store");
        return Ok(Arc::new(MemoryBookStore::new()));
    }

    tracing::info!(api_url = %config.api_url, timeout_secs = config.request_timeout_secs, "using HTTP book store");
    let store = HttpBookStore::new(&config.api_url, Duration::from_secs(config.request_timeout_secs))?;
    Ok(Arc::new(store))
}

//! Backend collaborators
//!
//! The controller consumes four read-only data sources: boundary datasets,
//! demographics, nearby places and name search. They sit behind the
//! [`Backend`] trait.
//!
//! [`HttpBackend`] talks to the HTTP service (and optionally reads boundary
//! files from disk); [`InMemoryBackend`] answers from a script.
//!
//! ```ignore
//! use boundaries_explorer::backend::{AsyncReqwestClient, BackendEndpoints, HttpBackend};
//!
//! let client = AsyncReqwestClient::new()?;
//! let backend = HttpBackend::new(client, BackendEndpoints::new("http://localhost:5002"));
//! ```

mod client;
mod error;
mod http;
mod memory;
mod wire;

pub use client::{
    Backend, BackendEndpoints, DemographicsLookup, DemographicsTarget, HttpBackend,
    NearbyEndpoint, NearbyQuery, DEFAULT_BASE_URL,
};
pub use error::NetworkError;
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_HTTP_TIMEOUT};
pub use memory::{BackendCall, InMemoryBackend};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;

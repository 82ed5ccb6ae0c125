//! Backend trait and HTTP implementation.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use reqwest::Url;
use tracing::debug;

use super::error::NetworkError;
use super::http::AsyncHttpClient;
use super::wire;
use crate::model::{
    BoundaryDataset, BoundaryKind, DemographicRecord, NearbyPlace, SearchHit, SearchRadius,
    SelectionPoint,
};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5002";

/// What a demographics lookup is keyed on.
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicsTarget {
    pub point: SelectionPoint,
    /// Geo identifier of the clicked feature, when one was hit.
    pub geo_id: Option<String>,
}

/// Parameters of a nearby-places request.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub point: SelectionPoint,
    pub radius: SearchRadius,
    pub page: u32,
    pub limit: u32,
}

/// Read-only data collaborators of the controller.
///
/// Implementors fetch boundary datasets, demographics, nearby places and
/// search suggestions. All methods are cancellation-safe: the controller may
/// drop a result it no longer needs.
pub trait Backend: Send + Sync {
    /// Loads the boundary dataset for `kind`.
    fn boundary_dataset(
        &self,
        kind: BoundaryKind,
    ) -> impl Future<Output = Result<BoundaryDataset, NetworkError>> + Send;

    /// Demographics for a selection. `Ok(None)` means the backend has none.
    fn demographics(
        &self,
        target: &DemographicsTarget,
    ) -> impl Future<Output = Result<Option<DemographicRecord>, NetworkError>> + Send;

    /// Places within the query radius.
    fn nearby_places(
        &self,
        query: &NearbyQuery,
    ) -> impl Future<Output = Result<Vec<NearbyPlace>, NetworkError>> + Send;

    /// Boundary names matching `query`.
    fn search(
        &self,
        kind: BoundaryKind,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SearchHit>, NetworkError>> + Send;
}

/// Which nearby-places route the deployment exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NearbyEndpoint {
    /// `/nearby`
    #[default]
    Standard,
    /// `/nearby-redis`, the cached variant.
    Cached,
}

impl NearbyEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            NearbyEndpoint::Standard => "nearby",
            NearbyEndpoint::Cached => "nearby-redis",
        }
    }
}

impl fmt::Display for NearbyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for NearbyEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nearby" | "standard" => Ok(NearbyEndpoint::Standard),
            "nearby-redis" | "cached" => Ok(NearbyEndpoint::Cached),
            other => Err(format!("unknown nearby endpoint '{}'", other)),
        }
    }
}

/// How the demographics endpoint is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemographicsLookup {
    /// `?lat=&lng=`
    #[default]
    Point,
    /// `?geoid=` when a feature was hit, falling back to the point.
    GeoId,
}

impl fmt::Display for DemographicsLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemographicsLookup::Point => write!(f, "point"),
            DemographicsLookup::GeoId => write!(f, "geoid"),
        }
    }
}

impl FromStr for DemographicsLookup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "point" => Ok(DemographicsLookup::Point),
            "geoid" | "geo_id" => Ok(DemographicsLookup::GeoId),
            other => Err(format!("unknown demographics lookup '{}'", other)),
        }
    }
}

/// Where the backend and boundary files live.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendEndpoints {
    base_url: String,
    boundary_url: String,
    boundary_dir: Option<PathBuf>,
    nearby: NearbyEndpoint,
    demographics: DemographicsLookup,
}

impl BackendEndpoints {
    /// Endpoints rooted at `base_url`; boundary files are served from the
    /// same host.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = trim_slash(base_url.into());
        Self {
            boundary_url: base_url.clone(),
            base_url,
            boundary_dir: None,
            nearby: NearbyEndpoint::default(),
            demographics: DemographicsLookup::default(),
        }
    }

    /// Serve `geo_data/{kind}.geo.json` from a different host.
    pub fn with_boundary_url(mut self, url: impl Into<String>) -> Self {
        self.boundary_url = trim_slash(url.into());
        self
    }

    /// Read boundary files from a local directory instead of HTTP.
    pub fn with_boundary_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.boundary_dir = Some(dir.into());
        self
    }

    pub fn with_nearby_endpoint(mut self, endpoint: NearbyEndpoint) -> Self {
        self.nearby = endpoint;
        self
    }

    pub fn with_demographics_lookup(mut self, lookup: DemographicsLookup) -> Self {
        self.demographics = lookup;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn boundary_url(&self) -> &str {
        &self.boundary_url
    }

    pub fn boundary_dir(&self) -> Option<&Path> {
        self.boundary_dir.as_deref()
    }

    pub fn nearby_endpoint(&self) -> NearbyEndpoint {
        self.nearby
    }

    pub fn demographics_lookup(&self) -> DemographicsLookup {
        self.demographics
    }

    pub fn demographics_url(&self, target: &DemographicsTarget) -> Result<Url, NetworkError> {
        let url = format!("{}/demographics", self.base_url);
        let geo_id = target.geo_id.as_deref().filter(|g| !g.trim().is_empty());
        match (self.demographics, geo_id) {
            (DemographicsLookup::GeoId, Some(geo_id)) => parse_url(&url, &[("geoid", geo_id)]),
            _ => parse_url(
                &url,
                &[
                    ("lat", &target.point.lat.to_string()),
                    ("lng", &target.point.lng.to_string()),
                ],
            ),
        }
    }

    pub fn nearby_url(&self, query: &NearbyQuery) -> Result<Url, NetworkError> {
        parse_url(
            &format!("{}/{}", self.base_url, self.nearby.path()),
            &[
                ("lat", &query.point.lat.to_string()),
                ("lng", &query.point.lng.to_string()),
                ("radius", &query.radius.meters().to_string()),
                ("page", &query.page.to_string()),
                ("limit", &query.limit.to_string()),
            ],
        )
    }

    pub fn search_url(&self, kind: BoundaryKind, query: &str) -> Result<Url, NetworkError> {
        parse_url(
            &format!("{}/search", self.base_url),
            &[("boundaryType", kind.as_str()), ("query", query)],
        )
    }

    pub fn boundary_file_url(&self, kind: BoundaryKind) -> Result<Url, NetworkError> {
        parse_url(
            &format!("{}/geo_data/{}.geo.json", self.boundary_url, kind.as_str()),
            &[],
        )
    }

    /// Local path of a boundary file, when a directory is configured.
    pub fn boundary_file_path(&self, kind: BoundaryKind) -> Option<PathBuf> {
        self.boundary_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.geo.json", kind.as_str())))
    }
}

impl Default for BackendEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

fn parse_url(base: &str, params: &[(&str, &str)]) -> Result<Url, NetworkError> {
    Url::parse_with_params(base, params)
        .map_err(|e| NetworkError::Http(format!("Invalid URL '{}': {}", base, e)))
}

/// [`Backend`] over HTTP (and optionally local boundary files).
pub struct HttpBackend<C> {
    client: C,
    endpoints: BackendEndpoints,
}

impl<C: AsyncHttpClient> HttpBackend<C> {
    pub fn new(client: C, endpoints: BackendEndpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn endpoints(&self) -> &BackendEndpoints {
        &self.endpoints
    }
}

impl<C: AsyncHttpClient> Backend for HttpBackend<C> {
    async fn boundary_dataset(&self, kind: BoundaryKind) -> Result<BoundaryDataset, NetworkError> {
        let body = match self.endpoints.boundary_file_path(kind) {
            Some(path) => {
                debug!(path = %path.display(), kind = %kind, "Reading boundary file");
                tokio::fs::read(&path).await.map_err(|e| NetworkError::Io {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => {
                let url = self.endpoints.boundary_file_url(kind)?;
                self.client.get(url.as_str()).await?
            }
        };
        wire::decode_boundaries(kind, &body)
    }

    async fn demographics(
        &self,
        target: &DemographicsTarget,
    ) -> Result<Option<DemographicRecord>, NetworkError> {
        let url = self.endpoints.demographics_url(target)?;
        let body = self.client.get(url.as_str()).await?;
        wire::decode_demographics(&body)
    }

    async fn nearby_places(&self, query: &NearbyQuery) -> Result<Vec<NearbyPlace>, NetworkError> {
        let url = self.endpoints.nearby_url(query)?;
        let body = self.client.get(url.as_str()).await?;
        wire::decode_nearby(&body)
    }

    async fn search(&self, kind: BoundaryKind, query: &str) -> Result<Vec<SearchHit>, NetworkError> {
        let url = self.endpoints.search_url(kind, query)?;
        let body = self.client.get(url.as_str()).await?;
        wire::decode_search(&body)
    }
}

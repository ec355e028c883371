//! OSM API v0.6 client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::{GeoDataSource, OsmApiError};
use crate::models::{BoundingBox, ExistingEntity, GeoPoint, OsmType, TagSet};

pub const DEFAULT_API_URL: &str = "https://api06.dev.openstreetmap.org/";
const USER_AGENT: &str = concat!("geopaposm/", env!("CARGO_PKG_VERSION"));

/// Credentials for write calls
#[derive(Clone)]
pub enum Credentials {
    Basic { username: String, password: String },
    Bearer(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Basic { username, .. } => write!(f, "Basic({username}, ***)"),
            Credentials::Bearer(_) => write!(f, "Bearer(***)"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    #[serde(default)]
    elements: Vec<MapElement>,
}

#[derive(Debug, Deserialize)]
struct MapElement {
    #[serde(rename = "type")]
    osm_type: OsmType,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: TagSet,
}

impl From<MapElement> for ExistingEntity {
    fn from(element: MapElement) -> Self {
        let location = match (element.lat, element.lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
            _ => None,
        };
        ExistingEntity {
            osm_type: element.osm_type,
            id: element.id,
            location,
            tags: element.tags,
        }
    }
}

/// OSM API client with connection configuration
#[derive(Debug, Clone)]
pub struct OsmClient {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl OsmClient {
    /// Create a new client against `api_url` (e.g. `https://api.openstreetmap.org/`)
    pub fn new(api_url: &str, credentials: Option<Credentials>) -> Result<Self, OsmApiError> {
        Self::with_user_agent(api_url, credentials, USER_AGENT)
    }

    pub fn with_user_agent(
        api_url: &str,
        credentials: Option<Credentials>,
        user_agent: &str,
    ) -> Result<Self, OsmApiError> {
        let mut base_url = Url::parse(api_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, OsmApiError> {
        Ok(self.base_url.join(&format!("api/0.6/{path}"))?)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, OsmApiError> {
        match &self.credentials {
            Some(Credentials::Basic { username, password }) => {
                Ok(request.basic_auth(username, Some(password)))
            }
            Some(Credentials::Bearer(token)) => Ok(request.bearer_auth(token)),
            None => Err(OsmApiError::MissingCredentials),
        }
    }

    async fn check(response: Response) -> Result<Response, OsmApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(OsmApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Download every entity inside `bbox`
    pub async fn map(&self, bbox: &BoundingBox) -> Result<Vec<ExistingEntity>, OsmApiError> {
        let mut url = self.endpoint("map.json")?;
        url.query_pairs_mut()
            .append_pair("bbox", &bbox.to_query_param());

        let response = self.client.get(url).send().await?;

        let data: MapResponse = Self::check(response).await?.json().await?;
        debug!(
            "Fetched {} elements in bbox {}",
            data.elements.len(),
            bbox.to_query_param()
        );

        Ok(data.elements.into_iter().map(ExistingEntity::from).collect())
    }

    /// Open a changeset and return its id
    pub async fn create_changeset(&self, document: String) -> Result<u64, OsmApiError> {
        let url = self.endpoint("changeset/create")?;
        let request = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(document);

        let response = self.authorized(request)?.send().await?;
        let text = Self::check(response).await?.text().await?;
        let id = text
            .trim()
            .parse::<u64>()
            .map_err(|_| OsmApiError::ChangesetId(text.clone()))?;

        info!("Opened changeset {}", id);
        Ok(id)
    }

    /// Apply an osmChange diff to an open changeset
    pub async fn upload_diff(&self, changeset: u64, document: String) -> Result<(), OsmApiError> {
        let url = self.endpoint(&format!("changeset/{changeset}/upload"))?;
        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(document);

        let response = self.authorized(request)?.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn close_changeset(&self, changeset: u64) -> Result<(), OsmApiError> {
        let url = self.endpoint(&format!("changeset/{changeset}/close"))?;
        let request = self.client.put(url);

        let response = self.authorized(request)?.send().await?;
        Self::check(response).await?;

        info!("Closed changeset {}", changeset);
        Ok(())
    }
}

#[async_trait]
impl GeoDataSource for OsmClient {
    async fn fetch_nearby(&self, bbox: &BoundingBox) -> Result<Vec<ExistingEntity>, OsmApiError> {
        self.map(bbox).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = OsmClient::new("https://example.org/osm", None).unwrap();
        assert_eq!(
            client.endpoint("map.json").unwrap().as_str(),
            "https://example.org/osm/api/0.6/map.json"
        );
    }

    #[test]
    fn test_write_requires_credentials() {
        let client = OsmClient::new(DEFAULT_API_URL, None).unwrap();
        let request = client.client.put(client.endpoint("changeset/create").unwrap());
        assert!(matches!(
            client.authorized(request),
            Err(OsmApiError::MissingCredentials)
        ));
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let basic = Credentials::Basic {
            username: "mapper".into(),
            password: "hunter2".into(),
        };
        assert_eq!(format!("{basic:?}"), "Basic(mapper, ***)");
        assert!(!format!("{:?}", Credentials::Bearer("tok".into())).contains("tok"));
    }

    #[test]
    fn test_map_response_decoding() {
        let json = r#"{
            "version": "0.6",
            "elements": [
                {"type": "node", "id": 1, "lat": 46.0, "lon": 11.0, "tags": {"amenity": "cafe"}},
                {"type": "node", "id": 2, "lat": 46.0, "lon": 11.0},
                {"type": "way", "id": 3, "nodes": [1, 2], "tags": {"highway": "path"}}
            ]
        }"#;
        let data: MapResponse = serde_json::from_str(json).unwrap();
        let entities: Vec<ExistingEntity> =
            data.elements.into_iter().map(ExistingEntity::from).collect();

        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0].tags["amenity"], "cafe");
        assert_eq!(entities[0].location, Some(GeoPoint { lat: 46.0, lon: 11.0 }));
        assert!(entities[1].tags.is_empty());
        assert_eq!(entities[2].osm_type, OsmType::Way);
        assert!(entities[2].location.is_none());
    }
}

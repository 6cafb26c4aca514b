//! Plex HTTP adapter for the [`LibraryService`] trait.
//!
//! Talks to the Plex Media Server REST API: `/search` for title lookup,
//! `/library/metadata/{id}` for field fetch and batched edits,
//! `/library/metadata/{id}/posters` for poster upload.

use crate::models::item::{fields, FieldValue, ItemKind, LibraryItem};
use crate::models::record::Actor;
use crate::services::library::LibraryService;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default per-request timeout. A timeout surfaces as a retryable
/// `Transient` error, never a session abort.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Plex connection configuration.
#[derive(Debug, Clone)]
pub struct PlexConfig {
    /// Server base URL without trailing slash.
    pub base_url: String,
    pub token: String,
}

impl PlexConfig {
    /// Create config from `PLEX_URL` / `PLEX_TOKEN` environment variables.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("PLEX_URL").map_err(|_| Error::ServerUrlMissing)?;
        let token = std::env::var("PLEX_TOKEN").map_err(|_| Error::TokenMissing)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

/// Plex API client.
pub struct PlexClient {
    config: PlexConfig,
    client: reqwest::Client,
}

// --- Plex wire types ---------------------------------------------------

#[derive(Debug, Deserialize)]
struct MediaContainerResponse {
    #[serde(rename = "MediaContainer")]
    container: MediaContainer,
}

#[derive(Debug, Deserialize, Default)]
struct MediaContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<Metadata>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(rename = "ratingKey")]
    rating_key: String,
    #[serde(rename = "type")]
    item_type: String,
    title: Option<String>,
    #[serde(rename = "originalTitle")]
    original_title: Option<String>,
    year: Option<u16>,
    index: Option<u32>,
    summary: Option<String>,
    studio: Option<String>,
    #[serde(rename = "contentRating")]
    content_rating: Option<String>,
    rating: Option<f32>,
    #[serde(rename = "Genre", default)]
    genres: Vec<Tag>,
    #[serde(rename = "Role", default)]
    roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    tag: String,
}

#[derive(Debug, Deserialize)]
struct Role {
    tag: String,
    role: Option<String>,
    thumb: Option<String>,
}

impl Metadata {
    fn kind(&self) -> Option<ItemKind> {
        match self.item_type.as_str() {
            "movie" => Some(ItemKind::Movie),
            "show" => Some(ItemKind::Show),
            "season" => Some(ItemKind::Season),
            "episode" => Some(ItemKind::Episode),
            _ => None,
        }
    }

    fn field_map(&self) -> BTreeMap<String, FieldValue> {
        let mut map = BTreeMap::new();
        let text_fields = [
            (fields::TITLE, self.title.as_deref()),
            (fields::ORIGINAL_TITLE, self.original_title.as_deref()),
            (fields::SUMMARY, self.summary.as_deref()),
            (fields::STUDIO, self.studio.as_deref()),
            (fields::CONTENT_RATING, self.content_rating.as_deref()),
        ];
        for (name, value) in text_fields {
            if let Some(v) = value {
                if !v.trim().is_empty() {
                    map.insert(name.to_string(), FieldValue::Text(v.to_string()));
                }
            }
        }
        if let Some(rating) = self.rating {
            map.insert(
                fields::RATING.to_string(),
                FieldValue::Text(format!("{rating:.1}")),
            );
        }
        if let Some(year) = self.year {
            map.insert(fields::YEAR.to_string(), FieldValue::Text(year.to_string()));
        }
        if !self.genres.is_empty() {
            map.insert(
                fields::GENRES.to_string(),
                FieldValue::List(self.genres.iter().map(|g| g.tag.clone()).collect()),
            );
        }
        if !self.roles.is_empty() {
            map.insert(
                fields::ACTORS.to_string(),
                FieldValue::Actors(
                    self.roles
                        .iter()
                        .map(|r| Actor {
                            name: r.tag.clone(),
                            role: r.role.clone(),
                            thumb_url: r.thumb.clone(),
                        })
                        .collect(),
                ),
            );
        }
        map
    }

    fn into_item(self) -> Option<LibraryItem> {
        let kind = self.kind()?;
        let fields = self.field_map();
        Some(LibraryItem {
            id: self.rating_key,
            kind,
            title: self.title.unwrap_or_default(),
            year: self.year,
            index: self.index,
            fields,
        })
    }
}

// --- Client -------------------------------------------------------------

impl PlexClient {
    /// Create a new client.
    pub fn new(config: PlexConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Create a new client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(PlexConfig::from_env()?)
    }

    /// Check that the server is reachable and the token accepted.
    pub async fn verify_connection(&self) -> Result<()> {
        let url = format!("{}/?X-Plex-Token={}", self.config.base_url, self.config.token);
        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(map_request_error)?;
        check_status(&resp)?;
        tracing::info!("Connected to Plex at {}", self.config.base_url);
        Ok(())
    }

    fn url(&self, path: &str, extra_params: &str) -> String {
        format!(
            "{}{}?X-Plex-Token={}{}",
            self.config.base_url, path, self.config.token, extra_params
        )
    }

    async fn get_container(&self, path: &str, extra_params: &str) -> Result<MediaContainer> {
        let resp = self
            .client
            .get(self.url(path, extra_params))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(map_request_error)?;
        check_status(&resp)?;
        let body: MediaContainerResponse =
            resp.json().await.map_err(map_request_error)?;
        Ok(body.container)
    }

    /// Plex item type code used by the edit endpoint.
    fn type_code(kind: ItemKind) -> u8 {
        match kind {
            ItemKind::Movie => 1,
            ItemKind::Show => 2,
            ItemKind::Season => 3,
            ItemKind::Episode => 4,
        }
    }

    /// Encode field updates as Plex edit query parameters.
    fn edit_params(fields_map: &BTreeMap<String, FieldValue>) -> String {
        let mut params = String::new();
        for (name, value) in fields_map {
            match value {
                FieldValue::Text(v) => {
                    params.push_str(&format!(
                        "&{}.value={}&{}.locked=1",
                        name,
                        urlencoding::encode(v.trim()),
                        name
                    ));
                }
                FieldValue::List(values) => {
                    // Plural collection name -> singular tag parameter.
                    let tag = name.trim_end_matches('s');
                    for (i, v) in values.iter().enumerate() {
                        params.push_str(&format!(
                            "&{}[{}].tag.tag={}",
                            tag,
                            i,
                            urlencoding::encode(v.trim())
                        ));
                    }
                    params.push_str(&format!("&{tag}.locked=1"));
                }
                FieldValue::Actors(actors) => {
                    for (i, actor) in actors.iter().enumerate() {
                        params.push_str(&format!(
                            "&actor[{}].tag.tag={}",
                            i,
                            urlencoding::encode(actor.name.trim())
                        ));
                        if let Some(role) = &actor.role {
                            params.push_str(&format!(
                                "&actor[{}].tag.role={}",
                                i,
                                urlencoding::encode(role.trim())
                            ));
                        }
                        if let Some(thumb) = &actor.thumb_url {
                            params.push_str(&format!(
                                "&actor[{}].tag.thumb={}",
                                i,
                                urlencoding::encode(thumb.trim())
                            ));
                        }
                    }
                    params.push_str("&actor.locked=1");
                }
            }
        }
        params
    }
}

#[async_trait]
impl LibraryService for PlexClient {
    async fn find_by_title(&self, kind: ItemKind, title: &str) -> Result<Vec<LibraryItem>> {
        let container = self
            .get_container(
                "/search",
                &format!("&query={}", urlencoding::encode(title.trim())),
            )
            .await?;

        let items = container
            .metadata
            .into_iter()
            .filter_map(Metadata::into_item)
            .filter(|item| item.kind == kind)
            .collect();
        Ok(items)
    }

    async fn children_of(&self, item: &LibraryItem) -> Result<Vec<LibraryItem>> {
        let container = self
            .get_container(&format!("/library/metadata/{}/children", item.id), "")
            .await?;
        Ok(container
            .metadata
            .into_iter()
            .filter_map(Metadata::into_item)
            .collect())
    }

    async fn current_fields(&self, item: &LibraryItem) -> Result<BTreeMap<String, FieldValue>> {
        let container = self
            .get_container(&format!("/library/metadata/{}", item.id), "")
            .await?;
        let metadata = container.metadata.into_iter().next().ok_or_else(|| {
            Error::NotFound(format!("library item {} no longer exists", item.id))
        })?;
        Ok(metadata.field_map())
    }

    async fn apply_fields(
        &self,
        item: &LibraryItem,
        fields_map: &BTreeMap<String, FieldValue>,
    ) -> Result<()> {
        let params = format!(
            "&type={}{}",
            Self::type_code(item.kind),
            Self::edit_params(fields_map)
        );
        let url = self.url(&format!("/library/metadata/{}", item.id), &params);
        let resp = self
            .client
            .put(url)
            .send()
            .await
            .map_err(map_request_error)?;
        check_status(&resp)?;
        tracing::debug!("Applied {} field(s) to item {}", fields_map.len(), item.id);
        Ok(())
    }

    async fn upload_poster(&self, item: &LibraryItem, bytes: &[u8]) -> Result<()> {
        let url = self.url(&format!("/library/metadata/{}/posters", item.id), "");
        let resp = self
            .client
            .post(url)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(map_request_error)?;
        check_status(&resp)?;
        tracing::debug!("Uploaded poster ({} bytes) for item {}", bytes.len(), item.id);
        Ok(())
    }
}

/// Map transport-level failures onto the engine taxonomy.
fn map_request_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Transient(format!("request timed out: {e}"))
    } else if e.is_connect() {
        Error::ServiceUnavailable(format!("cannot reach server: {e}"))
    } else {
        Error::Transient(e.to_string())
    }
}

/// Map HTTP status codes onto the engine taxonomy.
fn check_status(resp: &reqwest::Response) -> Result<()> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    match status.as_u16() {
        401 | 403 => Err(Error::Authorization(format!("server returned {status}"))),
        503 => Err(Error::ServiceUnavailable(format!("server returned {status}"))),
        _ => Err(Error::Transient(format!("server returned {status}"))),
    }
}

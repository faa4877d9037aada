//! Remote data service reached over HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use learn_core::model::{Catalog, CourseId, CourseSnapshot, UserAction, UserId, UserRecords};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::repository::{
    CatalogRepository, IngestRepository, IngestRequest, Storage, StorageError,
    UserRecordRepository,
};

mod config;
mod mapping;
mod wire;

pub use config::{RemoteConfig, RemoteConfigError};

use wire::{CatalogItem, CourseItem, IngestPayload, IngestResponse, UserItem};

#[derive(Clone)]
pub struct HttpRepository {
    client: Client,
    config: RemoteConfig,
}

impl HttpRepository {
    /// # Errors
    ///
    /// Returns `RemoteConfigError::Client` if the HTTP client cannot be built.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteConfigError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, StorageError> {
        let mut url = self.config.base_url().clone();
        url.path_segments_mut()
            .map_err(|()| StorageError::Connection("base URL cannot take a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.auth_token() {
            Some(token) => request.header(AUTHORIZATION, token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StorageError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        warn!(url = %response.url(), %status, "remote request failed");
        Err(match status {
            StatusCode::NOT_FOUND => StorageError::NotFound,
            other => StorageError::Status(other.as_u16()),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, StorageError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl CatalogRepository for HttpRepository {
    async fn list_courses(&self) -> Result<Catalog, StorageError> {
        let url = self.endpoint(&["courses"])?;
        let items: Vec<CatalogItem> = self.get_json(self.client.get(url)).await?;
        debug!(count = items.len(), "fetched catalog");
        Ok(mapping::catalog_from_items(items))
    }

    async fn get_course(&self, course_id: &CourseId) -> Result<CourseSnapshot, StorageError> {
        let url = self.endpoint(&["courses", course_id.as_str()])?;
        let items: Vec<CourseItem> = self.get_json(self.client.get(url)).await?;
        mapping::course_from_items(course_id, items)
    }
}

#[async_trait]
impl UserRecordRepository for HttpRepository {
    async fn get_records(&self, user_id: &UserId) -> Result<UserRecords, StorageError> {
        let url = self.endpoint(&["user"])?;
        let request = self.client.get(url).query(&[("userId", user_id.as_str())]);
        let items: Vec<UserItem> = self.get_json(request).await?;
        Ok(mapping::records_from_items(items))
    }

    async fn apply_action(
        &self,
        user_id: &UserId,
        action: &UserAction,
    ) -> Result<(), StorageError> {
        let url = self.endpoint(&["user"])?;
        let payload = mapping::action_payload(user_id, action);
        self.send(self.client.post(url).json(&payload)).await?;
        debug!(kind = %action.kind(), course = %action.course_id(), "remote write accepted");
        Ok(())
    }
}

#[async_trait]
impl IngestRepository for HttpRepository {
    async fn ingest_playlist(&self, request: &IngestRequest) -> Result<String, StorageError> {
        let url = self.endpoint(&["admin", "ingest"])?;
        let payload = IngestPayload {
            playlist_id: request.playlist_id.clone(),
            course_title: request.course_title.clone(),
        };
        let response: IngestResponse = self.get_json(self.client.post(url).json(&payload)).await?;
        response
            .message
            .ok_or_else(|| StorageError::Rejected("ingest response carried no message".into()))
    }
}

impl Storage {
    /// Build a `Storage` backed by the remote HTTP service.
    ///
    /// # Errors
    ///
    /// Returns `RemoteConfigError` if the HTTP client cannot be built.
    pub fn http(config: RemoteConfig) -> Result<Self, RemoteConfigError> {
        let repo = HttpRepository::new(config)?;
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo.clone());
        let records: Arc<dyn UserRecordRepository> = Arc::new(repo.clone());
        let ingest: Arc<dyn IngestRepository> = Arc::new(repo);
        Ok(Self {
            catalog,
            records,
            ingest,
        })
    }
}

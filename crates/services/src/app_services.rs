use std::sync::Arc;

use learn_core::model::UserIdentity;
use learn_core::playback::PlaybackConfig;
use storage::Storage;
use storage::http::RemoteConfig;
use tokio::sync::broadcast;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::playback::{CourseLoader, MonitorEvents, PlaybackMonitor};
use crate::sync::{RemoteSync, SyncEvent};

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    playback: PlaybackConfig,
    sync: RemoteSync,
    loader: CourseLoader,
    dashboard: Arc<DashboardService>,
    catalog: Arc<CatalogService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, playback: PlaybackConfig) -> Self {
        let sync = RemoteSync::new(Arc::clone(&storage.records), clock);
        let loader = CourseLoader::new(Arc::clone(&storage.catalog), Arc::clone(&storage.records));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&storage.catalog),
            Arc::clone(&storage.records),
        ));
        let catalog = Arc::new(CatalogService::new(
            Arc::clone(&storage.catalog),
            Arc::clone(&storage.records),
            Arc::clone(&storage.ingest),
        ));
        Self {
            playback,
            sync,
            loader,
            dashboard,
            catalog,
        }
    }

    /// Build services backed by the remote data service.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Remote` if the HTTP client cannot be built.
    pub fn remote(config: RemoteConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::http(config)?;
        Ok(Self::new(&storage, clock, PlaybackConfig::default()))
    }

    #[must_use]
    pub fn with_playback(mut self, playback: PlaybackConfig) -> Self {
        self.playback = playback;
        self
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    /// Outcomes of background writes made by any monitor built from here.
    #[must_use]
    pub fn sync_events(&self) -> broadcast::Receiver<SyncEvent> {
        self.sync.subscribe()
    }

    #[must_use]
    pub fn playback_monitor(&self, identity: UserIdentity) -> (PlaybackMonitor, MonitorEvents) {
        PlaybackMonitor::new(identity, self.playback, self.loader.clone(), self.sync.clone())
    }
}

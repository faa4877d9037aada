#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod dashboard_service;
pub mod error;
pub mod playback;
pub mod sync;
pub mod watched;

pub use learn_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use dashboard_service::{Dashboard, DashboardService};
pub use error::{AppServicesError, CatalogServiceError, DashboardServiceError};
pub use playback::{
    CourseLoader, LoadTicket, LoadedCourse, MonitorEvent, MonitorEvents, MonitorView,
    PlaybackMonitor,
};
pub use sync::{RemoteSync, SyncEvent, SyncOutcome};
pub use watched::{MarkOutcome, WatchTracker};

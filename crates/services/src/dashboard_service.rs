use std::sync::Arc;

use learn_core::model::{Bookmark, Catalog, UserIdentity, UserRecords};
use learn_core::progress::{ProgressRecord, reconcile_records};
use storage::{CatalogRepository, UserRecordRepository};
use tracing::{debug, warn};

use crate::error::DashboardServiceError;

/// Enrolled-course progress and saved bookmarks for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dashboard {
    pub courses: Vec<ProgressRecord>,
    pub bookmarks: Vec<Bookmark>,
}

#[derive(Clone)]
pub struct DashboardService {
    catalog: Arc<dyn CatalogRepository>,
    records: Arc<dyn UserRecordRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        records: Arc<dyn UserRecordRepository>,
    ) -> Self {
        Self { catalog, records }
    }

    /// Fetch the user's records and derive their dashboard.
    ///
    /// The catalog only repairs lesson totals, so a failed catalog fetch
    /// degrades to enrollment totals instead of failing the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `DashboardServiceError::Storage` if the user's records cannot
    /// be fetched.
    pub async fn load(&self, identity: &UserIdentity) -> Result<Dashboard, DashboardServiceError> {
        let records = self.records.get_records(identity.user_id()).await?;
        let catalog = match self.catalog.list_courses().await {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(%err, "catalog unavailable; using enrollment totals only");
                Catalog::empty()
            }
        };
        let dashboard = Self::build(&records, &catalog);
        debug!(
            user = %identity.user_id(),
            courses = dashboard.courses.len(),
            bookmarks = dashboard.bookmarks.len(),
            "dashboard built"
        );
        Ok(dashboard)
    }

    #[must_use]
    pub fn build(records: &UserRecords, catalog: &Catalog) -> Dashboard {
        Dashboard {
            courses: reconcile_records(records, catalog),
            bookmarks: records.bookmarks().to_vec(),
        }
    }
}

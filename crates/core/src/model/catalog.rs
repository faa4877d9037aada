use crate::model::ids::CourseId;

/// One course as advertised by the public catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    course_id: CourseId,
    title: Option<String>,
    total_videos: Option<u32>,
}

impl CatalogEntry {
    #[must_use]
    pub fn new(course_id: CourseId, title: Option<String>, total_videos: Option<u32>) -> Self {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self {
            course_id,
            title,
            total_videos,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Lesson count as reported by the catalog. May be absent or stale.
    #[must_use]
    pub fn total_videos(&self) -> Option<u32> {
        self.total_videos
    }
}

/// Snapshot of the public course catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// An empty catalog, used when the listing could not be fetched.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn find(&self, course_id: &CourseId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| &e.course_id == course_id)
    }

    /// Case-insensitive title search. Entries without a title never match.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        let needle = query.trim().to_lowercase();
        self.entries.iter().filter(move |entry| {
            entry
                .title
                .as_ref()
                .is_some_and(|title| title.to_lowercase().contains(&needle))
        })
    }
}

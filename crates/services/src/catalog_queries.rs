use std::sync::Arc;

use course_core::Catalog;
use course_core::model::{Course, CourseId, CourseSummary};

use crate::error::CatalogQueryError;

/// Read-only lookups over the course catalog.
#[derive(Clone)]
pub struct CatalogQueries {
    catalog: Arc<Catalog>,
}

impl CatalogQueries {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<CourseSummary> {
        self.catalog.summaries()
    }

    #[must_use]
    pub fn course_ids(&self) -> Vec<CourseId> {
        self.catalog.course_ids().into_iter().cloned().collect()
    }

    /// Fetch a full course definition.
    ///
    /// # Errors
    ///
    /// Returns `CatalogQueryError::NotFound` for an unknown id.
    pub fn course(&self, id: &str) -> Result<Arc<Course>, CatalogQueryError> {
        self.catalog
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogQueryError::NotFound { id: id.to_owned() })
    }
}

use std::sync::Arc;

use course_core::Catalog;
use storage::repository::Storage;

use crate::Clock;
use crate::catalog_queries::CatalogQueries;
use crate::course_controller::CourseController;
use crate::error::AppServicesError;
use crate::progress_store::ProgressStore;
use crate::quiz_service::QuizService;

/// Assembles app-facing services over one catalog and one store.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    progress: ProgressStore,
    courses: Arc<CourseController>,
    quizzes: Arc<QuizService>,
    queries: Arc<CatalogQueries>,
}

impl AppServices {
    /// Build services over the bundled catalog backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog or storage cannot be
    /// initialised.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(Catalog::builtin()?);
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_parts(catalog, &storage, clock))
    }

    /// Build services over the bundled catalog with throwaway storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the bundled content is invalid.
    pub fn in_memory(clock: Clock) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(Catalog::builtin()?);
        Ok(Self::from_parts(catalog, &Storage::in_memory(), clock))
    }

    #[must_use]
    pub fn from_parts(catalog: Arc<Catalog>, storage: &Storage, clock: Clock) -> Self {
        let progress = ProgressStore::new(clock, Arc::clone(&storage.kv));
        let courses = Arc::new(CourseController::new(Arc::clone(&catalog), progress.clone()));
        let quizzes = Arc::new(QuizService::new(Arc::clone(&catalog), progress.clone()));
        let queries = Arc::new(CatalogQueries::new(Arc::clone(&catalog)));
        Self {
            catalog,
            progress,
            courses,
            quizzes,
            queries,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseController> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }

    #[must_use]
    pub fn queries(&self) -> Arc<CatalogQueries> {
        Arc::clone(&self.queries)
    }
}

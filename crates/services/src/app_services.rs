use std::sync::Arc;

use quiz_core::model::QuizSettings;
use storage::repository::Storage;

use crate::Clock;
use crate::admin_service::AdminService;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::import_service::ImportService;
use crate::quiz_service::QuizService;

/// Assembles every service over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    settings: QuizSettings,
    import: Arc<ImportService>,
    quiz: Arc<QuizService>,
    dashboard: Arc<DashboardService>,
    admin: Arc<AdminService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: QuizSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, settings))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, settings: QuizSettings) -> Self {
        let import = Arc::new(ImportService::new(
            settings.clone(),
            Arc::clone(&storage.questions),
        ));
        let quiz = Arc::new(QuizService::new(
            clock,
            settings.clone(),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.attempts),
            Arc::clone(&storage.starts),
        ));
        let dashboard = Arc::new(DashboardService::new(
            settings.questions_per_quiz(),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.attempts),
            Arc::clone(&storage.starts),
        ));
        let admin = Arc::new(AdminService::new(
            Arc::clone(&storage.attempts),
            Arc::clone(&storage.reset),
        ));

        Self {
            settings,
            import,
            quiz,
            dashboard,
            admin,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn import(&self) -> Arc<ImportService> {
        Arc::clone(&self.import)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn admin(&self) -> Arc<AdminService> {
        Arc::clone(&self.admin)
    }
}

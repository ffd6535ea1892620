#![forbid(unsafe_code)]

pub mod admin_service;
pub mod app_services;
pub mod dashboard_service;
pub mod document;
pub mod error;
pub mod import_service;
pub mod quiz_service;

pub use quiz_core::Clock;

pub use admin_service::{AdminService, ClearReport};
pub use app_services::AppServices;
pub use dashboard_service::DashboardService;
pub use error::{AppServicesError, DocumentError, QuizError, ServiceError};
pub use import_service::{ImportReport, ImportService, ImportStatus};
pub use quiz_service::{QuizQuestion, QuizService, QuizTicket};

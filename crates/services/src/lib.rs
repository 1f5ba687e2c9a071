#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_queries;
pub mod course_controller;
pub mod error;
pub mod progress_store;
pub mod quiz_service;

pub use course_core::Clock;

pub use app_services::AppServices;
pub use catalog_queries::CatalogQueries;
pub use course_controller::{
    CourseController, CourseProgressView, CourseSession, CourseStep, LessonStatusView,
};
pub use error::{AppServicesError, CatalogQueryError, CourseSessionError, QuizSessionError};
pub use progress_store::{ProgressStore, SaveStatus};
pub use quiz_service::{QuizService, QuizSession, QuizStep, RevealedAnswer};

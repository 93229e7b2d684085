pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod handlers;
pub mod models;
pub mod render;
pub mod routes;
pub mod session;
pub mod submission;

// Re-export key functions for convenience
pub use app::{create_app, init_tracing};
pub use client::{EvaluationClient, Evaluator};
pub use submission::{SubmissionController, SubmissionOutcome};

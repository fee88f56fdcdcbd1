// ============================================================================
// classroom_kit
// ============================================================================
//
// Independent classroom tools sharing only configuration, logging and error
// plumbing:
//
// - `grading`   random exam assignment over a student CSV
// - `students`  CSV-backed student roster API
// - `books`     read-only books catalog API
// - `courses`   course API over a document store
// - `library`   document-store query and aggregation walkthrough
// - `warehouse` columnar database walkthrough

pub mod books;
pub mod config;
pub mod courses;
pub mod error;
pub mod grading;
pub mod library;
pub mod server;
pub mod students;
pub mod warehouse;

pub use error::{AppError, AppResult};

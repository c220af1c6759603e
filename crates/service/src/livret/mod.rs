//! Livret module: domain types, the repository seam, and the two business
//! services built on it (student sessions and teacher administration).

pub mod admin_service;
pub mod domain;
pub mod file_store;
pub mod repository;
pub mod student_service;

pub use admin_service::AdminService;
pub use file_store::FileLivretStore;
pub use repository::LivretRepository;
pub use student_service::StudentService;

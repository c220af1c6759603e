use std::sync::Arc;

use service::livret::{AdminService, LivretRepository, StudentService};

/// Shared handler state: both services over one repository.
#[derive(Clone)]
pub struct ServerState {
    pub students: Arc<StudentService>,
    pub admin: Arc<AdminService>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn LivretRepository>, admin_password: impl Into<String>) -> Self {
        Self {
            students: Arc::new(StudentService::new(repo.clone())),
            admin: Arc::new(AdminService::new(repo, admin_password)),
        }
    }
}

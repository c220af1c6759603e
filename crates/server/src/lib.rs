pub mod errors;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::{bind_listener, build_app, run, run_until};

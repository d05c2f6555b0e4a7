pub mod health;
pub mod routes;
pub mod submit;

pub use routes::{create_routes, SUBMIT_FORM_PATH};

pub mod grading;
pub mod routes;

pub use routes::routes;

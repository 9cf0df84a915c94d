pub mod advances;
pub mod amendments;
pub mod contracts;
pub mod payroll;
pub mod repository;

pub use repository::RepositoryError;

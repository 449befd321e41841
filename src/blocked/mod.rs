pub mod models;
pub mod repository;
pub mod handlers;

pub use models::*;
pub use repository::*;
pub use handlers::*;

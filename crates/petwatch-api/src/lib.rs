pub mod clock;
pub mod error;
pub mod retry;
pub mod routes;
pub mod service;

pub use error::PetError;
pub use service::{CompanionService, ServiceConfig};

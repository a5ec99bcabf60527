pub mod analysis;
pub mod analytics;
pub mod chat;
pub mod feedback;
pub(crate) mod health;
pub mod planning;

pub use health::health_check;

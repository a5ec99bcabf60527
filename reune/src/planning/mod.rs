//! Deterministic planning tools: quantity estimation and gift-exchange draws.

pub mod churrasco;
pub mod secret_santa;

pub use churrasco::estimate as estimate_churrasco;
pub use secret_santa::{perform_draw, validate_participants, SecretSantaPair};

//! ReUNE conversational core.
//!
//! Reads Portuguese event-planning messages, keeps per-user conversation
//! state, answers from templates and offers planning tools (churrasco
//! estimates, Secret Santa draws) over a versioned HTTP API.

pub mod api;
pub mod config;
pub mod conversation;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod nlp;
pub mod planning;
pub mod rpc;

pub use error::{Result, ReuneError};

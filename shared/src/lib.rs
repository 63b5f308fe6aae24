//! Shared types for the table-order system
//!
//! Types used by the order server and by any Rust client of it:
//! the unified error system, entity models and hub message types.

pub mod error;
pub mod message;
pub mod models;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

// Hub message re-exports (for convenient access)
pub use message::{HubCommand, HubEvent, HubEventData, HubMessage, Topic};

//! Session domain module.
//!
//! This module contains the locally cached session model and the store
//! interface behind which it is persisted.
//!
//! # Module Structure
//!
//! - `model`: session snapshot and identity types, validity window
//! - `store`: `SessionStore` trait for session persistence

mod model;
mod store;

pub use model::{Identity, SessionSnapshot, SESSION_TTL_DAYS};
pub use store::SessionStore;

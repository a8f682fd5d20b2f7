//! User domain module.
//!
//! Contains the user profile model shared between the local cache and the
//! remote service wire format.

mod model;

pub use model::UserProfile;

//! Partner link domain module.
//!
//! A link is a bidirectional association between two user accounts,
//! identified by an opaque key, representing a "couple" relationship.

mod model;

pub use model::{PartnerLink, Relationship};

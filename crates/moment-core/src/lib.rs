pub mod error;
pub mod link;
pub mod remote;
pub mod session;
pub mod user;

// Re-export common error type
pub use error::MomentError;

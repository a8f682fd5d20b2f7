pub mod http_remote_service;
pub mod key_value_store;
pub mod kv_session_store;

pub use crate::http_remote_service::HttpRemoteService;
pub use crate::key_value_store::{JsonFileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use crate::kv_session_store::KvSessionStore;

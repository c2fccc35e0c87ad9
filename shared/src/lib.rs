pub mod types;
pub mod error;
pub mod config;
pub mod credentials;
pub mod token;
pub mod validation;
pub mod users;
pub mod s3;
pub mod auth;
pub mod profile;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

use config::Config;
use s3::ObjectStore;
use std::sync::Arc;
use users::RecordStore;

/// Shared application state
///
/// Built once per cold start and handed to every invocation. The stores are
/// trait objects so tests can swap in the in-memory versions.
pub struct AppState {
    pub config: Config,
    pub objects: Arc<dyn ObjectStore>,
    pub records: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        objects: Arc<dyn ObjectStore>,
        records: Arc<dyn RecordStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            objects,
            records,
        })
    }
}

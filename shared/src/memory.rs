//! In-memory store implementations for tests.
//!
//! `MemoryObjectStore` records every call so tests can assert on ordering,
//! and both stores can be told to fail to exercise the error paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::ApiError;
use crate::s3::{public_object_url, ObjectStore};
use crate::types::UserRecord;
use crate::users::RecordStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectOp {
    Presign { key: String, content_type: String },
    Delete { key: String },
}

#[derive(Default)]
pub struct MemoryObjectStore {
    bucket: String,
    ops: Mutex<Vec<ObjectOp>>,
    fail_presign: AtomicBool,
    fail_delete: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Every call made so far, in order. Failed calls are recorded too.
    pub fn ops(&self) -> Vec<ObjectOp> {
        self.ops.lock().map(|ops| ops.clone()).unwrap_or_default()
    }

    pub fn fail_presign(&self, fail: bool) {
        self.fail_presign.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    fn record(&self, op: ObjectOp) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.push(op);
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, ApiError> {
        self.record(ObjectOp::Presign {
            key: key.to_string(),
            content_type: content_type.to_string(),
        });
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(ApiError::ObjectStore("presign failure injected".to_string()));
        }
        Ok(format!(
            "{}?X-Amz-Expires={}&X-Amz-Signature=memory",
            public_object_url(&self.bucket, key),
            expires_in.as_secs()
        ))
    }

    async fn delete_object(&self, key: &str) -> Result<(), ApiError> {
        self.record(ObjectOp::Delete {
            key: key.to_string(),
        });
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ApiError::ObjectStore("delete failure injected".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    users: Mutex<HashMap<String, UserRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, email: &str) -> Option<UserRecord> {
        self.users.lock().ok()?.get(email).cloned()
    }

    pub fn insert(&self, user: UserRecord) {
        if let Ok(mut users) = self.users.lock() {
            users.insert(user.email.clone(), user);
        }
    }

    pub fn len(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), ApiError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ApiError::RecordStore("write failure injected".to_string()));
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> ApiError {
    ApiError::RecordStore("record store lock poisoned".to_string())
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_user(&self, user: &UserRecord) -> Result<(), ApiError> {
        self.check_writable()?;
        let mut users = self.users.lock().map_err(poisoned)?;
        if users.contains_key(&user.email) {
            return Err(ApiError::UserExists);
        }
        users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, email: &str) -> Result<Option<UserRecord>, ApiError> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users.get(email).cloned())
    }

    async fn update_profile_image(&self, email: &str, url: &str) -> Result<(), ApiError> {
        self.check_writable()?;
        let mut users = self.users.lock().map_err(poisoned)?;
        let user = users.get_mut(email).ok_or(ApiError::UserNotFound)?;
        user.profile_image_url = url.to_string();
        Ok(())
    }
}

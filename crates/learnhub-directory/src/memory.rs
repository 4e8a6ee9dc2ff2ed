//! In-memory directory used by tests and single-process deployments

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::{DirectoryError, UserDirectory, UserRecord};

/// Directory backed by a fixed set of records
#[derive(Default)]
pub struct StaticUserDirectory {
    users: RwLock<HashMap<i32, UserRecord>>,
}

impl StaticUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_user(self, user: UserRecord) -> Self {
        self.insert(user);
        self
    }

    pub fn insert(&self, user: UserRecord) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.id, user);
        }
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, DirectoryError> {
        let users = self
            .users
            .read()
            .map_err(|_| DirectoryError::Unavailable("user table lock poisoned".to_string()))?;
        Ok(users.get(&id).cloned())
    }
}

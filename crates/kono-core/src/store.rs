use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ChatId, User},
    ports::UserStore,
    Result,
};

/// HashMap-backed user store, used by tests and as a storage-free fallback.
///
/// `save` has the same insert-if-absent semantics as the SQLite store: the
/// first write for an id wins, later saves return the stored record.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: Mutex<HashMap<i64, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: ChatId) -> Result<Option<User>> {
        Ok(self.inner.lock().await.get(&id.0).cloned())
    }

    async fn save(&self, user: &User) -> Result<User> {
        let mut map = self.inner.lock().await;
        Ok(map.entry(user.id.0).or_insert_with(|| user.clone()).clone())
    }
}

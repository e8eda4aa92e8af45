use crate::application::ports::store::{Applied, Change, Store, StoreError};

/// Unit of work over a [`Store`]. Writes are queued with [`Session::add`] /
/// [`Session::push`] and nothing reaches the store until [`Session::commit`];
/// constraint violations therefore surface only at commit.
pub struct Session<'a, S: Store + ?Sized> {
    store: &'a S,
    pending: Vec<Change>,
}

impl<'a, S: Store + ?Sized> Session<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            pending: Vec::new(),
        }
    }

    /// Queue an insert.
    pub fn add(&mut self, record: impl Into<Change>) {
        self.pending.push(record.into());
    }

    pub fn push(&mut self, change: Change) {
        self.pending.push(change);
    }

    pub fn pending(&self) -> &[Change] {
        &self.pending
    }

    /// Apply every queued change atomically. The queue is emptied whether or not the commit succeeds.
    pub async fn commit(&mut self) -> Result<Vec<Applied>, StoreError> {
        let changes = std::mem::take(&mut self.pending);
        if changes.is_empty() {
            return Ok(Vec::new());
        }
        let count = changes.len();
        match self.store.apply(changes).await {
            Ok(applied) => {
                tracing::debug!(changes = count, "session_committed");
                Ok(applied)
            }
            Err(err) => {
                tracing::debug!(changes = count, error = %err, "session_commit_failed");
                Err(err)
            }
        }
    }

    /// Discard queued changes.
    pub fn rollback(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(changes = self.pending.len(), "session_rolled_back");
        }
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::follows::Follows;
    use crate::domain::users::{NewUser, UserFilter};
    use crate::infrastructure::memory::MemoryStore;

    fn new_user(name: &str) -> NewUser {
        NewUser::new(name, format!("{name}@testing.com"), "digest", None)
    }

    #[tokio::test]
    async fn nothing_is_written_before_commit() {
        let store = MemoryStore::new();
        let mut session = Session::new(&store);
        session.add(new_user("testuser1"));
        assert_eq!(session.pending().len(), 1);
        let found = store
            .users()
            .first(&UserFilter::by_username("testuser1"))
            .await
            .unwrap();
        assert!(found.is_none());

        let applied = session.commit().await.unwrap();
        assert_eq!(applied.len(), 1);
        assert!(session.pending().is_empty());
        let found = store
            .users()
            .first(&UserFilter::by_username("testuser1"))
            .await
            .unwrap();
        assert_eq!(found.unwrap().username, "testuser1");
    }

    #[tokio::test]
    async fn rollback_discards_queued_changes() {
        let store = MemoryStore::new();
        let mut session = Session::new(&store);
        session.add(new_user("testuser1"));
        session.rollback();
        assert!(session.commit().await.unwrap().is_empty());
        assert_eq!(store.users().count(&UserFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_commit_leaves_store_untouched() {
        let store = MemoryStore::new();
        let mut session = Session::new(&store);
        session.add(new_user("testuser1"));
        // follows a user that does not exist
        session.add(Follows::new(1, 999));
        let err = session.commit().await.unwrap_err();
        assert!(err.is_integrity());
        assert!(session.pending().is_empty());
        assert_eq!(store.users().count(&UserFilter::default()).await.unwrap(), 0);
    }
}

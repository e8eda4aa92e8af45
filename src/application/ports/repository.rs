use async_trait::async_trait;

use crate::application::ports::store::StoreError;
use crate::domain::follows::{Follows, FollowsFilter};
use crate::domain::likes::{Like, LikeFilter};
use crate::domain::messages::{Message, MessageFilter, MessageId};
use crate::domain::users::{User, UserFilter, UserId};

/// A persisted record addressable by primary key and queried through an exact-match filter.
pub trait Entity: Clone + Send + Sync + 'static {
    type Key: Copy + Send + Sync + std::fmt::Debug;
    type Filter: Default + Clone + Send + Sync + std::fmt::Debug;

    const TABLE: &'static str;

    fn key(&self) -> Self::Key;
}

impl Entity for User {
    type Key = UserId;
    type Filter = UserFilter;
    const TABLE: &'static str = "users";

    fn key(&self) -> UserId {
        self.id
    }
}

impl Entity for Message {
    type Key = MessageId;
    type Filter = MessageFilter;
    const TABLE: &'static str = "messages";

    fn key(&self) -> MessageId {
        self.id
    }
}

impl Entity for Follows {
    /// (user_being_followed_id, user_following_id)
    type Key = (UserId, UserId);
    type Filter = FollowsFilter;
    const TABLE: &'static str = "follows";

    fn key(&self) -> (UserId, UserId) {
        (self.user_being_followed_id, self.user_following_id)
    }
}

impl Entity for Like {
    type Key = (UserId, MessageId);
    type Filter = LikeFilter;
    const TABLE: &'static str = "likes";

    fn key(&self) -> (UserId, MessageId) {
        (self.user_id, self.message_id)
    }
}

/// Read side of the store plus query-level bulk delete. Writes that must be
/// validated go through a [`Session`](crate::application::unit_of_work::Session).
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn get(&self, key: E::Key) -> Result<Option<E>, StoreError>;

    async fn find(&self, filter: &E::Filter) -> Result<Vec<E>, StoreError>;

    async fn first(&self, filter: &E::Filter) -> Result<Option<E>, StoreError> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    async fn count(&self, filter: &E::Filter) -> Result<u64, StoreError> {
        Ok(self.find(filter).await?.len() as u64)
    }

    /// Deletes every row matching `filter` immediately. An empty filter wipes the table;
    /// rows depending on deleted rows are removed with them.
    async fn delete_where(&self, filter: &E::Filter) -> Result<u64, StoreError>;
}

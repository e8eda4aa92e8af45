use crate::application::ports::store::Store;
use crate::application::unit_of_work::Session;
use crate::domain::follows::Follows;
use crate::domain::users::{User, UserId};

pub struct Follow<'a, S: Store + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: Store + ?Sized> Follow<'a, S> {
    /// Returns the followed user, or `None` when `followed` does not exist.
    /// Following twice or following oneself fails at commit with an integrity error.
    pub async fn execute(&self, follower: UserId, followed: UserId) -> anyhow::Result<Option<User>> {
        let Some(target) = self.store.users().get(followed).await? else {
            return Ok(None);
        };
        let mut session = Session::new(self.store);
        session.add(Follows::new(follower, followed));
        session.commit().await?;
        tracing::info!(user_id = follower, followed_id = followed, "user_followed");
        Ok(Some(target))
    }
}

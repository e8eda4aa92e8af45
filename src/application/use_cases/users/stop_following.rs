use crate::application::ports::store::{Change, Store};
use crate::application::unit_of_work::Session;
use crate::domain::follows::Follows;
use crate::domain::users::{User, UserId};

pub struct StopFollowing<'a, S: Store + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: Store + ?Sized> StopFollowing<'a, S> {
    /// Removes the follow edge if present. Returns `None` when `followed` does not exist.
    pub async fn execute(&self, follower: UserId, followed: UserId) -> anyhow::Result<Option<User>> {
        let Some(target) = self.store.users().get(followed).await? else {
            return Ok(None);
        };
        let mut session = Session::new(self.store);
        session.push(Change::DeleteFollows(Follows::new(follower, followed)));
        let removed: u64 = session.commit().await?.iter().map(|a| a.removed()).sum();
        tracing::info!(user_id = follower, followed_id = followed, removed, "user_unfollowed");
        Ok(Some(target))
    }
}

use crate::application::dto::users::UserConnectionsDto;
use crate::application::ports::store::Store;
use crate::domain::users::{UserFilter, UserId};

/// Users that `id` follows.
pub struct ListFollowing<'a, S: Store + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: Store + ?Sized> ListFollowing<'a, S> {
    pub async fn execute(&self, id: UserId) -> anyhow::Result<Option<UserConnectionsDto>> {
        let Some(user) = self.store.users().get(id).await? else {
            return Ok(None);
        };
        let users = self
            .store
            .users()
            .find(&UserFilter {
                followed_by: Some(id),
                ..Default::default()
            })
            .await?;
        Ok(Some(UserConnectionsDto { user, users }))
    }
}

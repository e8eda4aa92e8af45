use crate::application::dto::users::UserConnectionsDto;
use crate::application::ports::store::Store;
use crate::domain::users::{UserFilter, UserId};

/// Users following `id`.
pub struct ListFollowers<'a, S: Store + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: Store + ?Sized> ListFollowers<'a, S> {
    pub async fn execute(&self, id: UserId) -> anyhow::Result<Option<UserConnectionsDto>> {
        let Some(user) = self.store.users().get(id).await? else {
            return Ok(None);
        };
        let users = self
            .store
            .users()
            .find(&UserFilter {
                following: Some(id),
                ..Default::default()
            })
            .await?;
        Ok(Some(UserConnectionsDto { user, users }))
    }
}

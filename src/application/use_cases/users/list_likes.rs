use crate::application::dto::users::UserLikesDto;
use crate::application::ports::store::Store;
use crate::domain::messages::MessageFilter;
use crate::domain::users::UserId;

pub struct ListLikes<'a, S: Store + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: Store + ?Sized> ListLikes<'a, S> {
    pub async fn execute(&self, id: UserId) -> anyhow::Result<Option<UserLikesDto>> {
        let Some(user) = self.store.users().get(id).await? else {
            return Ok(None);
        };
        let messages = self
            .store
            .messages()
            .find(&MessageFilter {
                liked_by: Some(id),
                ..Default::default()
            })
            .await?;
        Ok(Some(UserLikesDto { user, messages }))
    }
}

use crate::application::dto::users::UserProfileDto;
use crate::application::ports::store::Store;
use crate::application::use_cases::users::relationships::is_following;
use crate::domain::follows::FollowsFilter;
use crate::domain::likes::LikeFilter;
use crate::domain::messages::MessageFilter;
use crate::domain::users::UserId;

pub struct GetUser<'a, S: Store + ?Sized> {
    pub store: &'a S,
    pub message_limit: usize,
}

impl<'a, S: Store + ?Sized> GetUser<'a, S> {
    pub async fn execute(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> anyhow::Result<Option<UserProfileDto>> {
        let Some(user) = self.store.users().get(id).await? else {
            return Ok(None);
        };
        let messages = self
            .store
            .messages()
            .find(&MessageFilter::by_user(id).with_limit(self.message_limit))
            .await?;
        let following_count = self
            .store
            .follows()
            .count(&FollowsFilter {
                user_following_id: Some(id),
                ..Default::default()
            })
            .await?;
        let followers_count = self
            .store
            .follows()
            .count(&FollowsFilter {
                user_being_followed_id: Some(id),
                ..Default::default()
            })
            .await?;
        let likes_count = self
            .store
            .likes()
            .count(&LikeFilter {
                user_id: Some(id),
                ..Default::default()
            })
            .await?;
        let viewer_is_following = match viewer {
            Some(viewer) if viewer != id => is_following(self.store, viewer, id).await?,
            _ => false,
        };
        Ok(Some(UserProfileDto {
            user,
            messages,
            following_count,
            followers_count,
            likes_count,
            viewer_is_following,
        }))
    }
}

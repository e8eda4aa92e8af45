use crate::application::dto::messages::MessageWithAuthorDto;
use crate::application::ports::store::Store;
use crate::application::use_cases::messages::with_authors;
use crate::domain::follows::FollowsFilter;
use crate::domain::messages::MessageFilter;
use crate::domain::users::UserId;

/// Latest messages from the user and everyone they follow, newest first.
pub struct HomeTimeline<'a, S: Store + ?Sized> {
    pub store: &'a S,
    pub limit: usize,
}

impl<'a, S: Store + ?Sized> HomeTimeline<'a, S> {
    pub async fn execute(&self, user_id: UserId) -> anyhow::Result<Vec<MessageWithAuthorDto>> {
        let mut authors: Vec<UserId> = self
            .store
            .follows()
            .find(&FollowsFilter {
                user_following_id: Some(user_id),
                ..Default::default()
            })
            .await?
            .into_iter()
            .map(|f| f.user_being_followed_id)
            .collect();
        authors.push(user_id);
        let messages = self
            .store
            .messages()
            .find(&MessageFilter {
                authored_by: Some(authors),
                limit: Some(self.limit),
                ..Default::default()
            })
            .await?;
        with_authors(self.store, messages).await
    }
}

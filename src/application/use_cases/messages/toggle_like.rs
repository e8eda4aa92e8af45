use crate::application::ports::store::{Change, Store};
use crate::application::unit_of_work::Session;
use crate::domain::likes::Like;
use crate::domain::messages::MessageId;
use crate::domain::users::UserId;

pub struct ToggleLike<'a, S: Store + ?Sized> {
    pub store: &'a S,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked,
    Unliked,
    NotFound,
    /// Users cannot like their own messages.
    OwnMessage,
}

impl<'a, S: Store + ?Sized> ToggleLike<'a, S> {
    pub async fn execute(&self, user_id: UserId, message_id: MessageId) -> anyhow::Result<LikeOutcome> {
        let Some(message) = self.store.messages().get(message_id).await? else {
            return Ok(LikeOutcome::NotFound);
        };
        if message.user_id == user_id {
            return Ok(LikeOutcome::OwnMessage);
        }
        let like = Like {
            user_id,
            message_id,
        };
        let already = self.store.likes().get((user_id, message_id)).await?.is_some();
        let mut session = Session::new(self.store);
        let outcome = if already {
            session.push(Change::DeleteLike(like));
            LikeOutcome::Unliked
        } else {
            session.add(like);
            LikeOutcome::Liked
        };
        session.commit().await?;
        tracing::debug!(user_id, message_id, ?outcome, "like_toggled");
        Ok(outcome)
    }
}

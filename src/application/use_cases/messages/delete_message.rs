use crate::application::ports::store::{Change, Store};
use crate::application::unit_of_work::Session;
use crate::domain::messages::MessageId;
use crate::domain::users::UserId;

pub struct DeleteMessage<'a, S: Store + ?Sized> {
    pub store: &'a S,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMessageOutcome {
    Deleted,
    NotFound,
    NotOwner,
}

impl<'a, S: Store + ?Sized> DeleteMessage<'a, S> {
    pub async fn execute(&self, actor: UserId, id: MessageId) -> anyhow::Result<DeleteMessageOutcome> {
        let Some(message) = self.store.messages().get(id).await? else {
            return Ok(DeleteMessageOutcome::NotFound);
        };
        if message.user_id != actor {
            tracing::warn!(user_id = actor, message_id = id, "delete_message_not_owner");
            return Ok(DeleteMessageOutcome::NotOwner);
        }
        let mut session = Session::new(self.store);
        session.push(Change::DeleteMessage(id));
        session.commit().await?;
        Ok(DeleteMessageOutcome::Deleted)
    }
}

use anyhow::Context;

use crate::application::ports::store::{Applied, Store};
use crate::application::unit_of_work::Session;
use crate::domain::messages::{Message, NewMessage};
use crate::domain::users::UserId;

pub struct CreateMessage<'a, S: Store + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: Store + ?Sized> CreateMessage<'a, S> {
    /// Text over the length limit fails at commit with a data error; an unknown
    /// author fails with an integrity error.
    pub async fn execute(&self, author: UserId, text: &str) -> anyhow::Result<Message> {
        let mut session = Session::new(self.store);
        session.add(NewMessage::new(author, text));
        let message = session
            .commit()
            .await?
            .into_iter()
            .find_map(Applied::into_message)
            .context("message commit returned no message")?;
        tracing::info!(user_id = author, message_id = message.id, "message_created");
        Ok(message)
    }
}

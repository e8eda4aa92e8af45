use crate::application::dto::messages::MessageWithAuthorDto;
use crate::application::ports::store::Store;
use crate::application::use_cases::messages::with_authors;
use crate::domain::messages::MessageId;

pub struct GetMessage<'a, S: Store + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: Store + ?Sized> GetMessage<'a, S> {
    pub async fn execute(&self, id: MessageId) -> anyhow::Result<Option<MessageWithAuthorDto>> {
        let Some(message) = self.store.messages().get(id).await? else {
            return Ok(None);
        };
        Ok(with_authors(self.store, vec![message]).await?.into_iter().next())
    }
}

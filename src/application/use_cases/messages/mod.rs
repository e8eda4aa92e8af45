pub mod create_message;
pub mod delete_message;
pub mod get_message;
pub mod home_timeline;
pub mod toggle_like;

use std::collections::HashMap;

use crate::application::dto::messages::MessageWithAuthorDto;
use crate::application::ports::store::Store;
use crate::domain::likes::LikeFilter;
use crate::domain::messages::Message;
use crate::domain::users::{User, UserId};

/// Pair each message with its author and like count. Messages whose author
/// vanished in between are dropped.
pub(crate) async fn with_authors<S: Store + ?Sized>(
    store: &S,
    messages: Vec<Message>,
) -> anyhow::Result<Vec<MessageWithAuthorDto>> {
    let mut authors: HashMap<UserId, User> = HashMap::new();
    let mut out = Vec::with_capacity(messages.len());
    for message in messages {
        if !authors.contains_key(&message.user_id) {
            match store.users().get(message.user_id).await? {
                Some(user) => {
                    authors.insert(user.id, user);
                }
                None => continue,
            }
        }
        let Some(author) = authors.get(&message.user_id).cloned() else {
            continue;
        };
        let likes = store
            .likes()
            .count(&LikeFilter {
                message_id: Some(message.id),
                ..Default::default()
            })
            .await?;
        out.push(MessageWithAuthorDto {
            message,
            author,
            likes,
        });
    }
    Ok(out)
}

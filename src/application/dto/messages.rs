use crate::domain::messages::Message;
use crate::domain::users::User;

#[derive(Debug, Clone)]
pub struct MessageWithAuthorDto {
    pub message: Message,
    pub author: User,
    pub likes: u64,
}

use super::messages::MessageId;
use super::users::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Like {
    pub user_id: UserId,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, Default)]
pub struct LikeFilter {
    pub user_id: Option<UserId>,
    pub message_id: Option<MessageId>,
}

impl LikeFilter {
    pub fn matches(&self, like: &Like) -> bool {
        self.user_id.is_none_or(|id| id == like.user_id)
            && self.message_id.is_none_or(|id| id == like.message_id)
    }
}

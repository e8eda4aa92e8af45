use chrono::{DateTime, Utc};

use super::users::UserId;

pub type MessageId = i32;

/// Upper bound on message text, counted in characters.
pub const MESSAGE_MAX_LEN: usize = 140;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: UserId,
}

/// A message waiting to be committed. The store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub text: String,
    pub user_id: UserId,
}

impl NewMessage {
    pub fn new(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user_id,
        }
    }

    pub fn exceeds_max_len(&self) -> bool {
        self.text.chars().count() > MESSAGE_MAX_LEN
    }
}

/// Exact-match filter over messages. Results are ordered newest first.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub user_id: Option<UserId>,
    /// Restrict to messages authored by any of these users.
    pub authored_by: Option<Vec<UserId>>,
    pub text: Option<String>,
    /// Messages liked by this user.
    pub liked_by: Option<UserId>,
    pub limit: Option<usize>,
}

impl MessageFilter {
    pub fn by_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_len_counts_characters_not_bytes() {
        let exact = NewMessage::new(1, "a".repeat(MESSAGE_MAX_LEN));
        assert!(!exact.exceeds_max_len());
        let over = NewMessage::new(1, "a".repeat(MESSAGE_MAX_LEN + 1));
        assert!(over.exceeds_max_len());
        let wide = NewMessage::new(1, "é".repeat(MESSAGE_MAX_LEN));
        assert!(!wide.exceeds_max_len());
    }
}

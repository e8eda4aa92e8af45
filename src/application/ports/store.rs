use async_trait::async_trait;

use crate::application::ports::repository::Repository;
use crate::domain::follows::Follows;
use crate::domain::likes::Like;
use crate::domain::messages::{MESSAGE_MAX_LEN, Message, MessageId, NewMessage};
use crate::domain::users::{NewUser, User, UserChanges, UserId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Uniqueness, foreign key or check constraint violated.
    #[error("integrity error: {0}")]
    Integrity(String),
    /// A value does not fit its column, e.g. message text over the length limit.
    #[error("data error: {0}")]
    Data(String),
    #[error("{table} row {key} does not exist")]
    Missing { table: &'static str, key: String },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn message_too_long() -> Self {
        StoreError::Data(format!(
            "value too long for type character varying({MESSAGE_MAX_LEN})"
        ))
    }

    pub fn is_integrity(&self) -> bool {
        matches!(self, StoreError::Integrity(_))
    }

    pub fn is_data(&self) -> bool {
        matches!(self, StoreError::Data(_))
    }
}

/// A write queued in a session and applied at commit.
#[derive(Debug, Clone)]
pub enum Change {
    InsertUser(NewUser),
    UpdateUser(UserId, UserChanges),
    DeleteUser(UserId),
    InsertMessage(NewMessage),
    DeleteMessage(MessageId),
    InsertFollows(Follows),
    DeleteFollows(Follows),
    InsertLike(Like),
    DeleteLike(Like),
}

impl From<NewUser> for Change {
    fn from(u: NewUser) -> Self {
        Change::InsertUser(u)
    }
}

impl From<NewMessage> for Change {
    fn from(m: NewMessage) -> Self {
        Change::InsertMessage(m)
    }
}

impl From<Follows> for Change {
    fn from(f: Follows) -> Self {
        Change::InsertFollows(f)
    }
}

impl From<Like> for Change {
    fn from(l: Like) -> Self {
        Change::InsertLike(l)
    }
}

/// Outcome of one applied [`Change`], in the order the changes were queued.
#[derive(Debug, Clone)]
pub enum Applied {
    User(User),
    Message(Message),
    Follows(Follows),
    Like(Like),
    /// Rows removed by a delete.
    Removed(u64),
}

impl Applied {
    pub fn into_user(self) -> Option<User> {
        match self {
            Applied::User(u) => Some(u),
            _ => None,
        }
    }

    pub fn into_message(self) -> Option<Message> {
        match self {
            Applied::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn removed(&self) -> u64 {
        match self {
            Applied::Removed(n) => *n,
            _ => 0,
        }
    }
}

/// The relational store. `apply` is all-or-nothing: either every change lands or none does.
#[async_trait]
pub trait Store: Send + Sync {
    fn users(&self) -> &dyn Repository<User>;
    fn messages(&self) -> &dyn Repository<Message>;
    fn follows(&self) -> &dyn Repository<Follows>;
    fn likes(&self) -> &dyn Repository<Like>;

    async fn apply(&self, changes: Vec<Change>) -> Result<Vec<Applied>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

use crate::domain::messages::Message;
use crate::domain::users::User;

#[derive(Debug, Clone)]
pub struct UserProfileDto {
    pub user: User,
    /// Newest first.
    pub messages: Vec<Message>,
    pub following_count: u64,
    pub followers_count: u64,
    pub likes_count: u64,
    /// Whether the requesting user follows this user; false when anonymous.
    pub viewer_is_following: bool,
}

/// A user together with the users on one side of their follow relation.
#[derive(Debug, Clone)]
pub struct UserConnectionsDto {
    pub user: User,
    pub users: Vec<User>,
}

#[derive(Debug, Clone)]
pub struct UserLikesDto {
    pub user: User,
    pub messages: Vec<Message>,
}

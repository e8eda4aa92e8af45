pub mod follows;
pub mod likes;
pub mod messages;
pub mod users;

pub mod delete_user;
pub mod follow;
pub mod get_user;
pub mod list_followers;
pub mod list_following;
pub mod list_likes;
pub mod list_users;
pub mod relationships;
pub mod stop_following;
pub mod update_profile;

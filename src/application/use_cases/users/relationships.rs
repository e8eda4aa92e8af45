use crate::application::ports::store::{Store, StoreError};
use crate::domain::users::UserId;

/// Does `follower` follow `followed`?
pub async fn is_following<S: Store + ?Sized>(
    store: &S,
    follower: UserId,
    followed: UserId,
) -> Result<bool, StoreError> {
    Ok(store.follows().get((followed, follower)).await?.is_some())
}

/// Is `user` followed by `other`?
pub async fn is_followed_by<S: Store + ?Sized>(
    store: &S,
    user: UserId,
    other: UserId,
) -> Result<bool, StoreError> {
    is_following(store, other, user).await
}

use async_trait::async_trait;

use super::follows_repository_sqlx::{self, SqlxFollowsRepository};
use super::like_repository_sqlx::{self, SqlxLikeRepository};
use super::message_repository_sqlx::{self, SqlxMessageRepository};
use super::user_repository_sqlx::{self, SqlxUserRepository};
use crate::application::ports::repository::Repository;
use crate::application::ports::store::{Applied, Change, Store, StoreError};
use crate::domain::follows::Follows;
use crate::domain::likes::Like;
use crate::domain::messages::Message;
use crate::domain::users::User;
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::errors::map_sqlx_error;

/// PostgreSQL store. Each commit runs in one transaction; any failing statement rolls it back.
pub struct SqlxStore {
    pool: PgPool,
    users: SqlxUserRepository,
    messages: SqlxMessageRepository,
    follows: SqlxFollowsRepository,
    likes: SqlxLikeRepository,
}

impl SqlxStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: SqlxUserRepository::new(pool.clone()),
            messages: SqlxMessageRepository::new(pool.clone()),
            follows: SqlxFollowsRepository::new(pool.clone()),
            likes: SqlxLikeRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl Store for SqlxStore {
    fn users(&self) -> &dyn Repository<User> {
        &self.users
    }

    fn messages(&self) -> &dyn Repository<Message> {
        &self.messages
    }

    fn follows(&self) -> &dyn Repository<Follows> {
        &self.follows
    }

    fn likes(&self) -> &dyn Repository<Like> {
        &self.likes
    }

    async fn apply(&self, changes: Vec<Change>) -> Result<Vec<Applied>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        let mut applied = Vec::with_capacity(changes.len());
        for change in &changes {
            let out = match change {
                Change::InsertUser(new) => {
                    Applied::User(user_repository_sqlx::insert(&mut *tx, new).await?)
                }
                Change::UpdateUser(id, patch) => {
                    Applied::User(user_repository_sqlx::update(&mut *tx, *id, patch).await?)
                }
                Change::DeleteUser(id) => {
                    Applied::Removed(user_repository_sqlx::delete(&mut *tx, *id).await?)
                }
                Change::InsertMessage(new) => {
                    Applied::Message(message_repository_sqlx::insert(&mut *tx, new).await?)
                }
                Change::DeleteMessage(id) => {
                    Applied::Removed(message_repository_sqlx::delete(&mut *tx, *id).await?)
                }
                Change::InsertFollows(f) => {
                    Applied::Follows(follows_repository_sqlx::insert(&mut *tx, f).await?)
                }
                Change::DeleteFollows(f) => {
                    Applied::Removed(follows_repository_sqlx::delete(&mut *tx, f).await?)
                }
                Change::InsertLike(l) => {
                    Applied::Like(like_repository_sqlx::insert(&mut *tx, l).await?)
                }
                Change::DeleteLike(l) => {
                    Applied::Removed(like_repository_sqlx::delete(&mut *tx, l).await?)
                }
            };
            applied.push(out);
        }
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(applied)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

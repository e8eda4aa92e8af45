use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Postgres, QueryBuilder, Row};

use crate::application::ports::repository::Repository;
use crate::application::ports::store::StoreError;
use crate::domain::likes::{Like, LikeFilter};
use crate::domain::messages::MessageId;
use crate::domain::users::UserId;
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::errors::map_sqlx_error;

pub struct SqlxLikeRepository {
    pub pool: PgPool,
}

impl SqlxLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn like_from_row(r: &PgRow) -> Like {
    Like {
        user_id: r.get("user_id"),
        message_id: r.get("message_id"),
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &LikeFilter) {
    if let Some(id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(id);
    }
    if let Some(id) = filter.message_id {
        qb.push(" AND message_id = ").push_bind(id);
    }
}

pub(crate) async fn insert(conn: &mut PgConnection, like: &Like) -> Result<Like, StoreError> {
    sqlx::query("INSERT INTO likes (user_id, message_id) VALUES ($1, $2)")
        .bind(like.user_id)
        .bind(like.message_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(*like)
}

pub(crate) async fn delete(conn: &mut PgConnection, like: &Like) -> Result<u64, StoreError> {
    let res = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND message_id = $2")
        .bind(like.user_id)
        .bind(like.message_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(res.rows_affected())
}

#[async_trait]
impl Repository<Like> for SqlxLikeRepository {
    async fn get(&self, key: (UserId, MessageId)) -> Result<Option<Like>, StoreError> {
        let row =
            sqlx::query("SELECT user_id, message_id FROM likes WHERE user_id = $1 AND message_id = $2")
                .bind(key.0)
                .bind(key.1)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.map(|r| like_from_row(&r)))
    }

    async fn find(&self, filter: &LikeFilter) -> Result<Vec<Like>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT user_id, message_id FROM likes WHERE TRUE");
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY user_id, message_id");
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.iter().map(like_from_row).collect())
    }

    async fn delete_where(&self, filter: &LikeFilter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM likes WHERE TRUE");
        push_filter(&mut qb, filter);
        let res = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(res.rows_affected())
    }
}

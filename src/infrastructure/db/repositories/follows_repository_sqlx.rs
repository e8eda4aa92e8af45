use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Postgres, QueryBuilder, Row};

use crate::application::ports::repository::Repository;
use crate::application::ports::store::StoreError;
use crate::domain::follows::{Follows, FollowsFilter};
use crate::domain::users::UserId;
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::errors::map_sqlx_error;

pub struct SqlxFollowsRepository {
    pub pool: PgPool,
}

impl SqlxFollowsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn follows_from_row(r: &PgRow) -> Follows {
    Follows {
        user_being_followed_id: r.get("user_being_followed_id"),
        user_following_id: r.get("user_following_id"),
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &FollowsFilter) {
    if let Some(id) = filter.user_being_followed_id {
        qb.push(" AND user_being_followed_id = ").push_bind(id);
    }
    if let Some(id) = filter.user_following_id {
        qb.push(" AND user_following_id = ").push_bind(id);
    }
}

pub(crate) async fn insert(conn: &mut PgConnection, f: &Follows) -> Result<Follows, StoreError> {
    sqlx::query(
        r#"INSERT INTO follows (user_being_followed_id, user_following_id) VALUES ($1, $2)"#,
    )
    .bind(f.user_being_followed_id)
    .bind(f.user_following_id)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;
    Ok(*f)
}

pub(crate) async fn delete(conn: &mut PgConnection, f: &Follows) -> Result<u64, StoreError> {
    let res = sqlx::query(
        r#"DELETE FROM follows WHERE user_being_followed_id = $1 AND user_following_id = $2"#,
    )
    .bind(f.user_being_followed_id)
    .bind(f.user_following_id)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;
    Ok(res.rows_affected())
}

#[async_trait]
impl Repository<Follows> for SqlxFollowsRepository {
    async fn get(&self, key: (UserId, UserId)) -> Result<Option<Follows>, StoreError> {
        let row = sqlx::query(
            r#"SELECT user_being_followed_id, user_following_id FROM follows
               WHERE user_being_followed_id = $1 AND user_following_id = $2"#,
        )
        .bind(key.0)
        .bind(key.1)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(|r| follows_from_row(&r)))
    }

    async fn find(&self, filter: &FollowsFilter) -> Result<Vec<Follows>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT user_being_followed_id, user_following_id FROM follows WHERE TRUE",
        );
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY user_being_followed_id, user_following_id");
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.iter().map(follows_from_row).collect())
    }

    async fn delete_where(&self, filter: &FollowsFilter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM follows WHERE TRUE");
        push_filter(&mut qb, filter);
        let res = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(res.rows_affected())
    }
}

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Postgres, QueryBuilder, Row};

use super::contains_pattern;
use crate::application::ports::repository::{Entity, Repository};
use crate::application::ports::store::StoreError;
use crate::domain::users::{NewUser, User, UserChanges, UserFilter, UserId};
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::errors::map_sqlx_error;

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        username: r.get("username"),
        email: r.get("email"),
        password_hash: r.get("password_hash"),
        image_url: r.get("image_url"),
        header_image_url: r.get("header_image_url"),
        bio: r.get("bio"),
        location: r.get("location"),
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    if let Some(username) = &filter.username {
        qb.push(" AND u.username = ").push_bind(username.clone());
    }
    if let Some(email) = &filter.email {
        qb.push(" AND u.email = ").push_bind(email.clone());
    }
    if let Some(needle) = &filter.username_contains {
        qb.push(" AND u.username ILIKE ")
            .push_bind(contains_pattern(needle));
    }
    if let Some(follower) = filter.followed_by {
        qb.push(" AND u.id IN (SELECT user_being_followed_id FROM follows WHERE user_following_id = ")
            .push_bind(follower)
            .push(")");
    }
    if let Some(followed) = filter.following {
        qb.push(" AND u.id IN (SELECT user_following_id FROM follows WHERE user_being_followed_id = ")
            .push_bind(followed)
            .push(")");
    }
}

pub(crate) async fn insert(conn: &mut PgConnection, new: &NewUser) -> Result<User, StoreError> {
    let row = sqlx::query(
        r#"INSERT INTO users (username, email, password_hash, image_url, header_image_url, bio, location)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING id, username, email, password_hash, image_url, header_image_url, bio, location"#,
    )
    .bind(&new.username)
    .bind(&new.email)
    .bind(&new.password_hash)
    .bind(&new.image_url)
    .bind(&new.header_image_url)
    .bind(&new.bio)
    .bind(&new.location)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;
    Ok(user_from_row(&row))
}

pub(crate) async fn update(
    conn: &mut PgConnection,
    id: UserId,
    changes: &UserChanges,
) -> Result<User, StoreError> {
    let row = sqlx::query(
        r#"UPDATE users SET
               username = COALESCE($2, username),
               email = COALESCE($3, email),
               image_url = COALESCE($4, image_url),
               header_image_url = COALESCE($5, header_image_url),
               bio = CASE WHEN $6 THEN $7 ELSE bio END,
               location = CASE WHEN $8 THEN $9 ELSE location END
           WHERE id = $1
           RETURNING id, username, email, password_hash, image_url, header_image_url, bio, location"#,
    )
    .bind(id)
    .bind(&changes.username)
    .bind(&changes.email)
    .bind(&changes.image_url)
    .bind(&changes.header_image_url)
    .bind(changes.bio.is_some())
    .bind(changes.bio.clone().flatten())
    .bind(changes.location.is_some())
    .bind(changes.location.clone().flatten())
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;
    row.map(|r| user_from_row(&r)).ok_or_else(|| StoreError::Missing {
        table: User::TABLE,
        key: id.to_string(),
    })
}

/// Messages, follows and likes go with the user via `ON DELETE CASCADE`.
pub(crate) async fn delete(conn: &mut PgConnection, id: UserId) -> Result<u64, StoreError> {
    let res = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(res.rows_affected())
}

#[async_trait]
impl Repository<User> for SqlxUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id, username, email, password_hash, image_url, header_image_url, bio, location
               FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(|r| user_from_row(&r)))
    }

    async fn find(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT u.id, u.username, u.email, u.password_hash, u.image_url, u.header_image_url, u.bio, u.location FROM users u WHERE TRUE",
        );
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY u.id");
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u WHERE TRUE");
        push_filter(&mut qb, filter);
        let n: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(n.max(0) as u64)
    }

    async fn delete_where(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM users u WHERE TRUE");
        push_filter(&mut qb, filter);
        let res = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(res.rows_affected())
    }
}

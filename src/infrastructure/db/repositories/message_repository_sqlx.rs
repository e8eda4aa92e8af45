use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Postgres, QueryBuilder, Row};

use crate::application::ports::repository::Repository;
use crate::application::ports::store::StoreError;
use crate::domain::messages::{Message, MessageFilter, MessageId, NewMessage};
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::errors::map_sqlx_error;

pub struct SqlxMessageRepository {
    pub pool: PgPool,
}

impl SqlxMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn message_from_row(r: &PgRow) -> Message {
    Message {
        id: r.get("id"),
        text: r.get("text"),
        timestamp: r.get("timestamp"),
        user_id: r.get("user_id"),
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &MessageFilter) {
    if let Some(user_id) = filter.user_id {
        qb.push(" AND m.user_id = ").push_bind(user_id);
    }
    if let Some(ids) = &filter.authored_by {
        qb.push(" AND m.user_id = ANY(").push_bind(ids.clone()).push(")");
    }
    if let Some(text) = &filter.text {
        qb.push(" AND m.text = ").push_bind(text.clone());
    }
    if let Some(user_id) = filter.liked_by {
        qb.push(" AND m.id IN (SELECT message_id FROM likes WHERE user_id = ")
            .push_bind(user_id)
            .push(")");
    }
}

fn push_order_and_limit(qb: &mut QueryBuilder<'_, Postgres>, filter: &MessageFilter) {
    qb.push(" ORDER BY m.timestamp DESC, m.id DESC");
    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(limit as i64);
    }
}

/// `VARCHAR(140)` silently truncates trailing spaces past the limit, so length is checked here.
pub(crate) async fn insert(conn: &mut PgConnection, new: &NewMessage) -> Result<Message, StoreError> {
    if new.exceeds_max_len() {
        return Err(StoreError::message_too_long());
    }
    let row = sqlx::query(
        r#"INSERT INTO messages (text, user_id) VALUES ($1, $2)
           RETURNING id, text, timestamp, user_id"#,
    )
    .bind(&new.text)
    .bind(new.user_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;
    Ok(message_from_row(&row))
}

pub(crate) async fn delete(conn: &mut PgConnection, id: MessageId) -> Result<u64, StoreError> {
    let res = sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(res.rows_affected())
}

#[async_trait]
impl Repository<Message> for SqlxMessageRepository {
    async fn get(&self, id: MessageId) -> Result<Option<Message>, StoreError> {
        let row = sqlx::query(r#"SELECT id, text, timestamp, user_id FROM messages WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(|r| message_from_row(&r)))
    }

    async fn find(&self, filter: &MessageFilter) -> Result<Vec<Message>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT m.id, m.text, m.timestamp, m.user_id FROM messages m WHERE TRUE",
        );
        push_filter(&mut qb, filter);
        push_order_and_limit(&mut qb, filter);
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.iter().map(message_from_row).collect())
    }

    async fn count(&self, filter: &MessageFilter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM (SELECT m.id FROM messages m WHERE TRUE",
        );
        push_filter(&mut qb, filter);
        push_order_and_limit(&mut qb, filter);
        qb.push(") AS matched");
        let n = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(n.max(0) as u64)
    }

    async fn delete_where(&self, filter: &MessageFilter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "DELETE FROM messages WHERE id IN (SELECT m.id FROM messages m WHERE TRUE",
        );
        push_filter(&mut qb, filter);
        push_order_and_limit(&mut qb, filter);
        qb.push(")");
        let res = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(res.rows_affected())
    }
}

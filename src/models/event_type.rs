//! Event-type classification; read-only directory lookup with an active flag.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EventType {
    pub event_type_id: i64,
    pub name: String,
    pub is_active: bool,
}

impl EventType {
    pub async fn find_by_id(
        pool: &PgPool,
        event_type_id: i64,
    ) -> Result<Option<EventType>, sqlx::Error> {
        sqlx::query_as::<_, EventType>(
            "SELECT event_type_id, name, is_active FROM event_types WHERE event_type_id = $1",
        )
        .bind(event_type_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        event_type_id: i64,
    ) -> Result<Option<EventType>, sqlx::Error> {
        sqlx::query_as::<_, EventType>(
            "SELECT event_type_id, name, is_active FROM event_types WHERE event_type_id = $1",
        )
        .bind(event_type_id)
        .fetch_optional(&mut **tx)
        .await
    }
}

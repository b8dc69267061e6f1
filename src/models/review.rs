//! Review records against an event; deletion-guard dependents only.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub review_id: i64,
    pub event_id: i64,
    pub account_id: Option<i64>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Review {
    pub async fn delete_for_event_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}

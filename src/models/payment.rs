//! Payment records against an event. The engine never creates payments; they
//! exist here for the deletion guard and the forced cascade.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub payment_id: i64,
    pub event_id: i64,
    pub amount: Decimal,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl Payment {
    pub async fn delete_for_event_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payments WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}

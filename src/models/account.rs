//! Account directory lookup. Only existence and role matter to the engine;
//! account CRUD and authentication live elsewhere.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub account_id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Account {
    pub async fn find_by_id(
        pool: &PgPool,
        account_id: i64,
    ) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            "SELECT account_id, name, email, role FROM accounts WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        account_id: i64,
    ) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            "SELECT account_id, name, email, role FROM accounts WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&mut **tx)
        .await
    }
}

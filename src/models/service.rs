//! # Service and Variation Models
//!
//! A service is a catalogue entry (catering, AV equipment, ...); a variation
//! is one of its priced options. Both are read-only directory lookups here:
//! the coordinator resolves them to check activeness and obtain base prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Service {
    pub service_id: i64,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Variation {
    pub variation_id: i64,
    pub service_id: i64,
    pub name: String,
    pub base_price: Decimal,
    pub is_active: bool,
}

impl Service {
    pub async fn find_by_id(
        pool: &PgPool,
        service_id: i64,
    ) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            "SELECT service_id, name, is_active FROM services WHERE service_id = $1",
        )
        .bind(service_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        service_id: i64,
    ) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>(
            "SELECT service_id, name, is_active FROM services WHERE service_id = $1",
        )
        .bind(service_id)
        .fetch_optional(&mut **tx)
        .await
    }
}

impl Variation {
    pub async fn find_by_id(
        pool: &PgPool,
        variation_id: i64,
    ) -> Result<Option<Variation>, sqlx::Error> {
        sqlx::query_as::<_, Variation>(
            "SELECT variation_id, service_id, name, base_price, is_active \
             FROM service_variations WHERE variation_id = $1",
        )
        .bind(variation_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        variation_id: i64,
    ) -> Result<Option<Variation>, sqlx::Error> {
        sqlx::query_as::<_, Variation>(
            "SELECT variation_id, service_id, name, base_price, is_active \
             FROM service_variations WHERE variation_id = $1",
        )
        .bind(variation_id)
        .fetch_optional(&mut **tx)
        .await
    }
}

//! # Room Model
//!
//! Bookable venue resource. Read-only from the engine's perspective; its own
//! CRUD lives with the excluded routing layer. A room participates in a
//! booking only when active and in AVAILABLE status.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::pricing::RoomPricing;

const ROOM_COLUMNS: &str =
    "room_id, name, base_price, hourly_rate, is_active, availability_status, created_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub room_id: i64,
    pub name: String,
    pub base_price: Decimal,
    pub hourly_rate: Decimal,
    pub is_active: bool,
    pub availability_status: String,
    pub created_at: NaiveDateTime,
}

impl Room {
    pub async fn find_by_id(pool: &PgPool, room_id: i64) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE room_id = $1"
        ))
        .bind(room_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        room_id: i64,
    ) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE room_id = $1"
        ))
        .bind(room_id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub fn pricing(&self) -> RoomPricing {
        RoomPricing {
            base_price: self.base_price,
            hourly_rate: self.hourly_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pricing_projection() {
        let room = Room {
            room_id: 1,
            name: "Main Hall".to_string(),
            base_price: dec!(100),
            hourly_rate: dec!(20),
            is_active: true,
            availability_status: "AVAILABLE".to_string(),
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        };
        let pricing = room.pricing();
        assert_eq!(pricing.base_price, dec!(100));
        assert_eq!(pricing.hourly_rate, dec!(20));
    }
}

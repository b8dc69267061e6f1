//! # Invoice and InvoiceDetail Models
//!
//! Exactly one invoice per event with a non-zero estimated cost. The invoice
//! is synthesized from the event's current room/service-line composition, and
//! its detail lines are deleted and fully regenerated whenever the computed
//! cost changes; the total amount always equals the sum of detail subtotals
//! at the moment either is written.

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::constants::system;

const INVOICE_COLUMNS: &str = "invoice_id, invoice_number, total_amount, event_id, account_id, \
     status, issue_date, due_date, created_at";

const DETAIL_COLUMNS: &str = "invoice_detail_id, invoice_id, item_name, quantity, unit_price, \
     subtotal, item_type, service_id, variation_id";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: i64,
    pub invoice_number: String,
    pub total_amount: Decimal,
    pub event_id: i64,
    pub account_id: Option<i64>,
    pub status: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    pub total_amount: Decimal,
    pub event_id: i64,
    pub account_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InvoiceDetail {
    pub invoice_detail_id: i64,
    pub invoice_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub item_type: String,
    pub service_id: Option<i64>,
    pub variation_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoiceDetail {
    pub invoice_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub item_type: String,
    pub service_id: Option<i64>,
    pub variation_id: Option<i64>,
}

impl Invoice {
    /// Invoice number derived from the creation instant plus the event id,
    /// e.g. `INV-20260901143000-17`.
    pub fn derive_number(event_id: i64, at: NaiveDateTime) -> String {
        format!("INV-{}-{}", at.format("%Y%m%d%H%M%S"), event_id)
    }

    /// Create an invoice dated now, due after the standard grace period.
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        new_invoice: NewInvoice,
    ) -> Result<Invoice, sqlx::Error> {
        let now = Utc::now().naive_utc();
        let issue_date = now.date();
        let due_date = issue_date + Duration::days(system::INVOICE_DUE_DAYS);
        let invoice_number = Self::derive_number(new_invoice.event_id, now);

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (
                invoice_number, total_amount, event_id, account_id, status,
                issue_date, due_date, created_at
            )
            VALUES ($1, $2, $3, $4, 'PENDING', $5, $6, NOW())
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(&invoice_number)
        .bind(new_invoice.total_amount)
        .bind(new_invoice.event_id)
        .bind(new_invoice.account_id)
        .bind(issue_date)
        .bind(due_date)
        .fetch_one(&mut **tx)
        .await?;

        Ok(invoice)
    }

    pub async fn find_by_event_id(
        pool: &PgPool,
        event_id: i64,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE event_id = $1"
        ))
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_event_id_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE event_id = $1"
        ))
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn update_total_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        invoice_id: i64,
        total_amount: Decimal,
    ) -> Result<Invoice, sqlx::Error> {
        sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices SET total_amount = $2
            WHERE invoice_id = $1
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(invoice_id)
        .bind(total_amount)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn delete_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        invoice_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invoices WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl InvoiceDetail {
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        new_detail: NewInvoiceDetail,
    ) -> Result<InvoiceDetail, sqlx::Error> {
        let detail = sqlx::query_as::<_, InvoiceDetail>(&format!(
            r#"
            INSERT INTO invoice_details (
                invoice_id, item_name, quantity, unit_price, subtotal,
                item_type, service_id, variation_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {DETAIL_COLUMNS}
            "#
        ))
        .bind(new_detail.invoice_id)
        .bind(&new_detail.item_name)
        .bind(new_detail.quantity)
        .bind(new_detail.unit_price)
        .bind(new_detail.subtotal)
        .bind(&new_detail.item_type)
        .bind(new_detail.service_id)
        .bind(new_detail.variation_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(detail)
    }

    pub async fn list_for_invoice(
        pool: &PgPool,
        invoice_id: i64,
    ) -> Result<Vec<InvoiceDetail>, sqlx::Error> {
        sqlx::query_as::<_, InvoiceDetail>(&format!(
            "SELECT {DETAIL_COLUMNS} FROM invoice_details \
             WHERE invoice_id = $1 ORDER BY invoice_detail_id"
        ))
        .bind(invoice_id)
        .fetch_all(pool)
        .await
    }

    /// Delete all detail lines for an invoice; first half of a regeneration.
    pub async fn delete_for_invoice_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        invoice_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invoice_details WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

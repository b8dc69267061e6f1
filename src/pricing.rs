//! Cost aggregation.
//!
//! Computes an event's total estimated cost from room pricing and the attached
//! service lines, and derives invoice detail items from the exact same rule so
//! an invoice's total always equals the sum of its detail subtotals.
//!
//! The total is always recomputed from scratch from the current composition,
//! never patched incrementally, so stored cost cannot drift from the actual
//! room/line set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Room pricing inputs: a flat base price plus an hourly rate applied when the
/// booking duration is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomPricing {
    pub base_price: Decimal,
    pub hourly_rate: Decimal,
}

/// A service line resolved to a concrete unit price (custom override if
/// present, otherwise the variation's base price).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub item_name: String,
    pub service_id: i64,
    pub variation_id: Option<i64>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl PricedLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Kind of priced component an invoice detail line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Room,
    Service,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Room => "ROOM",
            Self::Service => "SERVICE",
        }
    }
}

/// One invoice detail line derived from the event composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceItem {
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub item_type: ItemType,
    pub service_id: Option<i64>,
    pub variation_id: Option<i64>,
}

/// Resolve the unit price for a service line: the custom override wins,
/// otherwise the variation's base price applies.
pub fn line_unit_price(custom_price: Option<Decimal>, variation_base_price: Decimal) -> Decimal {
    custom_price.unwrap_or(variation_base_price)
}

/// The room's charge for a booking of the given duration.
fn room_charge(room: &RoomPricing, duration_hours: Option<Decimal>) -> Decimal {
    let mut charge = room.base_price;
    if let Some(duration) = duration_hours {
        charge += room.hourly_rate * duration;
    }
    charge
}

/// Compute the event's total estimated cost.
///
/// Starts from the caller-supplied base override (zero when absent), adds the
/// room charge when a room is attached, then each line's quantity x unit price.
pub fn compute_total_cost(
    base_override: Decimal,
    room: Option<&RoomPricing>,
    duration_hours: Option<Decimal>,
    lines: &[PricedLine],
) -> Decimal {
    let mut total = base_override;

    if let Some(room) = room {
        total += room_charge(room, duration_hours);
    }

    for line in lines {
        total += line.subtotal();
    }

    total
}

/// Derive invoice detail lines from the same composition used by
/// [`compute_total_cost`], so the detail subtotals always sum to the total.
///
/// A non-zero base override becomes its own "Base charge" line; without it the
/// invoice total could not match the sum of its details.
pub fn build_invoice_items(
    base_override: Decimal,
    room: Option<(&str, RoomPricing)>,
    duration_hours: Option<Decimal>,
    lines: &[PricedLine],
) -> Vec<InvoiceItem> {
    let mut items = Vec::with_capacity(lines.len() + 2);

    if base_override > Decimal::ZERO {
        items.push(InvoiceItem {
            item_name: "Base charge".to_string(),
            quantity: 1,
            unit_price: base_override,
            subtotal: base_override,
            item_type: ItemType::Service,
            service_id: None,
            variation_id: None,
        });
    }

    if let Some((room_name, pricing)) = room {
        let charge = room_charge(&pricing, duration_hours);
        items.push(InvoiceItem {
            item_name: room_name.to_string(),
            quantity: 1,
            unit_price: charge,
            subtotal: charge,
            item_type: ItemType::Room,
            service_id: None,
            variation_id: None,
        });
    }

    for line in lines {
        items.push(InvoiceItem {
            item_name: line.item_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            subtotal: line.subtotal(),
            item_type: ItemType::Service,
            service_id: Some(line.service_id),
            variation_id: line.variation_id,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn catering_line(quantity: i32, unit_price: Decimal) -> PricedLine {
        PricedLine {
            item_name: "Catering - Deluxe".to_string(),
            service_id: 1,
            variation_id: Some(2),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_room_plus_hourly_plus_line() {
        // base_price=100, hourly_rate=20, duration=2h, one line 2 x 50
        let room = RoomPricing {
            base_price: dec!(100),
            hourly_rate: dec!(20),
        };
        let lines = vec![catering_line(2, dec!(50))];

        let total = compute_total_cost(Decimal::ZERO, Some(&room), Some(dec!(2)), &lines);
        assert_eq!(total, dec!(240));
    }

    #[test]
    fn test_room_without_duration_charges_base_only() {
        let room = RoomPricing {
            base_price: dec!(100),
            hourly_rate: dec!(20),
        };
        let total = compute_total_cost(Decimal::ZERO, Some(&room), None, &[]);
        assert_eq!(total, dec!(100));
    }

    #[test]
    fn test_custom_price_overrides_variation_base() {
        assert_eq!(line_unit_price(Some(dec!(50)), dec!(80)), dec!(50));
        assert_eq!(line_unit_price(None, dec!(80)), dec!(80));
    }

    #[test]
    fn test_recomputation_is_pure() {
        let room = RoomPricing {
            base_price: dec!(75.50),
            hourly_rate: dec!(12.25),
        };
        let lines = vec![catering_line(3, dec!(19.99))];

        let first = compute_total_cost(dec!(10), Some(&room), Some(dec!(4)), &lines);
        let second = compute_total_cost(dec!(10), Some(&room), Some(dec!(4)), &lines);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invoice_items_sum_to_total() {
        let room = RoomPricing {
            base_price: dec!(100),
            hourly_rate: dec!(20),
        };
        let lines = vec![catering_line(2, dec!(50))];

        let total = compute_total_cost(dec!(15), Some(&room), Some(dec!(2)), &lines);
        let items = build_invoice_items(dec!(15), Some(("Main Hall", room)), Some(dec!(2)), &lines);

        let detail_sum: Decimal = items.iter().map(|i| i.subtotal).sum();
        assert_eq!(detail_sum, total);
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].item_type, ItemType::Room);
        assert_eq!(items[2].item_type, ItemType::Service);
    }

    #[test]
    fn test_zero_override_emits_no_base_line() {
        let items = build_invoice_items(Decimal::ZERO, None, None, &[]);
        assert!(items.is_empty());
    }

    #[test]
    fn test_subtotal_is_quantity_times_unit_price() {
        let line = catering_line(4, dec!(12.50));
        assert_eq!(line.subtotal(), dec!(50));
    }
}

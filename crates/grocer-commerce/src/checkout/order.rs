//! Order types.

use crate::cart::CartSummary;
use crate::catalog::Attributes;
use crate::checkout::CustomerDetails;
use crate::error::CommerceError;
use crate::ids::{LocationId, OrderId, OrderItemId, ProductId, VariantId};
use crate::money::{deserialize_amount, Currency, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, waiting for the shop to confirm.
    #[default]
    Pending,
    Confirmed,
    /// Being picked and packed.
    Processing,
    /// Out for delivery.
    Delivering,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Delivering,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Delivering => "Out for delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether items may still be added, changed or removed.
    pub fn is_editable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [PaymentStatus::Unpaid, PaymentStatus::Paid, PaymentStatus::Refunded]
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    /// Human-readable number assigned by the backend.
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub delivery_address: String,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(deserialize_with = "deserialize_amount")]
    pub subtotal: i64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub shipping_fee: i64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub total: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn total(&self, currency: Currency) -> Money {
        Money::new(self.total, currency)
    }

    /// Total units ordered.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn customer(&self) -> CustomerDetails {
        CustomerDetails {
            name: self.customer_name.clone(),
            phone: self.customer_phone.clone(),
            email: self.customer_email.clone(),
            address: self.delivery_address.clone(),
            location_id: self.location_id.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Fail unless the order still accepts item changes.
    pub fn ensure_editable(&self) -> Result<(), CommerceError> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(CommerceError::OrderNotEditable {
                order_number: self.order_number.clone(),
                status: self.status.to_string(),
            })
        }
    }

    /// Fail unless `item_id` can be removed: the order must be editable and
    /// keep at least one other item.
    pub fn ensure_item_removable(&self, item_id: &OrderItemId) -> Result<(), CommerceError> {
        self.ensure_editable()?;
        if !self.items.iter().any(|i| &i.id == item_id) {
            return Err(CommerceError::OrderItemNotFound {
                order_number: self.order_number.clone(),
                item_id: item_id.to_string(),
            });
        }
        if self.items.len() <= 1 {
            return Err(CommerceError::LastOrderItem(self.order_number.clone()));
        }
        Ok(())
    }
}

/// A line of a placed order, priced at order time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    pub product_name: String,
    #[serde(default)]
    pub variant_label: Option<String>,
    #[serde(default)]
    pub attributes: Option<Attributes>,
    pub quantity: i64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub unit_price: i64,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        self.unit_price.saturating_mul(self.quantity)
    }
}

/// A cart line resolved against its product, ready to be ordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_label: Option<String>,
    pub quantity: i64,
    pub unit_price: i64,
}

/// Body of the create-order call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub delivery_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<LocationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<OrderLine>,
    pub subtotal: i64,
    pub shipping_fee: i64,
    pub total: i64,
    pub currency: Currency,
}

impl CreateOrderRequest {
    /// Build a request after validating the customer and checking that
    /// something is being ordered.
    pub fn new(
        customer: &CustomerDetails,
        items: Vec<OrderLine>,
        summary: &CartSummary,
    ) -> Result<Self, CommerceError> {
        if items.is_empty() {
            return Err(CommerceError::EmptySelection);
        }
        customer.validate()?;
        let customer = customer.normalized();
        Ok(Self {
            customer_name: customer.name,
            customer_phone: customer.phone,
            customer_email: customer.email,
            delivery_address: customer.address,
            location_id: customer.location_id,
            notes: customer.notes,
            items,
            subtotal: summary.subtotal.amount,
            shipping_fee: summary.shipping.amount,
            total: summary.total.amount,
            currency: summary.total.currency,
        })
    }
}

/// Patch for an order's status fields; unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatusUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StatusUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none() && self.notes.is_none()
    }
}

/// Body for adding an item to an existing order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    pub quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(status: OrderStatus, items: usize) -> Order {
        Order {
            id: OrderId::new("o1"),
            order_number: "CMD-1042".to_string(),
            status,
            payment_status: PaymentStatus::Unpaid,
            customer_name: "Awa".to_string(),
            customer_phone: "0708091011".to_string(),
            customer_email: None,
            delivery_address: "Cocody".to_string(),
            location_id: None,
            notes: None,
            items: (0..items)
                .map(|i| OrderItem {
                    id: OrderItemId::new(format!("i{i}")),
                    product_id: ProductId::new("p1"),
                    variant_id: None,
                    product_name: "Rice".to_string(),
                    variant_label: None,
                    attributes: None,
                    quantity: 1,
                    unit_price: 12_500,
                })
                .collect(),
            subtotal: 12_500,
            shipping_fee: 4_000,
            total: 16_500,
            created_at: None,
        }
    }

    #[test]
    fn test_only_pending_and_confirmed_are_editable() {
        let editable: Vec<_> = OrderStatus::ALL
            .into_iter()
            .filter(OrderStatus::is_editable)
            .collect();
        assert_eq!(editable, vec![OrderStatus::Pending, OrderStatus::Confirmed]);
    }

    #[test]
    fn test_shipped_order_refuses_edits() {
        let err = order(OrderStatus::Delivering, 2).ensure_editable().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Order CMD-1042 cannot be modified while delivering"
        );
    }

    #[test]
    fn test_last_item_cannot_be_removed() {
        let single = order(OrderStatus::Pending, 1);
        assert_eq!(
            single.ensure_item_removable(&OrderItemId::new("i0")),
            Err(CommerceError::LastOrderItem("CMD-1042".to_string()))
        );
        let pair = order(OrderStatus::Confirmed, 2);
        assert!(pair.ensure_item_removable(&OrderItemId::new("i1")).is_ok());
    }

    #[test]
    fn test_unknown_item_is_reported_against_the_order() {
        let err = order(OrderStatus::Pending, 2)
            .ensure_item_removable(&OrderItemId::new("i9"))
            .unwrap_err();
        assert_eq!(
            err,
            CommerceError::OrderItemNotFound {
                order_number: "CMD-1042".to_string(),
                item_id: "i9".to_string(),
            }
        );
        assert_eq!(err.to_string(), "Order CMD-1042 has no item i9");
    }

    #[test]
    fn test_status_update_skips_unset() {
        let update = StatusUpdate {
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"payment_status":"paid"}"#
        );
        assert!(StatusUpdate::default().is_empty());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(OrderStatus::parse("Delivering"), Some(OrderStatus::Delivering));
        assert_eq!(PaymentStatus::parse("refunded"), Some(PaymentStatus::Refunded));
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn test_create_request_requires_items() {
        let customer = CustomerDetails::new("Awa", "0708091011", "Cocody");
        let summary = CartSummary::empty(Currency::XOF);
        assert_eq!(
            CreateOrderRequest::new(&customer, Vec::new(), &summary),
            Err(CommerceError::EmptySelection)
        );
    }
}

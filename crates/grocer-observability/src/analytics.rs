//! E-commerce analytics events.
//!
//! Events are fire-and-forget: a sink never reports failure back to the
//! caller.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Which funnel step an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    BeginCheckout,
    AddToCart,
    RemoveFromCart,
    Purchase,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::BeginCheckout => "begin_checkout",
            EventName::AddToCart => "add_to_cart",
            EventName::RemoveFromCart => "remove_from_cart",
            EventName::Purchase => "purchase",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product line carried by an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsItem {
    pub item_id: String,
    pub item_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_variant: Option<String>,
    /// Unit price in minor units.
    pub price: i64,
    pub quantity: i64,
}

impl AnalyticsItem {
    pub fn new(item_id: impl Into<String>, item_name: impl Into<String>, price: i64, quantity: i64) -> Self {
        Self {
            item_id: item_id.into(),
            item_name: item_name.into(),
            item_variant: None,
            price,
            quantity,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.item_variant = Some(variant.into());
        self
    }
}

/// An analytics event with its aggregate value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: EventName,
    /// ISO 4217 code.
    pub currency: String,
    /// Sum of `price * quantity` over the items, in minor units.
    pub value: i64,
    pub items: Vec<AnalyticsItem>,
    /// Order number, for purchases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl AnalyticsEvent {
    /// Build an event whose value is computed from its items.
    pub fn new(name: EventName, currency: impl Into<String>, items: Vec<AnalyticsItem>) -> Self {
        let value = items
            .iter()
            .map(|i| i.price.saturating_mul(i.quantity))
            .fold(0i64, i64::saturating_add);
        Self {
            name,
            currency: currency.into(),
            value,
            items,
            transaction_id: None,
        }
    }

    pub fn add_to_cart(currency: impl Into<String>, item: AnalyticsItem) -> Self {
        Self::new(EventName::AddToCart, currency, vec![item])
    }

    pub fn remove_from_cart(currency: impl Into<String>, item: AnalyticsItem) -> Self {
        Self::new(EventName::RemoveFromCart, currency, vec![item])
    }

    pub fn begin_checkout(currency: impl Into<String>, items: Vec<AnalyticsItem>) -> Self {
        Self::new(EventName::BeginCheckout, currency, items)
    }

    /// A purchase; `value` is the charged total, shipping included.
    pub fn purchase(
        currency: impl Into<String>,
        transaction_id: impl Into<String>,
        value: i64,
        items: Vec<AnalyticsItem>,
    ) -> Self {
        let mut event = Self::new(EventName::Purchase, currency, items);
        event.value = value;
        event.transaction_id = Some(transaction_id.into());
        event
    }
}

/// Receives analytics events.
pub trait AnalyticsSink: Send + Sync {
    fn track(&self, event: &AnalyticsEvent);
}

/// Emits each event as an `info` log under the `analytics` target.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    measurement_id: Option<String>,
}

impl TracingSink {
    pub fn new(measurement_id: Option<String>) -> Self {
        Self { measurement_id }
    }
}

impl AnalyticsSink for TracingSink {
    fn track(&self, event: &AnalyticsEvent) {
        let payload = serde_json::to_string(event).unwrap_or_default();
        info!(
            target: "analytics",
            event = %event.name,
            value = event.value,
            currency = %event.currency,
            items = event.items.len(),
            measurement_id = self.measurement_id.as_deref().unwrap_or(""),
            payload = %payload,
            "analytics event"
        );
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn track(&self, _event: &AnalyticsEvent) {}
}

/// Keeps events in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().clone()
    }

    /// Events of one kind, oldest first.
    pub fn named(&self, name: EventName) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AnalyticsSink for MemorySink {
    fn track(&self, event: &AnalyticsEvent) {
        self.events.lock().push(event.clone());
    }
}

/// The `[analytics]` section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub measurement_id: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

impl AnalyticsConfig {
    /// The sink this config asks for.
    pub fn sink(&self) -> Arc<dyn AnalyticsSink> {
        if self.enabled {
            Arc::new(TracingSink::new(self.measurement_id.clone()))
        } else {
            Arc::new(NoopSink)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_sum_of_lines() {
        let event = AnalyticsEvent::begin_checkout(
            "XOF",
            vec![
                AnalyticsItem::new("p1", "Riz", 12_500, 2),
                AnalyticsItem::new("p2", "Huile", 3_000, 1).with_variant("1L"),
            ],
        );
        assert_eq!(event.value, 28_000);
        assert_eq!(event.name.as_str(), "begin_checkout");
    }

    #[test]
    fn test_purchase_keeps_charged_total() {
        let event = AnalyticsEvent::purchase(
            "XOF",
            "CMD-0001",
            29_000,
            vec![AnalyticsItem::new("p1", "Riz", 12_500, 2)],
        );
        assert_eq!(event.value, 29_000);
        assert_eq!(event.transaction_id.as_deref(), Some("CMD-0001"));
    }

    #[test]
    fn test_memory_sink_filters_by_name() {
        let sink = MemorySink::new();
        sink.track(&AnalyticsEvent::add_to_cart("XOF", AnalyticsItem::new("p1", "Riz", 1, 1)));
        sink.track(&AnalyticsEvent::remove_from_cart("XOF", AnalyticsItem::new("p1", "Riz", 1, 1)));
        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.named(EventName::RemoveFromCart).len(), 1);
        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_wire_shape() {
        let event = AnalyticsEvent::add_to_cart("XOF", AnalyticsItem::new("p1", "Riz", 500, 3));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "add_to_cart");
        assert_eq!(json["value"], 1500);
        assert!(json.get("transaction_id").is_none());
        assert!(json["items"][0].get("item_variant").is_none());
    }
}

//! Delivery fee policy and delivery locations.

use crate::ids::LocationId;
use crate::money::{deserialize_amount, Money};
use serde::{Deserialize, Serialize};

/// Tiered delivery fee applied to the selected subtotal.
///
/// Amounts are whole units of the store currency. An empty selection ships
/// for free; below `reduced_from` the standard fee applies, below `free_from`
/// the reduced fee, and from `free_from` on delivery is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingPolicy {
    pub standard_fee: i64,
    pub reduced_fee: i64,
    pub reduced_from: i64,
    pub free_from: i64,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            standard_fee: 4_000,
            reduced_fee: 2_000,
            reduced_from: 30_000,
            free_from: 50_000,
        }
    }
}

impl ShippingPolicy {
    /// Fee for a subtotal, in the subtotal's currency.
    pub fn fee_for(&self, subtotal: Money) -> Money {
        let fee = match subtotal.amount {
            s if s <= 0 => 0,
            s if s < self.reduced_from => self.standard_fee,
            s if s < self.free_from => self.reduced_fee,
            _ => 0,
        };
        Money::new(fee, subtotal.currency)
    }

    /// How much more the customer must add for free delivery.
    pub fn remaining_for_free(&self, subtotal: Money) -> Option<Money> {
        if subtotal.amount >= self.free_from {
            None
        } else {
            Some(Money::new(self.free_from - subtotal.amount.max(0), subtotal.currency))
        }
    }
}

/// A delivery zone managed through the shipping endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingLocation {
    pub id: LocationId,
    pub name: String,
    /// Flat fee charged for this zone when set.
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub fee: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: i32,
}

fn default_true() -> bool {
    true
}

fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "deserialize_amount")] i64);

    Option::<Wrapped>::deserialize(deserializer).map(|w| w.map(|Wrapped(v)| v))
}

/// Payload for creating or patching a delivery location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn fee(amount: i64) -> i64 {
        ShippingPolicy::default()
            .fee_for(Money::new(amount, Currency::XOF))
            .amount
    }

    #[test]
    fn test_fee_tiers() {
        assert_eq!(fee(0), 0);
        assert_eq!(fee(1), 4_000);
        assert_eq!(fee(29_999), 4_000);
        assert_eq!(fee(30_000), 2_000);
        assert_eq!(fee(49_999), 2_000);
        assert_eq!(fee(50_000), 0);
        assert_eq!(fee(1_000_000), 0);
    }

    #[test]
    fn test_remaining_for_free() {
        let policy = ShippingPolicy::default();
        let left = policy.remaining_for_free(Money::new(42_000, Currency::XOF));
        assert_eq!(left.map(|m| m.amount), Some(8_000));
        assert_eq!(policy.remaining_for_free(Money::new(50_000, Currency::XOF)), None);
    }

    #[test]
    fn test_location_fee_accepts_float() {
        let loc: ShippingLocation =
            serde_json::from_str(r#"{"id":"l1","name":"Plateau","fee":1500.0}"#).unwrap();
        assert_eq!(loc.fee, Some(1500));
        let loc: ShippingLocation =
            serde_json::from_str(r#"{"id":"l2","name":"Cocody","fee":null}"#).unwrap();
        assert_eq!(loc.fee, None);
    }

    #[test]
    fn test_policy_partial_config() {
        let policy: ShippingPolicy = serde_json::from_str(r#"{"free_from": 40000}"#).unwrap();
        assert_eq!(policy.free_from, 40_000);
        assert_eq!(policy.standard_fee, 4_000);
    }
}

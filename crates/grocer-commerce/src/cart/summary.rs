//! Checkout summary derived from the selected cart lines.

use crate::cart::CartItem;
use crate::checkout::ShippingPolicy;
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Resolves the current unit price of a cart line.
///
/// Returns `None` when the line's product is not available (not fetched yet,
/// or the fetch failed); such lines are left out of the totals.
pub trait PriceLookup {
    fn unit_price(&self, item: &CartItem) -> Option<Money>;
}

impl<F> PriceLookup for F
where
    F: Fn(&CartItem) -> Option<Money>,
{
    fn unit_price(&self, item: &CartItem) -> Option<Money> {
        self(item)
    }
}

/// Totals for the lines taking part in checkout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartSummary {
    pub subtotal: Money,
    pub shipping: Money,
    /// No coupon engine exists; always zero.
    pub discount: Money,
    /// subtotal + shipping - discount.
    pub total: Money,
    /// Units across the priced, selected lines.
    pub item_count: i64,
}

impl CartSummary {
    /// All-zero summary.
    pub fn empty(currency: Currency) -> Self {
        Self {
            subtotal: Money::zero(currency),
            shipping: Money::zero(currency),
            discount: Money::zero(currency),
            total: Money::zero(currency),
            item_count: 0,
        }
    }

    /// Compute totals over `lines`.
    pub fn compute<'a>(
        lines: impl Iterator<Item = &'a CartItem>,
        prices: &impl PriceLookup,
        policy: &ShippingPolicy,
        currency: Currency,
    ) -> Result<Self, CommerceError> {
        let mut subtotal = Money::zero(currency);
        let mut item_count: i64 = 0;

        for item in lines {
            let Some(unit) = prices.unit_price(item) else {
                continue;
            };
            if unit.currency != currency {
                return Err(CommerceError::CurrencyMismatch {
                    expected: currency.code().to_string(),
                    got: unit.currency.code().to_string(),
                });
            }
            let line_total = unit
                .try_multiply(item.quantity)
                .ok_or(CommerceError::Overflow)?;
            subtotal = subtotal.try_add(&line_total).ok_or(CommerceError::Overflow)?;
            item_count = item_count
                .checked_add(item.quantity)
                .ok_or(CommerceError::Overflow)?;
        }

        let shipping = policy.fee_for(subtotal);
        let discount = Money::zero(currency);
        let total = subtotal
            .try_add(&shipping)
            .and_then(|t| t.try_subtract(&discount))
            .ok_or(CommerceError::Overflow)?;

        Ok(Self {
            subtotal,
            shipping,
            discount,
            total,
            item_count,
        })
    }

    /// Whether free shipping applies while something is selected.
    pub fn has_free_shipping(&self) -> bool {
        self.subtotal.is_positive() && self.shipping.is_zero()
    }
}

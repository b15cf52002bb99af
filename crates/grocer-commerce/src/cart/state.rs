//! Cart contents and checkout selection.

use crate::cart::{AddToCart, CartItem, CartSummary, LineKey, PriceLookup};
use crate::checkout::ShippingPolicy;
use crate::error::CommerceError;
use crate::money::Currency;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_LINE: i64 = 9999;

/// Result of [`CartState::add_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended and selected.
    Added(LineKey),
    /// The quantity of an existing line was increased.
    Merged { key: LineKey, quantity: i64 },
}

impl AddOutcome {
    pub fn key(&self) -> &LineKey {
        match self {
            AddOutcome::Added(key) => key,
            AddOutcome::Merged { key, .. } => key,
        }
    }

    pub fn is_new_line(&self) -> bool {
        matches!(self, AddOutcome::Added(_))
    }
}

/// Result of [`CartState::update_quantity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityChange {
    Updated { previous: i64, quantity: i64 },
    /// A quantity of zero or less removed the line.
    Removed(CartItem),
    /// No line matched; the cart is unchanged.
    NotFound,
}

/// Lines in insertion order plus the keys selected for checkout.
///
/// Lines are unique by [`LineKey`]; every selected key names a line in the
/// cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    items: Vec<CartItem>,
    #[serde(default)]
    selected: HashSet<LineKey>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from persisted lines.
    ///
    /// Duplicate keys merge into the first occurrence, non-positive lines are
    /// dropped, and every surviving line starts selected.
    pub fn restore(lines: Vec<CartItem>) -> Self {
        let mut items: Vec<CartItem> = Vec::with_capacity(lines.len());
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            let key = line.key();
            match items.iter_mut().find(|i| i.key() == key) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(line.quantity)
                        .min(MAX_QUANTITY_PER_LINE);
                }
                None => {
                    let mut line = line;
                    line.quantity = line.quantity.min(MAX_QUANTITY_PER_LINE);
                    items.push(line);
                }
            }
        }
        let selected = items.iter().map(CartItem::key).collect();
        Self { items, selected }
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, key: &LineKey) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.key() == key)
    }

    pub fn contains(&self, key: &LineKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over every line, selected or not.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Add a product to the cart.
    ///
    /// A line with the same key gets its quantity increased and keeps its
    /// selection state; otherwise a new line is appended and selected.
    pub fn add_item(&mut self, request: AddToCart) -> Result<AddOutcome, CommerceError> {
        if request.quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(request.quantity));
        }

        let key = request.key();
        if let Some(existing) = self.items.iter_mut().find(|i| i.key() == key) {
            let quantity = existing
                .quantity
                .checked_add(request.quantity)
                .ok_or(CommerceError::Overflow)?;
            if quantity > MAX_QUANTITY_PER_LINE {
                return Err(CommerceError::QuantityExceedsLimit(
                    quantity,
                    MAX_QUANTITY_PER_LINE,
                ));
            }
            existing.quantity = quantity;
            return Ok(AddOutcome::Merged { key, quantity });
        }

        if request.quantity > MAX_QUANTITY_PER_LINE {
            return Err(CommerceError::QuantityExceedsLimit(
                request.quantity,
                MAX_QUANTITY_PER_LINE,
            ));
        }

        self.items.push(CartItem {
            product_id: request.product_id,
            variant_id: request.variant_id,
            attributes: request.attributes.and_then(|a| a.non_empty()),
            quantity: request.quantity,
            added_at: Utc::now(),
        });
        self.selected.insert(key.clone());
        Ok(AddOutcome::Added(key))
    }

    /// Remove a line and drop it from the selection.
    pub fn remove_item(&mut self, key: &LineKey) -> Option<CartItem> {
        let index = self.items.iter().position(|i| &i.key() == key)?;
        self.selected.remove(key);
        Some(self.items.remove(index))
    }

    /// Set the quantity of a line; zero or less removes it.
    pub fn update_quantity(
        &mut self,
        key: &LineKey,
        quantity: i64,
    ) -> Result<QuantityChange, CommerceError> {
        if quantity <= 0 {
            return Ok(match self.remove_item(key) {
                Some(item) => QuantityChange::Removed(item),
                None => QuantityChange::NotFound,
            });
        }

        if quantity > MAX_QUANTITY_PER_LINE {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_LINE,
            ));
        }

        match self.items.iter_mut().find(|i| &i.key() == key) {
            Some(item) => {
                let previous = item.quantity;
                item.quantity = quantity;
                Ok(QuantityChange::Updated { previous, quantity })
            }
            None => Ok(QuantityChange::NotFound),
        }
    }

    /// Empty the cart and the selection.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected.clear();
    }

    /// Flip selection of a line. Returns the new state, or `None` when the
    /// key is not in the cart.
    pub fn toggle_selection(&mut self, key: &LineKey) -> Option<bool> {
        if !self.contains(key) {
            return None;
        }
        if self.selected.remove(key) {
            Some(false)
        } else {
            self.selected.insert(key.clone());
            Some(true)
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.items.iter().map(CartItem::key).collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// Replace the selection with the saved `keys` that still name a line.
    pub fn restore_selection(&mut self, keys: impl IntoIterator<Item = LineKey>) {
        let keys: HashSet<LineKey> = keys.into_iter().collect();
        self.selected = self
            .items
            .iter()
            .map(CartItem::key)
            .filter(|k| keys.contains(k))
            .collect();
    }

    pub fn is_selected(&self, key: &LineKey) -> bool {
        self.selected.contains(key)
    }

    pub fn selected_keys(&self) -> &HashSet<LineKey> {
        &self.selected
    }

    /// Selected lines in cart order.
    pub fn selected_items(&self) -> impl Iterator<Item = &CartItem> + '_ {
        self.items
            .iter()
            .filter(move |i| self.selected.contains(&i.key()))
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Totals over the selected lines.
    pub fn summary(
        &self,
        prices: &impl PriceLookup,
        policy: &ShippingPolicy,
        currency: Currency,
    ) -> Result<CartSummary, CommerceError> {
        CartSummary::compute(self.selected_items(), prices, policy, currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Attributes;
    use crate::money::Money;

    fn red_m() -> Attributes {
        Attributes::from_pairs([("Color", "Red"), ("Size", "M")])
    }

    #[test]
    fn test_add_merges_same_key() {
        let mut cart = CartState::new();
        let first = cart.add_item(AddToCart::product("p1", 2)).unwrap();
        let second = cart.add_item(AddToCart::product("p1", 3)).unwrap();

        assert!(first.is_new_line());
        assert_eq!(
            second,
            AddOutcome::Merged {
                key: LineKey::plain("p1"),
                quantity: 5
            }
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_attribute_order_does_not_split_lines() {
        let mut cart = CartState::new();
        cart.add_item(AddToCart::product("p1", 1).with_attributes(red_m()))
            .unwrap();
        cart.add_item(
            AddToCart::product("p1", 1)
                .with_attributes(Attributes::from_pairs([("Size", "M"), ("Color", "Red")])),
        )
        .unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_attributes_and_plain_are_distinct_lines() {
        let mut cart = CartState::new();
        cart.add_item(AddToCart::product("p1", 1).with_attributes(red_m()))
            .unwrap();
        cart.add_item(AddToCart::product("p1", 1)).unwrap();
        cart.add_item(AddToCart::product("p1", 1).with_variant("v1"))
            .unwrap();
        assert_eq!(cart.len(), 3);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = CartState::new();
        assert_eq!(
            cart.add_item(AddToCart::product("p1", 0)),
            Err(CommerceError::InvalidQuantity(0))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_enforces_line_limit() {
        let mut cart = CartState::new();
        cart.add_item(AddToCart::product("p1", 9000)).unwrap();
        let err = cart.add_item(AddToCart::product("p1", 1000)).unwrap_err();
        assert_eq!(err, CommerceError::QuantityExceedsLimit(10_000, MAX_QUANTITY_PER_LINE));
        assert_eq!(cart.items()[0].quantity, 9000);
    }

    #[test]
    fn test_new_lines_are_selected_merges_keep_state() {
        let mut cart = CartState::new();
        cart.add_item(AddToCart::product("p1", 1)).unwrap();
        let key = LineKey::plain("p1");
        assert!(cart.is_selected(&key));

        cart.toggle_selection(&key);
        cart.add_item(AddToCart::product("p1", 1)).unwrap();
        assert!(!cart.is_selected(&key));
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let mut cart = CartState::new();
        cart.add_item(AddToCart::product("p1", 2)).unwrap();
        let key = LineKey::plain("p1");

        let change = cart.update_quantity(&key, 0).unwrap();
        assert!(matches!(change, QuantityChange::Removed(_)));
        assert!(cart.is_empty());
        assert!(!cart.is_selected(&key));
    }

    #[test]
    fn test_update_quantity_unknown_key_is_noop() {
        let mut cart = CartState::new();
        cart.add_item(AddToCart::product("p1", 2)).unwrap();
        let change = cart.update_quantity(&LineKey::plain("p2"), 4).unwrap();
        assert_eq!(change, QuantityChange::NotFound);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_remove_missing_line_changes_nothing() {
        let mut cart = CartState::new();
        cart.add_item(AddToCart::product("p1", 2)).unwrap();
        let before = cart.clone();
        assert!(cart.remove_item(&LineKey::variant("p1", "v1")).is_none());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_toggle_unknown_key_is_ignored() {
        let mut cart = CartState::new();
        assert_eq!(cart.toggle_selection(&LineKey::plain("ghost")), None);
        assert!(cart.selected_keys().is_empty());
    }

    #[test]
    fn test_select_and_deselect_all() {
        let mut cart = CartState::new();
        cart.add_item(AddToCart::product("p1", 1)).unwrap();
        cart.add_item(AddToCart::product("p2", 1)).unwrap();
        cart.deselect_all();
        assert!(!cart.has_selection());
        cart.select_all();
        assert_eq!(cart.selected_keys().len(), 2);
    }

    #[test]
    fn test_restore_merges_and_selects() {
        let mut source = CartState::new();
        source.add_item(AddToCart::product("p1", 2)).unwrap();
        let mut lines = source.items().to_vec();
        lines.push(lines[0].clone());

        let cart = CartState::restore(lines);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 4);
        assert!(cart.is_selected(&LineKey::plain("p1")));
    }

    #[test]
    fn test_summary_counts_selected_lines_only() {
        let mut cart = CartState::new();
        cart.add_item(AddToCart::product("p1", 2)).unwrap();
        cart.add_item(AddToCart::product("p2", 1)).unwrap();
        cart.toggle_selection(&LineKey::plain("p2"));

        let prices = |item: &CartItem| match item.product_id.as_str() {
            "p1" => Some(Money::new(15_000, Currency::XOF)),
            "p2" => Some(Money::new(40_000, Currency::XOF)),
            _ => None,
        };
        let summary = cart
            .summary(&prices, &ShippingPolicy::default(), Currency::XOF)
            .unwrap();
        assert_eq!(summary.subtotal.amount, 30_000);
        assert_eq!(summary.shipping.amount, 2_000);
        assert_eq!(summary.total.amount, 32_000);
        assert_eq!(summary.item_count, 2);
    }

    #[test]
    fn test_restore_selection_drops_unknown_keys() {
        let mut cart = CartState::new();
        cart.add_item(AddToCart::product("p1", 1)).unwrap();
        cart.add_item(AddToCart::product("p2", 1)).unwrap();

        cart.restore_selection([LineKey::plain("p2"), LineKey::plain("gone")]);

        assert!(!cart.is_selected(&LineKey::plain("p1")));
        assert!(cart.is_selected(&LineKey::plain("p2")));
        assert_eq!(cart.selected_keys().len(), 1);
    }
}

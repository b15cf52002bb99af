//! Cart service: the cart state, its saved copy and the products it shows.

use crate::products::ProductCache;
use crate::StorefrontError;
use grocer_cache::{Cache, Slot};
use grocer_commerce::cart::{
    AddOutcome, AddToCart, CartItem, CartState, CartSummary, LineKey, QuantityChange,
};
use grocer_commerce::catalog::{Product, ProductVariant};
use grocer_commerce::checkout::{OrderLine, ShippingPolicy};
use grocer_commerce::{Currency, Money};
use grocer_observability::{AnalyticsEvent, AnalyticsItem, AnalyticsSink};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Storage key of the saved cart lines.
pub const CART_KEY: &str = "cart";

/// Storage key of the saved checkout selection.
pub const SELECTION_KEY: &str = "cart:selection";

/// A cart line's product and the variant it selects.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetails {
    pub product: Product,
    pub variant: Option<ProductVariant>,
}

impl ItemDetails {
    fn resolve(product: Product, item: &CartItem) -> Self {
        let variant = product
            .find_variant(item.attributes.as_ref(), item.variant_id.as_ref())
            .cloned();
        Self { product, variant }
    }

    /// Variant price when a variant matched, otherwise the base price.
    pub fn unit_price(&self, currency: Currency) -> Money {
        self.product.unit_price(self.variant.as_ref(), currency)
    }

    pub fn stock(&self) -> i64 {
        self.product.stock_for(self.variant.as_ref())
    }

    pub fn variant_label(&self) -> Option<String> {
        self.variant.as_ref().map(ProductVariant::label)
    }

    fn analytics_item(&self, quantity: i64, currency: Currency) -> AnalyticsItem {
        let item = AnalyticsItem::new(
            self.product.id.as_str(),
            self.product.name.clone(),
            self.unit_price(currency).amount,
            quantity,
        );
        match self.variant_label() {
            Some(label) => item.with_variant(label),
            None => item,
        }
    }
}

/// Totals, order lines and analytics items read from one cart state.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSnapshot {
    pub summary: CartSummary,
    pub lines: Vec<OrderLine>,
    pub analytics: Vec<AnalyticsItem>,
}

/// The shopping cart of one storefront session.
///
/// Every mutation takes the same lock, so concurrent adds of the same line
/// always sum. The line list and the selection are written to storage after
/// each mutation.
pub struct CartContext {
    state: Mutex<CartState>,
    products: Arc<ProductCache>,
    store: Option<Slot<Vec<CartItem>>>,
    selection: Option<Slot<Vec<LineKey>>>,
    analytics: Arc<dyn AnalyticsSink>,
    policy: ShippingPolicy,
    currency: Currency,
}

impl std::fmt::Debug for CartContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartContext")
            .field("currency", &self.currency)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl CartContext {
    pub fn new(
        products: Arc<ProductCache>,
        analytics: Arc<dyn AnalyticsSink>,
        policy: ShippingPolicy,
        currency: Currency,
    ) -> Self {
        Self {
            state: Mutex::new(CartState::new()),
            products,
            store: None,
            selection: None,
            analytics,
            policy,
            currency,
        }
    }

    /// Mirror the cart lines into `cache` under [`CART_KEY`] and the
    /// selection under [`SELECTION_KEY`].
    pub fn with_store(mut self, cache: Cache) -> Self {
        self.selection = Some(Slot::new(cache.clone(), SELECTION_KEY));
        self.store = Some(Slot::new(cache, CART_KEY));
        self
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn policy(&self) -> &ShippingPolicy {
        &self.policy
    }

    pub fn products(&self) -> &Arc<ProductCache> {
        &self.products
    }

    /// Replace the in-memory cart with the saved lines and fetch their
    /// products. Returns the number of lines restored.
    ///
    /// The saved selection is applied when there is one; otherwise every
    /// line starts selected.
    pub async fn restore(&self) -> usize {
        let Some(store) = &self.store else {
            return 0;
        };
        let lines = store.load_or_default();
        let mut restored = CartState::restore(lines);
        if let Some(keys) = self.saved_selection() {
            restored.restore_selection(keys);
        }
        let count = restored.len();
        *self.state.lock().await = restored;
        debug!(lines = count, "cart restored");

        self.load_products().await;
        count
    }

    /// Put a product in the cart.
    ///
    /// The line is stored before the product is looked up; "add to cart"
    /// analytics fire once the product is available.
    pub async fn add_item(&self, request: AddToCart) -> Result<AddOutcome, StorefrontError> {
        let quantity = request.quantity;
        let (outcome, item) = {
            let mut state = self.state.lock().await;
            let outcome = state.add_item(request)?;
            self.persist(&state);
            let item = state.get(outcome.key()).cloned();
            (outcome, item)
        };
        debug!(line = %outcome.key(), quantity, "cart line added");

        if let Some(item) = item {
            match self.get_item_details(&item).await {
                Some(details) => self.track(AnalyticsEvent::add_to_cart(
                    self.currency.code(),
                    details.analytics_item(quantity, self.currency),
                )),
                None => debug!(line = %outcome.key(), "add_to_cart not tracked, product unavailable"),
            }
        }
        Ok(outcome)
    }

    /// Remove a line. Returns the removed line, or `None` without a match.
    pub async fn remove_item(&self, key: &LineKey) -> Option<CartItem> {
        let removed = {
            let mut state = self.state.lock().await;
            let removed = state.remove_item(key)?;
            self.persist(&state);
            removed
        };
        debug!(line = %key, "cart line removed");
        self.track_removal(&removed).await;
        Some(removed)
    }

    /// Set a line's quantity; zero or less removes the line.
    pub async fn update_quantity(
        &self,
        key: &LineKey,
        quantity: i64,
    ) -> Result<QuantityChange, StorefrontError> {
        let change = {
            let mut state = self.state.lock().await;
            let change = state.update_quantity(key, quantity)?;
            if change != QuantityChange::NotFound {
                self.persist(&state);
            }
            change
        };

        if let QuantityChange::Removed(item) = &change {
            self.track_removal(item).await;
        }
        Ok(change)
    }

    pub async fn clear_cart(&self) {
        let mut state = self.state.lock().await;
        state.clear();
        self.persist(&state);
        info!("cart cleared");
    }

    /// Product and variant for a line, fetching the product if needed.
    ///
    /// `None` when the product cannot be loaded.
    pub async fn get_item_details(&self, item: &CartItem) -> Option<ItemDetails> {
        self.products
            .get_or_fetch(&item.product_id)
            .await
            .map(|product| ItemDetails::resolve(product, item))
    }

    /// Fetch every product the cart refers to that is not cached yet.
    pub async fn load_products(&self) -> usize {
        let ids: Vec<_> = {
            let state = self.state.lock().await;
            state.items().iter().map(|i| i.product_id.clone()).collect()
        };
        self.products.load_missing(ids).await
    }

    pub async fn toggle_selection(&self, key: &LineKey) -> Option<bool> {
        let mut state = self.state.lock().await;
        let selected = state.toggle_selection(key)?;
        self.persist_selection(&state);
        Some(selected)
    }

    pub async fn select_all(&self) {
        let mut state = self.state.lock().await;
        state.select_all();
        self.persist_selection(&state);
    }

    pub async fn deselect_all(&self) {
        let mut state = self.state.lock().await;
        state.deselect_all();
        self.persist_selection(&state);
    }

    /// Snapshot of the cart.
    pub async fn snapshot(&self) -> CartState {
        self.state.lock().await.clone()
    }

    pub async fn items(&self) -> Vec<CartItem> {
        self.state.lock().await.items().to_vec()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.is_empty()
    }

    /// Totals over the selected lines whose products are loaded.
    pub async fn summary(&self) -> Result<CartSummary, StorefrontError> {
        let state = self.state.lock().await;
        let prices = |item: &CartItem| self.cached_price(item);
        Ok(state.summary(&prices, &self.policy, self.currency)?)
    }

    /// Selected lines as order lines, skipping lines whose product is not
    /// loaded.
    pub async fn order_lines(&self) -> Vec<OrderLine> {
        let state = self.state.lock().await;
        self.lines_of(&state)
    }

    /// Analytics items for the selected, loaded lines.
    pub async fn selected_analytics_items(&self) -> Vec<AnalyticsItem> {
        let state = self.state.lock().await;
        self.analytics_of(&state)
    }

    /// Summary, order lines and analytics items under a single lock, so
    /// the totals always describe the lines.
    pub async fn checkout_snapshot(&self) -> Result<CheckoutSnapshot, StorefrontError> {
        let state = self.state.lock().await;
        let prices = |item: &CartItem| self.cached_price(item);
        let summary = state.summary(&prices, &self.policy, self.currency)?;
        Ok(CheckoutSnapshot {
            summary,
            lines: self.lines_of(&state),
            analytics: self.analytics_of(&state),
        })
    }

    fn lines_of(&self, state: &CartState) -> Vec<OrderLine> {
        state
            .selected_items()
            .filter_map(|item| {
                let details = self.cached_details(item)?;
                Some(OrderLine {
                    product_id: item.product_id.clone(),
                    variant_id: details
                        .variant
                        .as_ref()
                        .map(|v| v.id.clone())
                        .or_else(|| item.variant_id.clone()),
                    attributes: item.attributes.clone(),
                    product_name: details.product.name.clone(),
                    variant_label: details.variant_label(),
                    quantity: item.quantity,
                    unit_price: details.unit_price(self.currency).amount,
                })
            })
            .collect()
    }

    fn analytics_of(&self, state: &CartState) -> Vec<AnalyticsItem> {
        state
            .selected_items()
            .filter_map(|item| {
                self.cached_details(item)
                    .map(|d| d.analytics_item(item.quantity, self.currency))
            })
            .collect()
    }

    fn cached_details(&self, item: &CartItem) -> Option<ItemDetails> {
        self.products
            .get_cached(&item.product_id)
            .map(|product| ItemDetails::resolve(product, item))
    }

    fn cached_price(&self, item: &CartItem) -> Option<Money> {
        self.cached_details(item).map(|d| d.unit_price(self.currency))
    }

    async fn track_removal(&self, item: &CartItem) {
        if let Some(details) = self.get_item_details(item).await {
            self.track(AnalyticsEvent::remove_from_cart(
                self.currency.code(),
                details.analytics_item(item.quantity, self.currency),
            ));
        }
    }

    fn track(&self, event: AnalyticsEvent) {
        self.analytics.track(&event);
    }

    fn persist(&self, state: &CartState) {
        if let Some(store) = &self.store {
            if let Err(e) = store.store(&state.items().to_vec()) {
                warn!(error = %e, "failed to save cart");
            }
        }
        self.persist_selection(state);
    }

    fn persist_selection(&self, state: &CartState) {
        if let Some(selection) = &self.selection {
            let mut keys: Vec<LineKey> = state.selected_keys().iter().cloned().collect();
            keys.sort();
            if let Err(e) = selection.store(&keys) {
                warn!(error = %e, "failed to save cart selection");
            }
        }
    }

    fn saved_selection(&self) -> Option<Vec<LineKey>> {
        let selection = self.selection.as_ref()?;
        match selection.load() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "saved cart selection unreadable, selecting all lines");
                None
            }
        }
    }
}

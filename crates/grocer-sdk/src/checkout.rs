//! Checkout service.

use crate::cart::CartContext;
use crate::messaging::ChatHandoff;
use crate::StorefrontError;
use grocer_commerce::cart::CartSummary;
use grocer_commerce::checkout::{CheckoutFlow, CheckoutPhase, CreateOrderRequest, CustomerDetails, Order};
use grocer_commerce::CommerceError;
use grocer_data::ApiClient;
use grocer_observability::{AnalyticsEvent, AnalyticsSink};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// What a successful submission hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub order: Order,
    /// Prefilled chat link, when a shop phone is configured.
    pub chat_link: Option<String>,
}

const INTERRUPTED: &str = "Checkout was interrupted, please try again";

/// Puts a submission that never settled back into review.
struct SubmitGuard<'a> {
    flow: &'a Mutex<CheckoutFlow>,
    settled: bool,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut flow = self.flow.lock();
        if matches!(flow.phase(), CheckoutPhase::Submitting) {
            warn!("checkout submission dropped before completing");
            let _ = flow.fail(INTERRUPTED);
        }
    }
}

/// Runs one checkout at a time over the cart's selected lines.
pub struct CheckoutService {
    api: ApiClient,
    cart: Arc<CartContext>,
    analytics: Arc<dyn AnalyticsSink>,
    chat: Option<ChatHandoff>,
    flow: Mutex<CheckoutFlow>,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService")
            .field("phase", &self.flow.lock().phase().as_str())
            .field("chat", &self.chat)
            .finish_non_exhaustive()
    }
}

impl CheckoutService {
    pub fn new(api: ApiClient, cart: Arc<CartContext>, analytics: Arc<dyn AnalyticsSink>) -> Self {
        Self {
            api,
            cart,
            analytics,
            chat: None,
            flow: Mutex::new(CheckoutFlow::new()),
        }
    }

    pub fn with_chat(mut self, chat: Option<ChatHandoff>) -> Self {
        self.chat = chat;
        self
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.flow.lock().phase().clone()
    }

    /// Message of the last failed submission.
    pub fn last_error(&self) -> Option<String> {
        self.flow.lock().last_error().map(str::to_string)
    }

    /// Start a checkout: load the cart's products, fire "begin checkout" and
    /// return the totals to review.
    pub async fn open(&self) -> Result<CartSummary, StorefrontError> {
        {
            let mut flow = self.flow.lock();
            if matches!(flow.phase(), CheckoutPhase::Submitting | CheckoutPhase::Confirmed(_)) {
                return Err(CommerceError::InvalidCheckoutTransition {
                    from: flow.phase().as_str().to_string(),
                    to: "review".to_string(),
                }
                .into());
            }
            *flow = CheckoutFlow::new();
        }

        self.cart.load_products().await;
        let items = self.cart.selected_analytics_items().await;
        if items.is_empty() {
            return Err(CommerceError::EmptySelection.into());
        }
        self.analytics
            .track(&AnalyticsEvent::begin_checkout(self.cart.currency().code(), items));
        self.cart.summary().await
    }

    /// Create the order from the selected lines.
    ///
    /// On failure the flow returns to review with the error's user message
    /// and the cart is left as it was. Dropping the returned future before it
    /// settles also returns the flow to review.
    pub async fn submit(&self, customer: &CustomerDetails) -> Result<CheckoutReceipt, StorefrontError> {
        self.flow.lock().begin_submit()?;
        let mut guard = SubmitGuard {
            flow: &self.flow,
            settled: false,
        };
        let result = self.place_order(customer).await;
        guard.settled = true;

        match result {
            Ok(receipt) => {
                self.flow.lock().complete(receipt.order.clone())?;
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, "checkout failed");
                self.flow.lock().fail(e.user_message())?;
                Err(e)
            }
        }
    }

    async fn place_order(&self, customer: &CustomerDetails) -> Result<CheckoutReceipt, StorefrontError> {
        self.cart.load_products().await;
        let snapshot = self.cart.checkout_snapshot().await?;
        let request = CreateOrderRequest::new(customer, snapshot.lines, &snapshot.summary)?;

        let order = self.api.orders().create(&request).await?;
        info!(order_number = %order.order_number, total = order.total, "checkout complete");

        let currency = self.cart.currency();
        self.analytics.track(&AnalyticsEvent::purchase(
            currency.code(),
            order.order_number.clone(),
            order.total,
            snapshot.analytics,
        ));

        let chat_link = self.chat.as_ref().and_then(|chat| match chat.order_link(&order, currency) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!(error = %e, "could not build chat link");
                None
            }
        });

        Ok(CheckoutReceipt { order, chat_link })
    }

    /// Close the confirmation and empty the cart.
    pub async fn dismiss(&self) -> Result<Order, StorefrontError> {
        let order = self.flow.lock().dismiss()?;
        self.cart.clear_cart().await;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::ProductCache;
    use grocer_commerce::cart::AddToCart;
    use grocer_commerce::checkout::ShippingPolicy;
    use grocer_commerce::Currency;
    use grocer_data::mock::MockTransport;
    use grocer_data::{FetchClient, FetchError, Method, Request, Response, Transport};
    use grocer_observability::{EventName, MemorySink};
    use serde_json::json;

    struct Fixture {
        mock: MockTransport,
        sink: Arc<MemorySink>,
        cart: Arc<CartContext>,
        checkout: CheckoutService,
    }

    /// Holds `POST /orders` open forever; everything else goes to the mock.
    struct StalledOrders(MockTransport);

    #[async_trait::async_trait]
    impl Transport for StalledOrders {
        async fn send(&self, request: Request) -> Result<Response, FetchError> {
            if request.method == Method::Post && request.path() == "/orders" {
                std::future::pending::<()>().await;
            }
            self.0.send(request).await
        }
    }

    fn fixture() -> Fixture {
        let mock = catalog();
        fixture_over(mock.clone(), Arc::new(mock))
    }

    fn catalog() -> MockTransport {
        let mock = MockTransport::new();
        mock.respond_always(
            Method::Get,
            "/products/rice",
            200,
            json!({"id": "rice", "name": "Riz 5kg", "price": 12500}),
        );
        mock.respond_always(
            Method::Get,
            "/products/soap",
            200,
            json!({"id": "soap", "name": "Savon", "price": 750}),
        );
        mock
    }

    fn fixture_over(mock: MockTransport, transport: Arc<dyn Transport>) -> Fixture {
        let api = ApiClient::new(FetchClient::new(transport, "https://api.test"));
        let sink = Arc::new(MemorySink::new());
        let products = Arc::new(ProductCache::new(Arc::new(api.clone())));
        let cart = Arc::new(CartContext::new(
            products,
            sink.clone(),
            ShippingPolicy::default(),
            Currency::XOF,
        ));
        let checkout = CheckoutService::new(api, cart.clone(), sink.clone())
            .with_chat(ChatHandoff::new("+225 0708091011"));
        Fixture {
            mock,
            sink,
            cart,
            checkout,
        }
    }

    fn customer() -> CustomerDetails {
        CustomerDetails::new("Awa Koné", "0708091011", "Cocody, Abidjan")
    }

    fn order_json() -> serde_json::Value {
        json!({"data": {
            "id": "o1", "order_number": "CMD-0042",
            "customer_name": "Awa Koné", "customer_phone": "0708091011",
            "delivery_address": "Cocody, Abidjan",
            "subtotal": 25000, "shipping_fee": 4000, "total": 29000
        }})
    }

    #[tokio::test]
    async fn test_open_requires_selection() {
        let f = fixture();
        let err = f.checkout.open().await.unwrap_err();
        assert!(matches!(err, StorefrontError::Commerce(CommerceError::EmptySelection)));

        f.cart.add_item(AddToCart::product("rice", 2)).await.unwrap();
        let summary = f.checkout.open().await.unwrap();
        assert_eq!(summary.total.amount, 29_000);
        assert_eq!(f.sink.named(EventName::BeginCheckout).len(), 1);
    }

    #[tokio::test]
    async fn test_submit_then_dismiss_clears_cart() {
        let f = fixture();
        f.mock.respond(Method::Post, "/orders", 201, order_json());
        f.cart.add_item(AddToCart::product("rice", 2)).await.unwrap();
        f.checkout.open().await.unwrap();

        let receipt = f.checkout.submit(&customer()).await.unwrap();
        assert_eq!(receipt.order.order_number, "CMD-0042");
        assert!(receipt.chat_link.unwrap().starts_with("https://wa.me/2250708091011?text="));
        assert!(matches!(f.checkout.phase(), CheckoutPhase::Confirmed(_)));

        let body = f.mock.requests_to(Method::Post, "/orders")[0].json_body().unwrap();
        assert_eq!(body["items"][0]["quantity"], 2);
        assert_eq!(body["total"], 29000);

        let purchase = &f.sink.named(EventName::Purchase)[0];
        assert_eq!(purchase.transaction_id.as_deref(), Some("CMD-0042"));
        assert_eq!(purchase.value, 29_000);

        // cart survives until the confirmation is closed
        assert!(!f.cart.is_empty().await);
        f.checkout.dismiss().await.unwrap();
        assert!(f.cart.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_cart() {
        let f = fixture();
        f.mock.respond(
            Method::Post,
            "/orders",
            400,
            json!({"code": "insufficient_stock", "message": "Insufficient stock for Riz 5kg"}),
        );
        f.cart.add_item(AddToCart::product("rice", 2)).await.unwrap();
        f.checkout.open().await.unwrap();

        let err = f.checkout.submit(&customer()).await.unwrap_err();
        assert_eq!(err.user_message(), "Not enough stock for this quantity");
        assert_eq!(f.checkout.phase(), CheckoutPhase::Review);
        assert_eq!(
            f.checkout.last_error().as_deref(),
            Some("Not enough stock for this quantity")
        );
        assert_eq!(f.cart.items().await.len(), 1);
        assert!(f.sink.named(EventName::Purchase).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_customer_never_reaches_api() {
        let f = fixture();
        f.cart.add_item(AddToCart::product("rice", 1)).await.unwrap();
        let bad = CustomerDetails::new("", "07 08", "");

        let err = f.checkout.submit(&bad).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Commerce(CommerceError::Validation(_))));
        assert!(f.mock.requests_to(Method::Post, "/orders").is_empty());
    }

    #[tokio::test]
    async fn test_posted_subtotal_matches_posted_lines() {
        let f = fixture();
        f.mock.respond(Method::Post, "/orders", 201, order_json());
        f.cart.add_item(AddToCart::product("rice", 2)).await.unwrap();
        f.cart.add_item(AddToCart::product("soap", 3)).await.unwrap();
        f.checkout.open().await.unwrap();
        f.checkout.submit(&customer()).await.unwrap();

        let body = f.mock.requests_to(Method::Post, "/orders")[0].json_body().unwrap();
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        let lines_total: i64 = items
            .iter()
            .map(|i| i["unit_price"].as_i64().unwrap() * i["quantity"].as_i64().unwrap())
            .sum();
        assert_eq!(lines_total, 2 * 12_500 + 3 * 750);
        assert_eq!(body["subtotal"].as_i64(), Some(lines_total));
        assert_eq!(
            body["total"].as_i64(),
            Some(lines_total + body["shipping_fee"].as_i64().unwrap())
        );
    }

    #[tokio::test]
    async fn test_dropped_submit_returns_to_review() {
        let mock = catalog();
        let f = fixture_over(mock.clone(), Arc::new(StalledOrders(mock)));
        f.cart.add_item(AddToCart::product("rice", 1)).await.unwrap();
        f.checkout.open().await.unwrap();

        let pending = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            f.checkout.submit(&customer()),
        )
        .await;
        assert!(pending.is_err());

        assert_eq!(f.checkout.phase(), CheckoutPhase::Review);
        assert_eq!(f.checkout.last_error().as_deref(), Some(INTERRUPTED));
        assert!(f.checkout.open().await.is_ok());
        assert!(f.sink.named(EventName::Purchase).is_empty());
    }
}

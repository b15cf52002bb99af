//! End-to-end session flows over a mocked backend.

use grocer_cache::Cache;
use grocer_commerce::cart::{AddToCart, LineKey};
use grocer_commerce::checkout::{CheckoutPhase, CustomerDetails};
use grocer_data::mock::MockTransport;
use grocer_data::Method;
use grocer_observability::{EventName, MemoryNotifier, MemorySink};
use grocer_sdk::{Storefront, StorefrontConfig};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn config() -> StorefrontConfig {
    let mut config = StorefrontConfig::default();
    config.api.base_url = "https://api.test".to_string();
    config.auth.url = Some("https://id.test".to_string());
    config.auth.anon_key = Some("anon".to_string());
    config.store.chat_phone = Some("+225 07 08 09 10 11".to_string());
    config
}

fn backend() -> MockTransport {
    let mock = MockTransport::new();
    mock.respond_always(
        Method::Get,
        "/products/rice",
        200,
        json!({"data": {"id": "rice", "name": "Riz 5kg", "price": 12500, "stock": 40}}),
    );
    mock.respond_always(
        Method::Get,
        "/products/oil",
        200,
        json!({"data": {"id": "oil", "name": "Huile", "price": 3000, "variants": [
            {"id": "oil-1l", "name": "Size", "value": "1L", "price": 3000, "stock": 10},
            {"id": "oil-5l", "name": "Size", "value": "5L", "price": 13500, "stock": 3}
        ]}}),
    );
    mock.respond(
        Method::Post,
        "/auth/v1/token",
        200,
        json!({
            "access_token": "at-1", "token_type": "bearer", "expires_in": 3600,
            "refresh_token": "rt-1", "user": {"id": "u1", "email": "awa@example.com"}
        }),
    );
    mock
}

fn storefront(mock: &MockTransport, cache: Cache) -> (Storefront, Arc<MemorySink>, Arc<MemoryNotifier>) {
    let sink = Arc::new(MemorySink::new());
    let notifier = Arc::new(MemoryNotifier::new());
    let storefront = Storefront::builder(config())
        .transport(Arc::new(mock.clone()))
        .cache(cache)
        .analytics(sink.clone())
        .notifier(notifier.clone())
        .build()
        .unwrap();
    (storefront, sink, notifier)
}

#[tokio::test]
async fn test_signed_in_checkout() {
    let mock = backend();
    mock.respond(
        Method::Post,
        "/orders",
        201,
        json!({"data": {
            "id": "o1", "order_number": "CMD-0042", "customer_name": "Awa Koné",
            "customer_phone": "0708091011", "delivery_address": "Cocody",
            "subtotal": 38500, "shipping_fee": 2000, "total": 40500
        }}),
    );
    let (storefront, sink, _) = storefront(&mock, Cache::in_memory());
    storefront.start().await;

    let auth = storefront.auth().unwrap();
    assert!(auth.login("Awa@Example.com", "Secret123").await);
    tokio::time::timeout(Duration::from_secs(1), async {
        while !storefront.api().fetch().has_bearer_token() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("token not propagated to the api client");

    let cart = storefront.cart();
    cart.add_item(AddToCart::product("rice", 2)).await.unwrap();
    cart.add_item(AddToCart::product("oil", 1).with_variant("oil-5l"))
        .await
        .unwrap();

    let summary = storefront.checkout().open().await.unwrap();
    assert_eq!(summary.subtotal.amount, 38_500);
    assert_eq!(summary.shipping.amount, 2_000);

    let customer = CustomerDetails::new("Awa Koné", "0708091011", "Cocody");
    let receipt = storefront.checkout().submit(&customer).await.unwrap();
    assert!(receipt.chat_link.unwrap().contains("CMD-0042"));

    let sent = &mock.requests_to(Method::Post, "/orders")[0];
    assert_eq!(
        sent.headers.get("Authorization").map(String::as_str),
        Some("Bearer at-1")
    );
    let body = sent.json_body().unwrap();
    assert_eq!(body["items"][1]["variant_id"], "oil-5l");
    assert_eq!(body["items"][1]["unit_price"], 13500);

    assert_eq!(sink.named(EventName::Purchase).len(), 1);
    storefront.checkout().dismiss().await.unwrap();
    assert!(cart.is_empty().await);
    assert_eq!(storefront.checkout().phase(), CheckoutPhase::Dismissed);

    storefront.shutdown().await;
}

#[tokio::test]
async fn test_cart_and_session_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mock = backend();

    {
        let (storefront, _, _) = storefront(&mock, Cache::open_dir(dir.path()).unwrap());
        storefront.start().await;
        assert!(storefront.auth().unwrap().login("awa@example.com", "Secret123").await);
        storefront
            .cart()
            .add_item(AddToCart::product("rice", 3))
            .await
            .unwrap();
        storefront.shutdown().await;
    }

    let (storefront, _, _) = storefront(&mock, Cache::open_dir(dir.path()).unwrap());
    storefront.start().await;

    assert!(storefront.auth().unwrap().is_authenticated());
    assert!(storefront.api().fetch().has_bearer_token());
    let state = storefront.cart().snapshot().await;
    assert_eq!(state.get(&LineKey::plain("rice")).map(|i| i.quantity), Some(3));
    assert!(state.is_selected(&LineKey::plain("rice")));
    storefront.shutdown().await;
}

#[tokio::test]
async fn test_failed_login_notifies() {
    let mock = MockTransport::new();
    mock.respond(
        Method::Post,
        "/auth/v1/token",
        400,
        json!({"error": "invalid_grant", "error_description": "Invalid login credentials"}),
    );
    let (storefront, _, notifier) = storefront(&mock, Cache::in_memory());
    storefront.start().await;

    assert!(!storefront.auth().unwrap().login("awa@example.com", "wrong").await);
    assert_eq!(notifier.errors(), vec!["Incorrect email or password".to_string()]);
    assert!(!storefront.api().fetch().has_bearer_token());
    storefront.shutdown().await;
}

#[tokio::test]
async fn test_deselected_line_stays_out_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mock = backend();
    let oil = LineKey::variant("oil", "oil-5l");

    {
        let (storefront, _, _) = storefront(&mock, Cache::open_dir(dir.path()).unwrap());
        storefront.start().await;
        let cart = storefront.cart();
        cart.add_item(AddToCart::product("rice", 2)).await.unwrap();
        cart.add_item(AddToCart::product("oil", 1).with_variant("oil-5l"))
            .await
            .unwrap();
        assert_eq!(cart.toggle_selection(&oil).await, Some(false));
        storefront.shutdown().await;
    }

    let (storefront, _, _) = storefront(&mock, Cache::open_dir(dir.path()).unwrap());
    storefront.start().await;

    let state = storefront.cart().snapshot().await;
    assert_eq!(state.items().len(), 2);
    assert!(state.is_selected(&LineKey::plain("rice")));
    assert!(!state.is_selected(&oil));

    let summary = storefront.checkout().open().await.unwrap();
    assert_eq!(summary.subtotal.amount, 25_000);
    storefront.shutdown().await;
}

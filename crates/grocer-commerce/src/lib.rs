//! Grocery marketplace domain types and logic.
//!
//! - **Catalog**: products with legacy or attribute-based variants, categories, trash
//! - **Cart**: lines keyed by product and variant selection, checkout selection, totals
//! - **Checkout**: customer details, delivery fee tiers, order submission phases, orders
//! - **Search**: list queries, filters and paging
//!
//! # Example
//!
//! ```rust
//! use grocer_commerce::prelude::*;
//!
//! let rice = Product::new("p1", "Riz parfumé 5kg", 12_500);
//!
//! let mut cart = CartState::new();
//! cart.add_item(AddToCart::product(rice.id.clone(), 2)).unwrap();
//!
//! let prices = |item: &CartItem| {
//!     (item.product_id == rice.id).then(|| rice.unit_price(None, Currency::XOF))
//! };
//! let summary = cart
//!     .summary(&prices, &ShippingPolicy::default(), Currency::XOF)
//!     .unwrap();
//! assert_eq!(summary.total.display(), "29 000 FCFA");
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod reorder;
pub mod search;

pub use error::{CommerceError, FieldError};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, FieldError};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        slugify, Attributes, Category, Product, ProductVariant, VariantKind,
    };

    // Cart
    pub use crate::cart::{
        AddOutcome, AddToCart, CartItem, CartState, CartSummary, LineKey, PriceLookup,
        QuantityChange,
    };

    // Checkout
    pub use crate::checkout::{
        CheckoutFlow, CheckoutPhase, CreateOrderRequest, CustomerDetails, Order, OrderItem,
        OrderLine, OrderStatus, PaymentStatus, ShippingLocation, ShippingPolicy, StatusUpdate,
    };

    // Content
    pub use crate::content::{HeroSlide, HomepageSection};

    // Search
    pub use crate::search::{Filter, ListQuery, Page, Pagination, SortOption};
}

//! Storefront session services for the grocer marketplace.
//!
//! A [`Storefront`] is built once per session from a [`StorefrontConfig`]
//! and owns everything the shop front needs:
//!
//! - [`ApiClient`](grocer_data::ApiClient) for the marketplace REST API
//! - [`AuthContext`](grocer_auth::AuthContext) for the signed-in user
//! - [`CartContext`] for the cart, its saved copy and its products
//! - [`CheckoutService`] for turning the selected lines into an order
//!
//! # Example
//!
//! ```rust,no_run
//! use grocer_sdk::prelude::*;
//!
//! # async fn run() -> Result<(), StorefrontError> {
//! let mut config = StorefrontConfig::default();
//! config.apply_env();
//! let storefront = Storefront::builder(config).build()?;
//! storefront.start().await;
//!
//! let cart = storefront.cart();
//! cart.add_item(AddToCart::product("rice", 2)).await?;
//! let summary = cart.summary().await?;
//! println!("total: {}", summary.total);
//! # Ok(())
//! # }
//! ```

mod cart;
mod checkout;
mod config;
mod error;
mod messaging;
mod products;
mod reorder;
mod storefront;

pub use cart::{CartContext, CheckoutSnapshot, ItemDetails, CART_KEY, SELECTION_KEY};
pub use checkout::{CheckoutReceipt, CheckoutService};
pub use config::{ApiConfig, AuthConfig, StorageConfig, StoreConfig, StorefrontConfig, CONFIG_NAMES};
pub use error::StorefrontError;
pub use messaging::ChatHandoff;
pub use products::{ProductCache, ProductSource};
pub use reorder::{ReorderController, Reorderer};
pub use storefront::{Storefront, StorefrontBuilder};

pub use grocer_auth as auth;
pub use grocer_cache as cache;
pub use grocer_commerce as commerce;
pub use grocer_data as data;
pub use grocer_observability as observability;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CartContext, ChatHandoff, CheckoutReceipt, CheckoutService, ItemDetails, ReorderController,
        Storefront, StorefrontConfig, StorefrontError,
    };
    pub use grocer_auth::{AuthContext, AuthEvent, EmailLink};
    pub use grocer_commerce::prelude::*;
    pub use grocer_data::ApiClient;
}

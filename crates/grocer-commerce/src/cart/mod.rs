//! Shopping cart.

mod item;
mod state;
mod summary;

pub use item::{AddToCart, CartItem, LineKey, LineSelector};
pub use state::{AddOutcome, CartState, QuantityChange, MAX_QUANTITY_PER_LINE};
pub use summary::{CartSummary, PriceLookup};

//! Checkout module.
//!
//! Customer details, delivery fees, the checkout state machine and orders.

mod customer;
mod flow;
mod order;
mod shipping;

pub use customer::{CustomerDetails, MIN_PHONE_DIGITS};
pub use flow::{CheckoutFlow, CheckoutPhase};
pub use order::{
    CreateOrderRequest, NewOrderItem, Order, OrderItem, OrderLine, OrderStatus, PaymentStatus,
    StatusUpdate,
};
pub use shipping::{LocationInput, ShippingLocation, ShippingPolicy};

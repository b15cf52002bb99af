//! Orders endpoint.
//!
//! Item edits are only accepted by the backend while an order is pending or
//! confirmed; rejections come back as [`ApiErrorCode::OrderNotEditable`],
//! [`ApiErrorCode::InsufficientStock`] or [`ApiErrorCode::LastItem`].
//!
//! [`ApiErrorCode::OrderNotEditable`]: crate::ApiErrorCode::OrderNotEditable
//! [`ApiErrorCode::InsufficientStock`]: crate::ApiErrorCode::InsufficientStock
//! [`ApiErrorCode::LastItem`]: crate::ApiErrorCode::LastItem

use crate::api::Resource;
use crate::{FetchClient, FetchError};
use grocer_commerce::checkout::{CreateOrderRequest, NewOrderItem, Order, StatusUpdate};
use grocer_commerce::ids::{OrderId, OrderItemId};
use grocer_commerce::search::{ListQuery, Page};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct QuantityBody {
    quantity: i64,
}

/// Typed access to `/orders`.
pub struct OrdersApi<'a> {
    resource: Resource<'a, Order, CreateOrderRequest>,
}

impl<'a> OrdersApi<'a> {
    pub(crate) fn new(client: &'a FetchClient) -> Self {
        Self {
            resource: Resource::new(client, "orders"),
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<Order>, FetchError> {
        self.resource.list(query).await
    }

    pub async fn get(&self, id: &OrderId) -> Result<Order, FetchError> {
        self.resource.get(id.as_str()).await
    }

    /// Place an order.
    pub async fn create(&self, request: &CreateOrderRequest) -> Result<Order, FetchError> {
        let order = self.resource.create(request).await?;
        info!(order_number = %order.order_number, total = order.total, "order created");
        Ok(order)
    }

    /// Change status, payment status or notes.
    pub async fn update_status(&self, id: &OrderId, update: &StatusUpdate) -> Result<Order, FetchError> {
        self.resource
            .client()
            .patch(self.resource.item_path(&format!("{}/status", id)))
            .json(update)
            .send_record()
            .await
    }

    pub async fn add_item(&self, id: &OrderId, item: &NewOrderItem) -> Result<Order, FetchError> {
        self.resource
            .client()
            .post(self.resource.item_path(&format!("{}/items", id)))
            .json(item)
            .send_record()
            .await
    }

    pub async fn update_item(
        &self,
        id: &OrderId,
        item_id: &OrderItemId,
        quantity: i64,
    ) -> Result<Order, FetchError> {
        self.resource
            .client()
            .patch(self.resource.item_path(&format!("{}/items/{}", id, item_id)))
            .json(&QuantityBody { quantity })
            .send_record()
            .await
    }

    pub async fn remove_item(&self, id: &OrderId, item_id: &OrderItemId) -> Result<Order, FetchError> {
        self.resource
            .client()
            .delete(self.resource.item_path(&format!("{}/items/{}", id, item_id)))
            .send_record()
            .await
    }
}

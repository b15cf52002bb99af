//! Delivery locations.

use crate::api::Resource;
use crate::{FetchClient, FetchError};
use grocer_commerce::checkout::{LocationInput, ShippingLocation};
use grocer_commerce::ids::LocationId;

/// Typed access to `/shipping`.
pub struct ShippingApi<'a> {
    resource: Resource<'a, ShippingLocation, LocationInput>,
}

impl<'a> ShippingApi<'a> {
    pub(crate) fn new(client: &'a FetchClient) -> Self {
        Self {
            resource: Resource::new(client, "shipping"),
        }
    }

    /// All locations, in display order.
    pub async fn list(&self) -> Result<Vec<ShippingLocation>, FetchError> {
        let mut all = self.resource.list_all().await?;
        all.sort_by_key(|l| l.display_order);
        Ok(all)
    }

    /// Locations a customer may pick at checkout.
    pub async fn active(&self) -> Result<Vec<ShippingLocation>, FetchError> {
        Ok(self.list().await?.into_iter().filter(|l| l.is_active).collect())
    }

    pub async fn get(&self, id: &LocationId) -> Result<ShippingLocation, FetchError> {
        self.resource.get(id.as_str()).await
    }

    pub async fn create(&self, input: &LocationInput) -> Result<ShippingLocation, FetchError> {
        self.resource.create(input).await
    }

    pub async fn update(&self, id: &LocationId, input: &LocationInput) -> Result<ShippingLocation, FetchError> {
        self.resource.update(id.as_str(), input).await
    }

    pub async fn delete(&self, id: &LocationId) -> Result<(), FetchError> {
        self.resource.delete(id.as_str()).await
    }

    pub async fn reorder(&self, ids: &[LocationId]) -> Result<(), FetchError> {
        self.resource.reorder(ids).await
    }
}

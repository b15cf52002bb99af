//! Per-resource wrappers over [`FetchClient`].

mod categories;
mod content;
mod orders;
mod products;
mod resource;
mod shipping;
mod uploads;

pub use categories::CategoriesApi;
pub use content::{SectionsApi, SlidesApi};
pub use orders::OrdersApi;
pub use products::ProductsApi;
pub use resource::Resource;
pub use shipping::ShippingApi;
pub use uploads::{UploadedFile, UploadsApi};

use crate::FetchClient;

/// Entry point to the marketplace API.
///
/// Cheap to clone; every clone shares the transport and the session token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: FetchClient,
}

impl ApiClient {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// The underlying HTTP client.
    pub fn fetch(&self) -> &FetchClient {
        &self.client
    }

    pub fn products(&self) -> ProductsApi<'_> {
        ProductsApi::new(&self.client)
    }

    pub fn categories(&self) -> CategoriesApi<'_> {
        CategoriesApi::new(&self.client)
    }

    pub fn orders(&self) -> OrdersApi<'_> {
        OrdersApi::new(&self.client)
    }

    pub fn shipping(&self) -> ShippingApi<'_> {
        ShippingApi::new(&self.client)
    }

    pub fn sections(&self) -> SectionsApi<'_> {
        SectionsApi::new(&self.client)
    }

    pub fn slides(&self) -> SlidesApi<'_> {
        SlidesApi::new(&self.client)
    }

    pub fn uploads(&self) -> UploadsApi<'_> {
        UploadsApi::new(&self.client)
    }
}

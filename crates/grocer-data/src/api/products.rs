//! Products endpoint, including the trash.

use crate::api::Resource;
use crate::{FetchClient, FetchError};
use grocer_commerce::catalog::{Product, ProductInput};
use grocer_commerce::ids::ProductId;
use grocer_commerce::search::{Filter, ListQuery, Page};
use tracing::info;

const PATH: &str = "products";

/// Typed access to `/products`.
pub struct ProductsApi<'a> {
    resource: Resource<'a, Product, ProductInput>,
}

impl<'a> ProductsApi<'a> {
    pub(crate) fn new(client: &'a FetchClient) -> Self {
        Self {
            resource: Resource::new(client, PATH),
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<Product>, FetchError> {
        self.resource.list(query).await
    }

    pub async fn get(&self, id: &ProductId) -> Result<Product, FetchError> {
        self.resource.get(id.as_str()).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Product, FetchError> {
        self.resource
            .client()
            .get(self.resource.sub_path(&format!("slug/{}", slug)))
            .send_record()
            .await
    }

    pub async fn create(&self, input: &ProductInput) -> Result<Product, FetchError> {
        self.resource.create(input).await
    }

    pub async fn update(&self, id: &ProductId, input: &ProductInput) -> Result<Product, FetchError> {
        self.resource.update(id.as_str(), input).await
    }

    /// Move a product to the trash.
    pub async fn delete(&self, id: &ProductId) -> Result<(), FetchError> {
        self.resource.delete(id.as_str()).await?;
        info!(product_id = %id, "product moved to trash");
        Ok(())
    }

    pub async fn reorder(&self, ids: &[ProductId]) -> Result<(), FetchError> {
        self.resource.reorder(ids).await
    }

    pub async fn check_slug(&self, slug: &str, exclude: Option<&ProductId>) -> Result<bool, FetchError> {
        self.resource
            .check_slug(slug, exclude.map(ProductId::as_str))
            .await
    }

    /// Products currently in the trash.
    pub async fn trash(&self, query: &ListQuery) -> Result<Page<Product>, FetchError> {
        let query = query.clone().with_filter(Filter::Trashed);
        self.resource.list(&query).await
    }

    /// Take a product back out of the trash.
    pub async fn restore(&self, id: &ProductId) -> Result<Product, FetchError> {
        self.resource
            .client()
            .post(self.resource.item_path(&format!("{}/restore", id)))
            .send_record()
            .await
    }

    /// Delete a trashed product for good.
    pub async fn purge(&self, id: &ProductId) -> Result<(), FetchError> {
        self.resource
            .client()
            .delete(self.resource.item_path(&format!("{}/permanent", id)))
            .send_empty()
            .await?;
        info!(product_id = %id, "product purged");
        Ok(())
    }

    /// Purge everything in the trash.
    pub async fn empty_trash(&self) -> Result<(), FetchError> {
        self.resource
            .client()
            .delete(self.resource.sub_path("trash"))
            .send_empty()
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::MockTransport;
    use crate::{ApiClient, FetchClient, Method};
    use grocer_commerce::ids::ProductId;
    use grocer_commerce::search::{Filter, ListQuery};
    use serde_json::json;
    use std::sync::Arc;

    fn api(mock: &MockTransport) -> ApiClient {
        ApiClient::new(FetchClient::new(Arc::new(mock.clone()), "http://api.test/v1"))
    }

    #[tokio::test]
    async fn test_list_sends_query_and_decodes_page() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "/v1/products",
            200,
            json!({"data": [{"id": "p1", "name": "Riz", "price": 12500}], "total": 1, "page": 1, "limit": 24}),
        );
        let api = api(&mock);
        let query = ListQuery::new()
            .with_filter(Filter::category("c1"))
            .with_search("riz");
        let page = api.products().list(&query).await.unwrap();

        assert_eq!(page.items[0].name, "Riz");
        let sent = &mock.requests()[0];
        assert_eq!(sent.query_param("category_id").as_deref(), Some("c1"));
        assert_eq!(sent.query_param("search").as_deref(), Some("riz"));
        assert_eq!(sent.query_param("limit").as_deref(), Some("24"));
    }

    #[tokio::test]
    async fn test_check_slug_excludes_current_row() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/v1/products/check-slug", 200, json!({"available": false}));
        let available = api(&mock)
            .products()
            .check_slug("riz-5kg", Some(&ProductId::new("p1")))
            .await
            .unwrap();

        assert!(!available);
        let sent = &mock.requests()[0];
        assert_eq!(sent.query_param("slug").as_deref(), Some("riz-5kg"));
        assert_eq!(sent.query_param("exclude_id").as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_trash_restore_and_purge() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/v1/products", 200, json!([]))
            .respond(
                Method::Post,
                "/v1/products/p1/restore",
                200,
                json!({"id": "p1", "name": "Riz", "price": 12500}),
            )
            .respond(Method::Delete, "/v1/products/p2/permanent", 204, json!(null));
        let api = api(&mock);

        api.products().trash(&ListQuery::new()).await.unwrap();
        assert_eq!(mock.requests()[0].query_param("trashed").as_deref(), Some("true"));

        let restored = api.products().restore(&ProductId::new("p1")).await.unwrap();
        assert!(restored.deleted_at.is_none());
        api.products().purge(&ProductId::new("p2")).await.unwrap();
    }

    #[tokio::test]
    async fn test_reorder_sends_full_id_list() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/v1/products/reorder", 200, json!({"ok": true}));
        let ids = vec![ProductId::new("b"), ProductId::new("a")];
        api(&mock).products().reorder(&ids).await.unwrap();
        assert_eq!(
            mock.requests()[0].json_body().unwrap(),
            json!({"ids": ["b", "a"]})
        );
    }
}

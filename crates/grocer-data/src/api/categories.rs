//! Categories endpoint.

use crate::api::Resource;
use crate::{FetchClient, FetchError};
use grocer_commerce::catalog::{Category, CategoryInput};
use grocer_commerce::ids::CategoryId;

/// Typed access to `/categories`.
pub struct CategoriesApi<'a> {
    resource: Resource<'a, Category, CategoryInput>,
}

impl<'a> CategoriesApi<'a> {
    pub(crate) fn new(client: &'a FetchClient) -> Self {
        Self {
            resource: Resource::new(client, "categories"),
        }
    }

    /// Every category, in display order.
    pub async fn list(&self) -> Result<Vec<Category>, FetchError> {
        let mut all = self.resource.list_all().await?;
        all.sort_by_key(|c| c.display_order);
        Ok(all)
    }

    pub async fn get(&self, id: &CategoryId) -> Result<Category, FetchError> {
        self.resource.get(id.as_str()).await
    }

    pub async fn create(&self, input: &CategoryInput) -> Result<Category, FetchError> {
        self.resource.create(input).await
    }

    pub async fn update(&self, id: &CategoryId, input: &CategoryInput) -> Result<Category, FetchError> {
        self.resource.update(id.as_str(), input).await
    }

    pub async fn delete(&self, id: &CategoryId) -> Result<(), FetchError> {
        self.resource.delete(id.as_str()).await
    }

    pub async fn reorder(&self, ids: &[CategoryId]) -> Result<(), FetchError> {
        self.resource.reorder(ids).await
    }

    pub async fn check_slug(&self, slug: &str, exclude: Option<&CategoryId>) -> Result<bool, FetchError> {
        self.resource
            .check_slug(slug, exclude.map(CategoryId::as_str))
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::MockTransport;
    use crate::{ApiClient, ApiErrorCode, FetchClient, Method};
    use grocer_commerce::catalog::CategoryInput;
    use grocer_commerce::ids::CategoryId;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_sorted_by_display_order() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "/categories",
            200,
            json!([
                {"id": "c2", "name": "Drinks", "display_order": 2},
                {"id": "c1", "name": "Fruit", "display_order": 1}
            ]),
        );
        let api = ApiClient::new(FetchClient::new(Arc::new(mock), "http://api.test"));
        let names: Vec<String> = api
            .categories()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Fruit", "Drinks"]);
    }

    #[tokio::test]
    async fn test_update_sends_only_set_fields() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Patch,
            "/categories/c1",
            409,
            json!({"message": "Slug already exists"}),
        );
        let api = ApiClient::new(FetchClient::new(Arc::new(mock.clone()), "http://api.test"));
        let input = CategoryInput {
            slug: Some("fruit".into()),
            ..Default::default()
        };
        let err = api
            .categories()
            .update(&CategoryId::new("c1"), &input)
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(ApiErrorCode::SlugTaken));
        assert_eq!(mock.requests()[0].json_body().unwrap(), json!({"slug": "fruit"}));
    }
}

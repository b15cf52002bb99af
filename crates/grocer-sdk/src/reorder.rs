//! Optimistic reordering of display lists.

use crate::StorefrontError;
use async_trait::async_trait;
use grocer_commerce::ids::{CategoryId, LocationId, ProductId, SectionId, SlideId};
use grocer_commerce::reorder::{move_item, ordered_ids, Positioned};
use grocer_data::{ApiClient, FetchError};
use tracing::{debug, warn};

/// Persists a full display order.
#[async_trait]
pub trait Reorderer<Id: Sync>: Send + Sync {
    async fn reorder(&self, ids: &[Id]) -> Result<(), FetchError>;
}

macro_rules! api_reorderer {
    ($id:ty, $api:ident) => {
        #[async_trait]
        impl Reorderer<$id> for ApiClient {
            async fn reorder(&self, ids: &[$id]) -> Result<(), FetchError> {
                self.$api().reorder(ids).await
            }
        }
    };
}

api_reorderer!(ProductId, products);
api_reorderer!(CategoryId, categories);
api_reorderer!(SectionId, sections);
api_reorderer!(SlideId, slides);
api_reorderer!(LocationId, shipping);

/// A local list whose order is sent to the backend after each move.
#[derive(Debug, Clone)]
pub struct ReorderController<T> {
    items: Vec<T>,
}

impl<T> ReorderController<T>
where
    T: Positioned + Clone + Send + Sync,
    T::Id: Send + Sync,
{
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Move `from` to `to`, then send the new order.
    ///
    /// The move shows immediately; if the call fails the previous order is
    /// put back and the error returned.
    pub async fn move_item<R>(&mut self, from: usize, to: usize, reorderer: &R) -> Result<(), StorefrontError>
    where
        R: Reorderer<T::Id> + ?Sized,
    {
        let previous = self.items.clone();
        move_item(&mut self.items, from, to)?;
        if from == to {
            return Ok(());
        }

        let ids = ordered_ids(&self.items);
        match reorderer.reorder(&ids).await {
            Ok(()) => {
                debug!(from, to, "display order saved");
                Ok(())
            }
            Err(e) => {
                warn!(from, to, error = %e, "reorder failed, restoring previous order");
                self.items = previous;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocer_commerce::catalog::Category;
    use grocer_commerce::CommerceError;
    use grocer_data::mock::MockTransport;
    use grocer_data::{FetchClient, Method};
    use serde_json::json;
    use std::sync::Arc;

    fn categories() -> Vec<Category> {
        ["fruits", "legumes", "epicerie"]
            .into_iter()
            .map(|slug| serde_json::from_value(json!({"id": slug, "name": slug, "slug": slug})).unwrap())
            .collect()
    }

    fn slugs(controller: &ReorderController<Category>) -> Vec<&str> {
        controller.items().iter().map(|c| c.slug.as_str()).collect()
    }

    fn api(mock: &MockTransport) -> ApiClient {
        ApiClient::new(FetchClient::new(Arc::new(mock.clone()), "https://api.test"))
    }

    #[tokio::test]
    async fn test_move_sends_full_order() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/categories/reorder", 200, json!({}));
        let mut controller = ReorderController::new(categories());

        controller.move_item(2, 0, &api(&mock)).await.unwrap();

        assert_eq!(slugs(&controller), vec!["epicerie", "fruits", "legumes"]);
        assert_eq!(
            mock.requests()[0].json_body().unwrap(),
            json!({"ids": ["epicerie", "fruits", "legumes"]})
        );
    }

    #[tokio::test]
    async fn test_failure_rolls_back() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/categories/reorder", 500, json!({"message": "boom"}));
        let mut controller = ReorderController::new(categories());

        assert!(controller.move_item(0, 2, &api(&mock)).await.is_err());
        assert_eq!(slugs(&controller), vec!["fruits", "legumes", "epicerie"]);
    }

    #[tokio::test]
    async fn test_out_of_range_sends_nothing() {
        let mock = MockTransport::new();
        let mut controller = ReorderController::new(categories());

        let err = controller.move_item(0, 9, &api(&mock)).await.unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::Commerce(CommerceError::PositionOutOfRange { index: 9, len: 3 })
        ));
        assert_eq!(mock.request_count(), 0);
    }
}

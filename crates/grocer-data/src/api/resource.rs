//! CRUD operations shared by every collection endpoint.

use crate::{FetchClient, FetchError};
use grocer_commerce::search::{ListQuery, Page};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Body of a reorder call.
#[derive(Debug, Serialize)]
struct ReorderBody<'a, Id> {
    ids: &'a [Id],
}

#[derive(Debug, Deserialize)]
struct SlugAvailability {
    available: bool,
}

/// A REST collection of `T` rows written with `I` payloads.
pub struct Resource<'a, T, I> {
    client: &'a FetchClient,
    path: &'static str,
    _types: PhantomData<fn() -> (T, I)>,
}

impl<'a, T, I> Resource<'a, T, I>
where
    T: DeserializeOwned,
    I: Serialize,
{
    pub(crate) fn new(client: &'a FetchClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            _types: PhantomData,
        }
    }

    pub(crate) fn client(&self) -> &'a FetchClient {
        self.client
    }

    pub(crate) fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }

    pub(crate) fn sub_path(&self, action: &str) -> String {
        format!("{}/{}", self.path, action)
    }

    /// `GET /{path}` with filter, sort and paging parameters.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<T>, FetchError> {
        self.client
            .get(self.path)
            .query_pairs(query.to_query_pairs())
            .send_ok()
            .await?
            .page()
    }

    /// `GET /{path}` without parameters.
    pub async fn list_all(&self) -> Result<Vec<T>, FetchError> {
        Ok(self.client.get(self.path).send_ok().await?.page::<T>()?.items)
    }

    pub async fn get(&self, id: &str) -> Result<T, FetchError> {
        self.client.get(self.item_path(id)).send_record().await
    }

    pub async fn create(&self, input: &I) -> Result<T, FetchError> {
        self.client.post(self.path).json(input).send_record().await
    }

    /// Partial update: only the fields set in `input` change.
    pub async fn update(&self, id: &str, input: &I) -> Result<T, FetchError> {
        self.client
            .patch(self.item_path(id))
            .json(input)
            .send_record()
            .await
    }

    /// Full replacement.
    pub async fn replace(&self, id: &str, input: &I) -> Result<T, FetchError> {
        self.client
            .put(self.item_path(id))
            .json(input)
            .send_record()
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), FetchError> {
        self.client.delete(self.item_path(id)).send_empty().await
    }

    /// Persist a new display order: `ids` lists every row, first to last.
    pub async fn reorder<Id: Serialize + Sync>(&self, ids: &[Id]) -> Result<(), FetchError> {
        self.client
            .post(self.sub_path("reorder"))
            .json(&ReorderBody { ids })
            .send_empty()
            .await
    }

    /// Whether `slug` is free, ignoring the row `exclude_id` (the one being
    /// edited).
    pub async fn check_slug(&self, slug: &str, exclude_id: Option<&str>) -> Result<bool, FetchError> {
        let mut request = self.client.get(self.sub_path("check-slug")).query("slug", slug);
        if let Some(id) = exclude_id {
            request = request.query("exclude_id", id);
        }
        let answer: SlugAvailability = request.send_record().await?;
        Ok(answer.available)
    }
}

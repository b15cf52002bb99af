//! Homepage sections and hero slides.

use crate::api::Resource;
use crate::{FetchClient, FetchError};
use grocer_commerce::content::{HeroSlide, HomepageSection, SectionInput, SlideInput};
use grocer_commerce::ids::{SectionId, SlideId};

/// Typed access to `/homepage-sections`.
pub struct SectionsApi<'a> {
    resource: Resource<'a, HomepageSection, SectionInput>,
}

impl<'a> SectionsApi<'a> {
    pub(crate) fn new(client: &'a FetchClient) -> Self {
        Self {
            resource: Resource::new(client, "homepage-sections"),
        }
    }

    pub async fn list(&self) -> Result<Vec<HomepageSection>, FetchError> {
        let mut all = self.resource.list_all().await?;
        all.sort_by_key(|s| s.display_order);
        Ok(all)
    }

    pub async fn get(&self, id: &SectionId) -> Result<HomepageSection, FetchError> {
        self.resource.get(id.as_str()).await
    }

    pub async fn create(&self, input: &SectionInput) -> Result<HomepageSection, FetchError> {
        self.resource.create(input).await
    }

    pub async fn update(&self, id: &SectionId, input: &SectionInput) -> Result<HomepageSection, FetchError> {
        self.resource.update(id.as_str(), input).await
    }

    pub async fn delete(&self, id: &SectionId) -> Result<(), FetchError> {
        self.resource.delete(id.as_str()).await
    }

    pub async fn reorder(&self, ids: &[SectionId]) -> Result<(), FetchError> {
        self.resource.reorder(ids).await
    }
}

/// Typed access to `/hero-slides`.
pub struct SlidesApi<'a> {
    resource: Resource<'a, HeroSlide, SlideInput>,
}

impl<'a> SlidesApi<'a> {
    pub(crate) fn new(client: &'a FetchClient) -> Self {
        Self {
            resource: Resource::new(client, "hero-slides"),
        }
    }

    pub async fn list(&self) -> Result<Vec<HeroSlide>, FetchError> {
        let mut all = self.resource.list_all().await?;
        all.sort_by_key(|s| s.display_order);
        Ok(all)
    }

    pub async fn get(&self, id: &SlideId) -> Result<HeroSlide, FetchError> {
        self.resource.get(id.as_str()).await
    }

    pub async fn create(&self, input: &SlideInput) -> Result<HeroSlide, FetchError> {
        self.resource.create(input).await
    }

    pub async fn update(&self, id: &SlideId, input: &SlideInput) -> Result<HeroSlide, FetchError> {
        self.resource.update(id.as_str(), input).await
    }

    /// Replace every field of a slide.
    pub async fn replace(&self, id: &SlideId, input: &SlideInput) -> Result<HeroSlide, FetchError> {
        self.resource.replace(id.as_str(), input).await
    }

    pub async fn delete(&self, id: &SlideId) -> Result<(), FetchError> {
        self.resource.delete(id.as_str()).await
    }

    pub async fn reorder(&self, ids: &[SlideId]) -> Result<(), FetchError> {
        self.resource.reorder(ids).await
    }
}

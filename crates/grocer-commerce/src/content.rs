//! Homepage layout content: sections and hero slides.

use crate::ids::{CategoryId, ProductId, SectionId, SlideId};
use serde::{Deserialize, Serialize};

/// What a homepage section renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Products from one category.
    #[default]
    Category,
    /// A hand-picked product list.
    Featured,
    /// Newest products.
    NewArrivals,
    /// Products with a compare-at price.
    Deals,
}

/// A block on the storefront homepage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HomepageSection {
    pub id: SectionId,
    pub title: String,
    #[serde(default, rename = "section_type")]
    pub kind: SectionKind,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A slide in the homepage hero carousel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeroSlide {
    pub id: SlideId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Payload for creating or patching a homepage section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SectionInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "section_type")]
    pub kind: Option<SectionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<Vec<ProductId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Payload for creating or patching a hero slide.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlideInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_decodes_wire_kind() {
        let json = r#"{"id":"s1","title":"Fresh fruit","section_type":"category","category_id":"c1"}"#;
        let section: HomepageSection = serde_json::from_str(json).unwrap();
        assert_eq!(section.kind, SectionKind::Category);
        assert_eq!(section.category_id, Some(CategoryId::new("c1")));
        assert!(section.is_active);
    }
}

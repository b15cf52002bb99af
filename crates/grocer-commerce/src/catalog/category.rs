//! Category types for product organization.

use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Parent category ID (None for root categories).
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    /// Category name.
    pub name: String,
    /// URL-friendly slug.
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Sort order position within parent.
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Category {
    /// Create a new root category.
    pub fn new_root(id: impl Into<CategoryId>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: name.into(),
            slug: slug.into(),
            description: None,
            image_url: None,
            display_order: 0,
            is_active: true,
        }
    }

    /// Check if this is a root category.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Children of `parent` among `all`, in display order.
    pub fn children_of<'a>(all: &'a [Category], parent: &CategoryId) -> Vec<&'a Category> {
        let mut children: Vec<&Category> = all
            .iter()
            .filter(|c| c.parent_id.as_ref() == Some(parent))
            .collect();
        children.sort_by_key(|c| c.display_order);
        children
    }
}

/// Payload for creating or patching a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_sorted_by_display_order() {
        let root = Category::new_root("c0", "Produce", "produce");
        let mut fruit = Category::new_root("c1", "Fruit", "fruit");
        fruit.parent_id = Some(root.id.clone());
        fruit.display_order = 2;
        let mut veg = Category::new_root("c2", "Vegetables", "vegetables");
        veg.parent_id = Some(root.id.clone());
        veg.display_order = 1;

        let all = vec![root.clone(), fruit, veg];
        let names: Vec<_> = Category::children_of(&all, &root.id)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Vegetables", "Fruit"]);
        assert!(root.is_root());
    }

    #[test]
    fn test_decode_with_defaults() {
        let c: Category = serde_json::from_str(r#"{"id":"c9","name":"Drinks"}"#).unwrap();
        assert!(c.is_active);
        assert_eq!(c.display_order, 0);
    }
}

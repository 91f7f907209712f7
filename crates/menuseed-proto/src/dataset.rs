//! Local catalog dataset.
//!
//! Menu items point at their category and customizations by name rather than
//! by identifier. Those names are resolved against rows created earlier in the
//! same seed run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A menu category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Display name, unique within a dataset.
    pub name: String,
    /// Short description shown under the category header.
    pub description: String,
}

impl Category {
    /// Create a new category.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Kind of add-on a customization represents.
///
/// Unknown kinds are kept verbatim so datasets can introduce new ones without a
/// code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CustomizationKind {
    Topping,
    Side,
    Size,
    Crust,
    Bread,
    Spice,
    Base,
    Sauce,
    Other(String),
}

impl CustomizationKind {
    /// The string stored in the remote `type` column.
    pub fn as_str(&self) -> &str {
        match self {
            CustomizationKind::Topping => "topping",
            CustomizationKind::Side => "side",
            CustomizationKind::Size => "size",
            CustomizationKind::Crust => "crust",
            CustomizationKind::Bread => "bread",
            CustomizationKind::Spice => "spice",
            CustomizationKind::Base => "base",
            CustomizationKind::Sauce => "sauce",
            CustomizationKind::Other(kind) => kind,
        }
    }
}

impl From<String> for CustomizationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "topping" => CustomizationKind::Topping,
            "side" => CustomizationKind::Side,
            "size" => CustomizationKind::Size,
            "crust" => CustomizationKind::Crust,
            "bread" => CustomizationKind::Bread,
            "spice" => CustomizationKind::Spice,
            "base" => CustomizationKind::Base,
            "sauce" => CustomizationKind::Sauce,
            _ => CustomizationKind::Other(value),
        }
    }
}

impl From<&str> for CustomizationKind {
    fn from(value: &str) -> Self {
        CustomizationKind::from(value.to_string())
    }
}

impl From<CustomizationKind> for String {
    fn from(kind: CustomizationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for CustomizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An add-on that can be attached to menu items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customization {
    /// Display name, unique within a dataset.
    pub name: String,
    /// Surcharge added to the item price.
    pub price: f64,
    /// Add-on kind.
    #[serde(rename = "type")]
    pub kind: CustomizationKind,
}

impl Customization {
    /// Create a new customization.
    pub fn new(name: impl Into<String>, price: f64, kind: impl Into<CustomizationKind>) -> Self {
        Self {
            name: name.into(),
            price,
            kind: kind.into(),
        }
    }
}

/// A sellable menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub description: String,
    /// Source image. Replaced by a blob-store URL when the asset migrates.
    pub image_url: String,
    pub price: f64,
    pub rating: f64,
    pub calories: f64,
    /// Grams of protein.
    pub protein: f64,
    /// Name of the owning category.
    pub category_name: String,
    /// Names of the customizations offered with this item, in display order.
    #[serde(rename = "customizations", default)]
    pub customization_names: Vec<String>,
}

impl MenuItem {
    /// Create a menu item with zeroed nutrition and no customizations.
    pub fn new(
        name: impl Into<String>,
        category_name: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            image_url: image_url.into(),
            price: 0.0,
            rating: 0.0,
            calories: 0.0,
            protein: 0.0,
            category_name: category_name.into(),
            customization_names: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// Set the rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Set calories and protein.
    pub fn with_nutrition(mut self, calories: f64, protein: f64) -> Self {
        self.calories = calories;
        self.protein = protein;
        self
    }

    /// Append a customization by name.
    pub fn with_customization(mut self, name: impl Into<String>) -> Self {
        self.customization_names.push(name.into());
        self
    }
}

/// The complete local catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub customizations: Vec<Customization>,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
}

impl Dataset {
    /// Number of (menu item, customization) pairs declared across the menu.
    pub fn declared_links(&self) -> usize {
        self.menu.iter().map(|item| item.customization_names.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customization_kind_roundtrip() {
        assert_eq!(CustomizationKind::from("topping"), CustomizationKind::Topping);
        assert_eq!(
            CustomizationKind::from("drizzle"),
            CustomizationKind::Other("drizzle".to_string())
        );
        assert_eq!(String::from(CustomizationKind::Crust), "crust");
        assert_eq!(CustomizationKind::Other("drizzle".into()).as_str(), "drizzle");
    }

    #[test]
    fn test_menu_item_json_uses_customizations_key() {
        let json = r#"{
            "name": "Classic Burger",
            "description": "Beef patty",
            "image_url": "https://cdn.example.com/burger.png",
            "price": 9.5,
            "rating": 4.5,
            "calories": 550,
            "protein": 25,
            "category_name": "Burgers",
            "customizations": ["Extra Cheese", "Fries"]
        }"#;

        let item: MenuItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.customization_names, vec!["Extra Cheese", "Fries"]);
        assert_eq!(item.category_name, "Burgers");
        assert_eq!(item.calories, 550.0);
    }

    #[test]
    fn test_menu_item_fractional_nutrition() {
        let json = r#"{
            "name": "Veggie Wrap",
            "description": "",
            "image_url": "wrap.png",
            "price": 7.0,
            "rating": 4.1,
            "calories": 410.5,
            "protein": 22.5,
            "category_name": "Wraps"
        }"#;

        let item: MenuItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.calories, 410.5);
        assert_eq!(item.protein, 22.5);
        assert!(item.customization_names.is_empty());
    }

    #[test]
    fn test_customization_type_key() {
        let json = r#"{"name": "Extra Cheese", "price": 0.5, "type": "topping"}"#;
        let customization: Customization = serde_json::from_str(json).unwrap();
        assert_eq!(customization.kind, CustomizationKind::Topping);

        let encoded = serde_json::to_value(&customization).unwrap();
        assert_eq!(encoded["type"], "topping");
    }

    #[test]
    fn test_declared_links() {
        let dataset = Dataset {
            menu: vec![
                MenuItem::new("A", "Burgers", "a.png")
                    .with_customization("Extra Cheese")
                    .with_customization("Fries"),
                MenuItem::new("B", "Burgers", "b.png").with_customization("Fries"),
            ],
            ..Dataset::default()
        };
        assert_eq!(dataset.declared_links(), 3);
    }
}

//! Dataset loading and validation.
//!
//! Validation rejects datasets whose name maps would be ambiguous. Dangling
//! soft references are not errors; [`dangling_references`] lists them so the
//! caller can report them before a run.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use menuseed_proto::Dataset;

use crate::error::DatasetError;

/// Dataset bundled with the crate.
const SAMPLE_DATASET: &str = include_str!("../data/menu.json");

/// A menu item reference that names no entity in the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DanglingReference {
    /// The item's category is not declared.
    Category { item: String, category: String },
    /// One of the item's customizations is not declared.
    Customization { item: String, customization: String },
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DanglingReference::Category { item, category } => {
                write!(f, "menu item {:?} references unknown category {:?}", item, category)
            }
            DanglingReference::Customization { item, customization } => write!(
                f,
                "menu item {:?} references unknown customization {:?}",
                item, customization
            ),
        }
    }
}

/// Parse and validate a dataset from JSON text.
pub fn parse_dataset(json: &str) -> Result<Dataset, DatasetError> {
    let dataset: Dataset = serde_json::from_str(json)?;
    validate(&dataset)?;
    Ok(dataset)
}

/// Read, parse and validate a dataset file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dataset(&json)
}

/// The bundled sample dataset.
pub fn sample_dataset() -> Result<Dataset, DatasetError> {
    parse_dataset(SAMPLE_DATASET)
}

/// Check names and numbers.
///
/// Prices, calories and protein must be finite and non-negative; ratings finite.
pub fn validate(dataset: &Dataset) -> Result<(), DatasetError> {
    check_names("category", dataset.categories.iter().map(|c| c.name.as_str()), true)?;
    check_names(
        "customization",
        dataset.customizations.iter().map(|c| c.name.as_str()),
        true,
    )?;
    check_names("menu item", dataset.menu.iter().map(|m| m.name.as_str()), false)?;

    for customization in &dataset.customizations {
        check_amount("customization", &customization.name, "price", customization.price, true)?;
    }
    for item in &dataset.menu {
        check_amount("menu item", &item.name, "price", item.price, true)?;
        check_amount("menu item", &item.name, "rating", item.rating, false)?;
        check_amount("menu item", &item.name, "calories", item.calories, true)?;
        check_amount("menu item", &item.name, "protein", item.protein, true)?;
    }

    Ok(())
}

/// Soft references that will not resolve during a run, in dataset order.
pub fn dangling_references(dataset: &Dataset) -> Vec<DanglingReference> {
    let categories: HashSet<&str> = dataset.categories.iter().map(|c| c.name.as_str()).collect();
    let customizations: HashSet<&str> = dataset
        .customizations
        .iter()
        .map(|c| c.name.as_str())
        .collect();

    let mut dangling = Vec::new();
    for item in &dataset.menu {
        if !categories.contains(item.category_name.as_str()) {
            dangling.push(DanglingReference::Category {
                item: item.name.clone(),
                category: item.category_name.clone(),
            });
        }
        for name in &item.customization_names {
            if !customizations.contains(name.as_str()) {
                dangling.push(DanglingReference::Customization {
                    item: item.name.clone(),
                    customization: name.clone(),
                });
            }
        }
    }
    dangling
}

fn check_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
    unique: bool,
) -> Result<(), DatasetError> {
    let mut seen = HashSet::new();
    for (index, name) in names.enumerate() {
        if name.trim().is_empty() {
            return Err(DatasetError::EmptyName { kind, index });
        }
        if unique && !seen.insert(name) {
            return Err(DatasetError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn check_amount(
    kind: &'static str,
    name: &str,
    field: &'static str,
    value: f64,
    non_negative: bool,
) -> Result<(), DatasetError> {
    if !value.is_finite() || (non_negative && value < 0.0) {
        return Err(DatasetError::InvalidNumber {
            kind,
            name: name.to_string(),
            field,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuseed_proto::{Category, Customization, MenuItem};

    fn dataset() -> Dataset {
        Dataset {
            categories: vec![Category::new("Burgers", "Grilled")],
            customizations: vec![Customization::new("Extra Cheese", 0.5, "topping")],
            menu: vec![MenuItem::new("Classic Burger", "Burgers", "https://cdn.test/b.png")
                .with_customization("Extra Cheese")],
        }
    }

    #[test]
    fn test_sample_dataset_is_consistent() {
        let sample = sample_dataset().unwrap();
        assert!(!sample.categories.is_empty());
        assert!(!sample.customizations.is_empty());
        assert!(!sample.menu.is_empty());
        assert!(dangling_references(&sample).is_empty());
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let mut data = dataset();
        data.categories.push(Category::new("Burgers", "Again"));

        let err = validate(&data).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateName { kind: "category", ref name } if name == "Burgers"));
    }

    #[test]
    fn test_duplicate_customization_rejected() {
        let mut data = dataset();
        data.customizations.push(Customization::new("Extra Cheese", 1.0, "topping"));
        assert!(matches!(
            validate(&data),
            Err(DatasetError::DuplicateName { kind: "customization", .. })
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut data = dataset();
        data.menu.push(MenuItem::new("  ", "Burgers", "x.png"));
        assert!(matches!(
            validate(&data),
            Err(DatasetError::EmptyName { kind: "menu item", index: 1 })
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut data = dataset();
        data.customizations[0].price = -1.0;
        assert!(matches!(
            validate(&data),
            Err(DatasetError::InvalidNumber { field: "price", .. })
        ));
    }

    #[test]
    fn test_fractional_nutrition_accepted() {
        let json = r#"{
            "categories": [{"name": "Wraps", "description": ""}],
            "menu": [{
                "name": "Veggie Wrap",
                "description": "",
                "image_url": "wrap.png",
                "price": 7.0,
                "rating": 4.1,
                "calories": 410,
                "protein": 22.5,
                "category_name": "Wraps"
            }]
        }"#;

        let data = parse_dataset(json).unwrap();
        assert_eq!(data.menu[0].protein, 22.5);
        assert_eq!(data.menu[0].calories, 410.0);
    }

    #[test]
    fn test_negative_nutrition_rejected() {
        let mut data = dataset();
        data.menu[0].protein = -3.0;
        assert!(matches!(
            validate(&data),
            Err(DatasetError::InvalidNumber { field: "protein", .. })
        ));

        data.menu[0].protein = 10.0;
        data.menu[0].calories = f64::NAN;
        assert!(matches!(
            validate(&data),
            Err(DatasetError::InvalidNumber { field: "calories", .. })
        ));
    }

    #[test]
    fn test_dangling_references_listed() {
        let mut data = dataset();
        data.menu.push(
            MenuItem::new("Mystery Meal", "Specials", "m.png")
                .with_customization("Extra Cheese")
                .with_customization("Truffle Oil"),
        );

        let dangling = dangling_references(&data);
        assert_eq!(
            dangling,
            vec![
                DanglingReference::Category {
                    item: "Mystery Meal".into(),
                    category: "Specials".into(),
                },
                DanglingReference::Customization {
                    item: "Mystery Meal".into(),
                    customization: "Truffle Oil".into(),
                },
            ]
        );
        assert!(validate(&data).is_ok());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_dataset("{\"categories\": 3}"),
            Err(DatasetError::Parse(_))
        ));
    }

    #[test]
    fn test_load_dataset_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.json");
        std::fs::write(&path, serde_json::to_string(&dataset()).unwrap()).unwrap();

        let loaded = load_dataset(&path).unwrap();
        assert_eq!(loaded, dataset());

        let missing = load_dataset(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, DatasetError::Io { .. }));
    }
}

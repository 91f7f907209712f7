//! Seed orchestrator.
//!
//! A run moves through [`Phase`]s in a fixed order: the catalog is cleared,
//! then categories, customizations and menu items are created. Dataset entities
//! reference each other by name; each phase records the identifiers the store
//! assigned so later phases can resolve those names.
//!
//! Row creation is fail-fast. Image migration and unknown customization names
//! are fail-soft: they are logged, counted and skipped.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use menuseed_client::{CatalogStore, RowStore};
use menuseed_proto::{Dataset, Fields, MenuItem, RowId, TableRef};

use crate::asset::{AssetFetcher, AssetMigration, AssetMigrator};
use crate::config::SeedConfig;
use crate::error::{AssetMigrationError, SeedError};
use crate::reset::{CatalogReset, ResetSummary};

/// Stage of a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Reset,
    PopulateCategories,
    PopulateCustomizations,
    PopulateMenu,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Reset => "reset",
            Phase::PopulateCategories => "populate_categories",
            Phase::PopulateCustomizations => "populate_customizations",
            Phase::PopulateMenu => "populate_menu",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Rows and files removed before populating.
    pub reset: ResetSummary,
    /// Category rows created.
    pub categories: usize,
    /// Customization rows created.
    pub customizations: usize,
    /// Menu rows created.
    pub menu_items: usize,
    /// Junction rows created.
    pub links: usize,
    /// Customization references that named no known customization.
    pub links_skipped: usize,
    pub images_migrated: usize,
    pub images_fallback: usize,
    /// Menu items whose category did not resolve.
    pub unresolved_categories: usize,
}

/// Name to identifier map built during one run.
type NameMap = HashMap<String, String>;

/// Runs the seed pipeline against a catalog store.
pub struct Seeder {
    store: Arc<dyn CatalogStore>,
    migrator: AssetMigrator,
    dataset: Dataset,
    config: SeedConfig,
    run_lock: Mutex<()>,
}

impl Seeder {
    /// Create a seeder for `dataset`.
    ///
    /// `fetcher` is unused when image migration is turned off in `config`.
    pub fn new(
        store: Arc<dyn CatalogStore>,
        fetcher: Arc<dyn AssetFetcher>,
        dataset: Dataset,
        config: SeedConfig,
    ) -> Self {
        let migrator = if config.migrate_images {
            AssetMigrator::new(store.clone(), fetcher, config.bucket.clone())
        } else {
            AssetMigrator::disabled(store.clone(), config.bucket.clone())
        };

        Self {
            store,
            migrator,
            dataset,
            config,
            run_lock: Mutex::new(()),
        }
    }

    /// The dataset this seeder populates.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Replace the catalog contents with the dataset.
    ///
    /// Concurrent calls on the same seeder run one after the other.
    pub async fn run(&self) -> Result<SeedSummary, SeedError> {
        let _guard = self.run_lock.lock().await;

        info!(
            categories = self.dataset.categories.len(),
            customizations = self.dataset.customizations.len(),
            menu_items = self.dataset.menu.len(),
            "seed run started"
        );

        match self.run_phases().await {
            Ok(summary) => {
                info!(
                    phase = %Phase::Done,
                    categories = summary.categories,
                    customizations = summary.customizations,
                    menu_items = summary.menu_items,
                    links = summary.links,
                    links_skipped = summary.links_skipped,
                    images_migrated = summary.images_migrated,
                    images_fallback = summary.images_fallback,
                    "seed run complete"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(phase = %e.phase(), error = %e, "seed run aborted");
                Err(e)
            }
        }
    }

    async fn run_phases(&self) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();

        info!(phase = %Phase::Reset, "clearing catalog");
        summary.reset = CatalogReset::new(self.store.as_ref(), &self.config.reset)
            .reset(&self.config.tables.all(), &self.config.bucket)
            .await?;

        let categories = self.populate_categories().await?;
        summary.categories = categories.len();

        let customizations = self.populate_customizations().await?;
        summary.customizations = customizations.len();

        self.populate_menu(&categories, &customizations, &mut summary)
            .await?;

        Ok(summary)
    }

    async fn populate_categories(&self) -> Result<NameMap, SeedError> {
        let phase = Phase::PopulateCategories;
        let table = &self.config.tables.categories;
        info!(phase = %phase, count = self.dataset.categories.len(), "creating categories");

        let mut ids = NameMap::new();
        for category in &self.dataset.categories {
            let mut fields = Fields::new();
            fields.insert("name".into(), json!(category.name));
            fields.insert("description".into(), json!(category.description));

            let id = self.create(phase, table, &category.name, fields).await?;
            ids.insert(category.name.clone(), id);
        }
        Ok(ids)
    }

    async fn populate_customizations(&self) -> Result<NameMap, SeedError> {
        let phase = Phase::PopulateCustomizations;
        let table = &self.config.tables.customizations;
        info!(phase = %phase, count = self.dataset.customizations.len(), "creating customizations");

        let mut ids = NameMap::new();
        for customization in &self.dataset.customizations {
            let mut fields = Fields::new();
            fields.insert("name".into(), json!(customization.name));
            fields.insert("price".into(), number(customization.price));
            fields.insert("type".into(), json!(customization.kind.as_str()));

            let id = self
                .create(phase, table, &customization.name, fields)
                .await?;
            ids.insert(customization.name.clone(), id);
        }
        Ok(ids)
    }

    async fn populate_menu(
        &self,
        categories: &NameMap,
        customizations: &NameMap,
        summary: &mut SeedSummary,
    ) -> Result<(), SeedError> {
        let phase = Phase::PopulateMenu;
        let tables = &self.config.tables;
        info!(phase = %phase, count = self.dataset.menu.len(), "creating menu items");

        for item in &self.dataset.menu {
            let image = self.migrator.migrate(&item.image_url).await;
            match &image {
                AssetMigration::Migrated { file_id, .. } => {
                    info!(phase = %phase, entity = %item.name, file_id = %file_id, "image migrated");
                    summary.images_migrated += 1;
                }
                AssetMigration::Fallback {
                    reason: AssetMigrationError::Disabled,
                    ..
                } => {
                    debug!(phase = %phase, entity = %item.name, "image migration disabled, keeping source URL");
                    summary.images_fallback += 1;
                }
                AssetMigration::Fallback { url, reason } => {
                    warn!(
                        phase = %phase,
                        entity = %item.name,
                        url = %url,
                        reason = %reason,
                        "image not migrated, keeping source URL"
                    );
                    summary.images_fallback += 1;
                }
            }

            let category_id = categories.get(&item.category_name).map(String::as_str);
            if category_id.is_none() {
                warn!(
                    phase = %phase,
                    entity = %item.name,
                    category = %item.category_name,
                    "category not found, leaving menu item uncategorized"
                );
                summary.unresolved_categories += 1;
            }

            let fields = menu_fields(item, image.url(), category_id, &self.config.rating_column);
            let menu_id = self.create(phase, &tables.menu, &item.name, fields).await?;
            summary.menu_items += 1;

            for name in &item.customization_names {
                let Some(customization_id) = customizations.get(name) else {
                    warn!(
                        phase = %phase,
                        entity = %item.name,
                        customization = %name,
                        "customization not found"
                    );
                    summary.links_skipped += 1;
                    continue;
                };

                let mut fields = Fields::new();
                fields.insert("menu".into(), json!(menu_id));
                fields.insert("customizations".into(), json!(customization_id));
                self.create(phase, &tables.menu_customizations, &item.name, fields)
                    .await?;
                summary.links += 1;
            }
        }
        Ok(())
    }

    /// Create one row and return its identifier.
    async fn create(
        &self,
        phase: Phase,
        table: &TableRef,
        name: &str,
        fields: Fields,
    ) -> Result<String, SeedError> {
        match self.store.create_row(table, RowId::Unique, fields).await {
            Ok(row) => {
                info!(phase = %phase, table = %table, entity = name, id = %row.id, "row created");
                Ok(row.id)
            }
            Err(source) => {
                error!(phase = %phase, table = %table, entity = name, error = %source, "row creation failed");
                Err(SeedError::RowCreate {
                    phase,
                    table: table.clone(),
                    name: name.to_string(),
                    source,
                })
            }
        }
    }
}

/// Column values of a menu row.
///
/// The category column is left out when `category_id` is `None`.
pub fn menu_fields(
    item: &MenuItem,
    image_url: &str,
    category_id: Option<&str>,
    rating_column: &str,
) -> Fields {
    let mut fields = Fields::new();
    fields.insert("name".into(), json!(item.name));
    fields.insert("description".into(), json!(item.description));
    fields.insert("image_url".into(), json!(image_url));
    fields.insert("price".into(), number(item.price));
    fields.insert(rating_column.to_string(), number(item.rating));
    fields.insert("calories".into(), number(item.calories));
    fields.insert("protein".into(), number(item.protein));
    if let Some(id) = category_id {
        fields.insert("categories".into(), Value::String(id.to_string()));
    }
    fields
}

/// A JSON number, written without a fraction when the value is whole.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

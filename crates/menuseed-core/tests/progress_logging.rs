//! Per-entity progress events emitted during a seed run.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use menuseed_client::MemoryCatalog;
use menuseed_core::{
    AssetFetcher, AssetMigrationError, FetchedAsset, ResetConfig, SeedConfig, Seeder,
};
use menuseed_proto::{Category, Customization, Dataset, MenuItem};

struct PngFetcher;

#[async_trait]
impl AssetFetcher for PngFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedAsset, AssetMigrationError> {
        if url.contains("broken") {
            return Err(AssetMigrationError::Status(500));
        }
        Ok(FetchedAsset {
            data: Bytes::from_static(b"\x89PNG"),
            content_type: None,
        })
    }
}

#[derive(Debug, Clone)]
struct Recorded {
    level: Level,
    fields: HashMap<String, String>,
}

impl Recorded {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct FieldVisitor(HashMap<String, String>);

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

/// Records every event it sees.
#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    fn events(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    /// Whether an event at `level` carries every `(field, value)` pair.
    fn saw(&self, level: Level, pairs: &[(&str, &str)]) -> bool {
        self.events().iter().any(|event| {
            event.level == level
                && pairs
                    .iter()
                    .all(|(name, value)| event.field(name) == Some(*value))
        })
    }
}

impl<S: Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.0.lock().unwrap().push(Recorded {
            level: *event.metadata().level(),
            fields: visitor.0,
        });
    }
}

fn dataset() -> Dataset {
    Dataset {
        categories: vec![Category::new("Burgers", "")],
        customizations: vec![Customization::new("Extra Cheese", 0.5, "topping")],
        menu: vec![
            MenuItem::new("Classic Burger", "Burgers", "https://cdn.test/classic.png")
                .with_customization("Extra Cheese"),
            MenuItem::new("Smash Burger", "Burgers", "https://cdn.test/broken.png"),
        ],
    }
}

fn seeder(store: Arc<MemoryCatalog>) -> Seeder {
    let config =
        SeedConfig::default().with_reset(ResetConfig::default().with_backoff(std::time::Duration::ZERO));
    Seeder::new(store, Arc::new(PngFetcher), dataset(), config)
}

#[tokio::test]
async fn test_each_created_row_is_reported_at_info() {
    let recorder = Recorder::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(recorder.clone()));

    seeder(Arc::new(MemoryCatalog::new())).run().await.unwrap();

    for (phase, table, entity) in [
        ("populate_categories", "categories", "Burgers"),
        ("populate_customizations", "customizations", "Extra Cheese"),
        ("populate_menu", "menu", "Classic Burger"),
        ("populate_menu", "menu", "Smash Burger"),
        ("populate_menu", "menu_customizations", "Classic Burger"),
    ] {
        assert!(
            recorder.saw(
                Level::INFO,
                &[
                    ("message", "row created"),
                    ("phase", phase),
                    ("table", table),
                    ("entity", entity),
                ]
            ),
            "no row created event for {entity} in {table}"
        );
    }
}

#[tokio::test]
async fn test_image_outcomes_name_the_item() {
    let recorder = Recorder::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(recorder.clone()));

    seeder(Arc::new(MemoryCatalog::new())).run().await.unwrap();

    assert!(recorder.saw(
        Level::INFO,
        &[("message", "image migrated"), ("entity", "Classic Burger")]
    ));
    assert!(recorder.saw(
        Level::WARN,
        &[
            ("message", "image not migrated, keeping source URL"),
            ("entity", "Smash Burger"),
        ]
    ));
}

#[tokio::test]
async fn test_failed_row_is_reported_with_entity() {
    let recorder = Recorder::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(recorder.clone()));

    let store = Arc::new(MemoryCatalog::new());
    store.fail_row_create(&menuseed_proto::TableRef::new("menu"), "Smash Burger");
    seeder(store).run().await.unwrap_err();

    assert!(recorder.saw(
        Level::ERROR,
        &[
            ("message", "row creation failed"),
            ("phase", "populate_menu"),
            ("entity", "Smash Burger"),
        ]
    ));
}

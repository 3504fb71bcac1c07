use blossom_core::{CatalogStore, Category, NewCatalogItem, StoreError};
use blossom_db::{migrations, SqlCatalogStore};

use crate::commands::{with_database, CommandResult, OpsError};

/// Placeholder image tokens; replace with real ones captured from the
/// chat platform before demoing.
fn demo_bouquets() -> Vec<NewCatalogItem> {
    vec![
        NewCatalogItem {
            category: Category::Small,
            number: 1,
            title: "Bouquet of Peonies".to_owned(),
            price: 45,
            image_ref: "demo-file-peonies".to_owned(),
        },
        NewCatalogItem {
            category: Category::Small,
            number: 2,
            title: "Bouquet of Spray Roses".to_owned(),
            price: 60,
            image_ref: "demo-file-spray-roses".to_owned(),
        },
        NewCatalogItem {
            category: Category::Medium,
            number: 3,
            title: "Bouquet of Garden Roses".to_owned(),
            price: 75,
            image_ref: "demo-file-garden-roses".to_owned(),
        },
    ]
}

pub fn run() -> CommandResult {
    with_database("seed", |pool| async move {
        migrations::run_pending(&pool)
            .await
            .map_err(|error| OpsError::new("migration", error.to_string(), 5))?;

        let catalog = SqlCatalogStore::new(pool);
        let mut inserted = 0usize;
        let mut skipped = 0usize;
        for bouquet in demo_bouquets() {
            match catalog.insert(bouquet).await {
                Ok(_) => inserted += 1,
                // Re-seeding over an existing catalog is a no-op, not an
                // error.
                Err(StoreError::DuplicateKey { .. }) => skipped += 1,
                Err(error) => return Err(OpsError::new("seed_execution", error.to_string(), 5)),
            }
        }

        Ok(format!("demo bouquets seeded ({inserted} inserted, {skipped} already present)"))
    })
}

use crate::model::{
    Asset, AssetInstance, ComponentDefinition, Dimension, Id, Manufacturer, ManufacturerRef,
    OptionalComponentInstance, Project, Snapshot, MERCH_CATEGORY_FIELD,
};
use crate::store::traits::Store;
use anyhow::Result;
use chrono::{TimeZone, Utc};
use log::info;
use std::collections::HashMap;

pub const DEMO_PROJECT_ID: Id = 1;
pub const DEMO_SNAPSHOT_ID: Id = 1;
pub const EMPTY_SNAPSHOT_ID: Id = 2;

fn manufacturer(id: Id, name: &str, website: Option<&str>) -> Manufacturer {
    Manufacturer {
        id,
        name: name.to_string(),
        website: website.map(str::to_string),
        notes: None,
    }
}

/// Helper function to create an asset with an embedded manufacturer
fn catalog_asset(
    id: Id,
    name: &str,
    type_id: &str,
    maker: &Manufacturer,
    model: &str,
    width_mm: Option<f64>,
) -> Asset {
    Asset {
        id,
        name: name.to_string(),
        type_id: type_id.to_string(),
        manufacturer_id: Some(maker.id),
        manufacturer: ManufacturerRef::Embedded {
            name: maker.name.clone(),
        },
        model: model.to_string(),
        overall_width: width_mm.map(Dimension::millimeters),
        description: None,
        components: Vec::new(),
    }
}

fn component(
    id: Id,
    child_asset_id: Id,
    quantity: u32,
    can_add_per_instance: bool,
) -> ComponentDefinition {
    ComponentDefinition {
        id: Some(id),
        child_asset_id: Some(child_asset_id),
        child_asset: None,
        quantity,
        can_add_per_instance,
    }
}

fn placed(id: Id, asset_id: Id, location: &str, merch_category: Option<&str>) -> AssetInstance {
    let mut custom_fields = HashMap::new();
    if let Some(category) = merch_category {
        custom_fields.insert(
            MERCH_CATEGORY_FIELD.to_string(),
            serde_json::Value::String(category.to_string()),
        );
    }

    AssetInstance {
        id,
        snapshot_id: Some(DEMO_SNAPSHOT_ID),
        asset_id: Some(asset_id),
        asset_details: None,
        location: location.to_string(),
        custom_fields,
        optional_components: Vec::new(),
    }
}

pub fn demo_manufacturers() -> Vec<Manufacturer> {
    vec![
        manufacturer(1, "Madix", Some("https://www.madixinc.com")),
        manufacturer(2, "Lozier", Some("https://www.lozier.com")),
        manufacturer(3, "Trion Industries", None),
    ]
}

pub fn demo_assets() -> Vec<Asset> {
    let makers = demo_manufacturers();
    let (madix, lozier, trion) = (&makers[0], &makers[1], &makers[2]);

    let mut wall_bay = catalog_asset(10, "Wall Bay", "WB-48", madix, "WB4884", Some(1219.2));
    wall_bay.description = Some("48in gondola wall section".to_string());
    wall_bay.components = vec![
        component(100, 20, 4, false),
        component(101, 21, 1, false),
        component(102, 22, 1, true),
    ];

    // Lozier arrives from upstream with the flat name only
    let mut endcap = catalog_asset(11, "Endcap", "EC-24", lozier, "EC2460", Some(609.6));
    endcap.manufacturer = ManufacturerRef::Flat(lozier.name.clone());
    endcap.components = vec![component(110, 20, 3, false), component(111, 23, 2, true)];

    let checkout = Asset {
        id: 12,
        name: "Checkout Counter".to_string(),
        type_id: "CK-72".to_string(),
        manufacturer_id: None,
        manufacturer: ManufacturerRef::Unknown,
        model: "Custom millwork".to_string(),
        overall_width: Some(Dimension::Text("1828.80".to_string())),
        description: None,
        components: Vec::new(),
    };

    vec![
        wall_bay,
        endcap,
        checkout,
        catalog_asset(20, "Shelf", "SH-48", madix, "SH4816", Some(1219.2)),
        catalog_asset(21, "Base Deck", "BD-48", madix, "BD4818", Some(1219.2)),
        catalog_asset(22, "Peg Hook", "PH-6", trion, "PH06", None),
        catalog_asset(23, "Sign Holder", "SG-2", trion, "SG02", None),
    ]
}

pub fn demo_project() -> Project {
    Project {
        id: DEMO_PROJECT_ID,
        name: "Main Street Remodel".to_string(),
        client: Some("Corner Market".to_string()),
        description: Some("Front-of-store fixture refresh".to_string()),
    }
}

pub fn demo_snapshots() -> Vec<Snapshot> {
    vec![
        Snapshot {
            id: DEMO_SNAPSHOT_ID,
            project_id: DEMO_PROJECT_ID,
            name: "Pre-construction walk".to_string(),
            taken_at: Utc
                .with_ymd_and_hms(2024, 3, 4, 9, 30, 0)
                .single()
                .unwrap_or_else(Utc::now),
            notes: Some("Counted before demolition".to_string()),
        },
        Snapshot {
            id: EMPTY_SNAPSHOT_ID,
            project_id: DEMO_PROJECT_ID,
            name: "Punch list".to_string(),
            taken_at: Utc
                .with_ymd_and_hms(2024, 5, 20, 14, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
            notes: None,
        },
    ]
}

pub fn demo_instances() -> Vec<AssetInstance> {
    let mut first_bay = placed(101, 10, "Aisle 1", Some("Shelving"));
    first_bay.optional_components.push(OptionalComponentInstance {
        id: Some(1),
        component_id: Some(102),
        component_details: None,
        quantity: 6,
    });

    vec![
        first_bay,
        placed(102, 10, "Aisle 1", Some("Shelving // Lighting")),
        placed(103, 11, "Aisle 1 End", Some("Endcap // Seasonal")),
        placed(104, 12, "Front", Some("Checkout")),
        placed(105, 20, "Backroom", None),
        placed(106, 10, "Aisle 2", Some("Shelving")),
        placed(107, 11, "Aisle 2 End", Some("Clearance")),
        // Points at an asset that was removed from the catalog
        placed(108, 999, "Storage", None),
    ]
}

/// Load the demonstration catalog into `store`
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    for manufacturer in demo_manufacturers() {
        store.upsert_manufacturer(manufacturer).await?;
    }
    for asset in demo_assets() {
        store.upsert_asset(asset).await?;
    }
    store.upsert_project(demo_project()).await?;
    for snapshot in demo_snapshots() {
        store.upsert_snapshot(snapshot).await?;
    }
    for instance in demo_instances() {
        store.upsert_instance(DEMO_SNAPSHOT_ID, instance).await?;
    }

    info!(
        "Seed data loaded: project {} with snapshots {} and {}",
        DEMO_PROJECT_ID, DEMO_SNAPSHOT_ID, EMPTY_SNAPSHOT_ID
    );
    Ok(())
}

//! Bill-of-materials aggregation over a snapshot's asset instances
//!
//! Every instance contributes its own asset once, every required component
//! definition on that asset at its required quantity, and every optional
//! component actually added to the instance at the instance's quantity.
//! Rows are deduplicated by asset id across the whole snapshot.

use crate::model::{Asset, AssetInstance, BomRole, BomRow, Id};
use itertools::Itertools;
use log::debug;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Running totals for one asset while the snapshot is being walked
#[derive(Debug)]
struct BomAccumulator {
    asset_id: Id,
    type_id: String,
    name: String,
    manufacturer: String,
    model: String,
    quantity: u64,
    role: BomRole,
    parents: BTreeSet<String>,
}

impl BomAccumulator {
    fn new(asset: &Asset, role: BomRole) -> Self {
        Self {
            asset_id: asset.id,
            type_id: asset.type_id.clone(),
            name: asset.name.clone(),
            manufacturer: asset.manufacturer_name().to_string(),
            model: asset.model.clone(),
            quantity: 0,
            role,
            parents: BTreeSet::new(),
        }
    }

    fn into_row(self) -> BomRow {
        let parents = if self.role.is_parent() {
            BTreeSet::new()
        } else {
            self.parents
        };

        BomRow {
            asset_id: self.asset_id,
            type_id: self.type_id,
            name: self.name,
            manufacturer: self.manufacturer,
            model: self.model,
            quantity: self.quantity,
            role: self.role,
            parents,
        }
    }
}

pub struct BomAggregator;

impl BomAggregator {
    /// Flatten instances, their required components and their added optional
    /// components into one row per distinct asset.
    ///
    /// Parent rows come first, then component rows; each group is ordered by
    /// type id and then asset id.
    pub fn aggregate(instances: &[AssetInstance]) -> Vec<BomRow> {
        let mut rows: HashMap<Id, BomAccumulator> = HashMap::new();

        for instance in instances {
            let Some(parent) = instance.asset() else {
                debug!("Skipping instance {} without resolved asset", instance.id);
                continue;
            };

            Self::register(&mut rows, parent, 1, BomRole::Parent, None);

            for component in parent.required_components() {
                match component.child() {
                    Some(child) => Self::register(
                        &mut rows,
                        child,
                        u64::from(component.quantity),
                        BomRole::Component,
                        Some(&parent.name),
                    ),
                    None => debug!(
                        "Skipping unresolved component {:?} of asset {}",
                        component.id, parent.id
                    ),
                }
            }

            for optional in &instance.optional_components {
                match optional.child() {
                    Some(child) => Self::register(
                        &mut rows,
                        child,
                        u64::from(optional.quantity),
                        BomRole::Component,
                        Some(&parent.name),
                    ),
                    None => debug!(
                        "Skipping unresolved optional component {:?} on instance {}",
                        optional.id, instance.id
                    ),
                }
            }
        }

        rows.into_values()
            .map(BomAccumulator::into_row)
            .sorted_by(Self::compare_rows)
            .collect()
    }

    fn register(
        rows: &mut HashMap<Id, BomAccumulator>,
        asset: &Asset,
        quantity: u64,
        role: BomRole,
        parent_name: Option<&str>,
    ) {
        let row = rows
            .entry(asset.id)
            .or_insert_with(|| BomAccumulator::new(asset, role));

        row.quantity += quantity;
        row.role = row.role.merge(role);
        if let Some(parent_name) = parent_name {
            if !row.parents.contains(parent_name) {
                row.parents.insert(parent_name.to_string());
            }
        }
    }

    fn compare_rows(a: &BomRow, b: &BomRow) -> Ordering {
        b.role
            .is_parent()
            .cmp(&a.role.is_parent())
            .then_with(|| a.type_id.cmp(&b.type_id))
            .then_with(|| a.asset_id.cmp(&b.asset_id))
    }
}

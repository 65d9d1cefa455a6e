use crate::model::Id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether a BOM row was pulled in as a top-level instance or as someone's component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BomRole {
    Parent,
    Component,
}

impl BomRole {
    /// One-way transition: a component may become a parent, never the reverse
    pub fn merge(self, observed: BomRole) -> BomRole {
        match (self, observed) {
            (BomRole::Parent, _) | (_, BomRole::Parent) => BomRole::Parent,
            (BomRole::Component, BomRole::Component) => BomRole::Component,
        }
    }

    pub fn is_parent(self) -> bool {
        self == BomRole::Parent
    }
}

/// One deduplicated line of a snapshot's bill of materials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomRow {
    pub asset_id: Id,
    pub type_id: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub quantity: u64,
    pub role: BomRole,
    /// Distinct parent asset names that contributed to this row, empty for parents
    pub parents: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomResponse {
    pub snapshot_id: Id,
    pub total_quantity: u64,
    pub rows: Vec<BomRow>,
}

impl BomResponse {
    pub fn new(snapshot_id: Id, rows: Vec<BomRow>) -> Self {
        Self {
            snapshot_id,
            total_quantity: rows.iter().map(|row| row.quantity).sum(),
            rows,
        }
    }
}
